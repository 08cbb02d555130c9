mod tests_object_map;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::raw::*;
use crate::vocabulary::VocabularyReferences;

/// A small V4 orders service: two entity types, a complex type, a bound
/// and an unbound action, and a handful of annotations.
pub(crate) fn orders_fixture() -> RawMetadata {
    let mut annotations: IndexMap<SmolStr, Vec<RawAnnotationList>> = IndexMap::new();
    annotations.insert(
        SmolStr::new("metadata"),
        vec![
            RawAnnotationList {
                target: "SELF.OrderType/Status".to_string(),
                annotations: vec![RawAnnotation::new(
                    "Common.Text",
                    RawExpression::Path("StatusText".to_string()),
                )],
            },
            RawAnnotationList {
                target: "SELF.Container/Orders".to_string(),
                annotations: vec![RawAnnotation::new(
                    "Common.Label",
                    RawExpression::String("Orders".to_string()),
                )],
            },
        ],
    );

    RawMetadata {
        version: SmolStr::new("4.0"),
        references: vec![RawReference::new("SELF", "com.example.orders")],
        schema: RawSchema {
            namespace: "com.example.orders".to_string(),
            alias: Some(SmolStr::new("SELF")),
            entity_container: RawEntityContainer {
                name: SmolStr::new("Container"),
            },
            entity_types: vec![
                RawEntityType {
                    name: SmolStr::new("OrderType"),
                    keys: vec![SmolStr::new("ID")],
                    properties: vec![
                        RawProperty::new("ID", "Edm.String"),
                        RawProperty::new("Status", "Edm.String"),
                        RawProperty::new("StatusText", "Edm.String"),
                        RawProperty::new("Amount", "Edm.Decimal"),
                        RawProperty::new("ShipTo", "SELF.AddressType"),
                    ],
                    navigation_properties: vec![RawNavigationProperty::V4(
                        RawNavigationPropertyV4 {
                            name: SmolStr::new("Items"),
                            target_type_name: "SELF.OrderItemType".to_string(),
                            is_collection: true,
                            partner: Some(SmolStr::new("Order")),
                            contains_target: false,
                            referential_constraint: vec![],
                        },
                    )],
                },
                RawEntityType {
                    name: SmolStr::new("OrderItemType"),
                    keys: vec![SmolStr::new("ID")],
                    properties: vec![
                        RawProperty::new("ID", "Edm.String"),
                        RawProperty::new("Quantity", "Edm.Int32"),
                    ],
                    navigation_properties: vec![RawNavigationProperty::V4(
                        RawNavigationPropertyV4 {
                            name: SmolStr::new("Order"),
                            target_type_name: "SELF.OrderType".to_string(),
                            is_collection: false,
                            partner: Some(SmolStr::new("Items")),
                            contains_target: false,
                            referential_constraint: vec![RawReferentialConstraint {
                                source_property: SmolStr::new("OrderID"),
                                target_property: SmolStr::new("ID"),
                            }],
                        },
                    )],
                },
            ],
            complex_types: vec![RawComplexType {
                name: SmolStr::new("AddressType"),
                properties: vec![
                    RawProperty::new("Street", "Edm.String"),
                    RawProperty::new("City", "Edm.String"),
                ],
                navigation_properties: vec![],
            }],
            type_definitions: vec![RawTypeDefinition {
                name: SmolStr::new("Currency"),
                underlying_type: "Edm.String".to_string(),
            }],
            entity_sets: vec![
                RawEntitySet {
                    name: SmolStr::new("Orders"),
                    entity_type_name: "SELF.OrderType".to_string(),
                    navigation_property_binding: IndexMap::from_iter([(
                        "Items".to_string(),
                        "OrderItems".to_string(),
                    )]),
                },
                RawEntitySet {
                    name: SmolStr::new("OrderItems"),
                    entity_type_name: "SELF.OrderItemType".to_string(),
                    navigation_property_binding: IndexMap::new(),
                },
            ],
            singletons: vec![],
            actions: vec![
                RawAction {
                    name: SmolStr::new("Approve"),
                    is_bound: true,
                    source_type: Some("SELF.OrderType".to_string()),
                    return_type: Some("SELF.OrderType".to_string()),
                    parameters: vec![RawActionParameter {
                        name: SmolStr::new("comment"),
                        type_name: "Edm.String".to_string(),
                        is_collection: false,
                        nullable: true,
                    }],
                },
                RawAction {
                    name: SmolStr::new("Refresh"),
                    is_bound: false,
                    source_type: None,
                    return_type: None,
                    parameters: vec![],
                },
            ],
            action_imports: vec![RawActionImport {
                name: SmolStr::new("RefreshImport"),
                action_name: "SELF.Refresh".to_string(),
            }],
            associations: vec![],
            annotations,
        },
    }
}

pub(crate) fn fixture_refs(raw: &RawMetadata) -> VocabularyReferences {
    VocabularyReferences::with_extras(&raw.references)
}
