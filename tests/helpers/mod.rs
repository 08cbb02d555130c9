//! Shared fixture builders for the integration tests.
//!
//! One small V4 orders service with enough surface to exercise linking,
//! annotation merging, path resolution and writeback.
#![allow(dead_code)]

use indexmap::IndexMap;
use smol_str::SmolStr;

use edmlink::raw::*;

pub const NS: &str = "com.example.orders";
pub const CONTAINER: &str = "com.example.orders.Container";
pub const ORDER_TYPE: &str = "com.example.orders.OrderType";
pub const ORDERS: &str = "com.example.orders.Container/Orders";
pub const APPROVE_BOUND: &str = "com.example.orders.Approve(com.example.orders.OrderType)";

/// The bare schema: types, sets, actions, no annotations.
pub fn orders_schema() -> RawSchema {
    RawSchema {
        namespace: NS.to_string(),
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
                navigation_properties: vec![RawNavigationProperty::V4(RawNavigationPropertyV4 {
                    name: SmolStr::new("Items"),
                    target_type_name: "SELF.OrderItemType".to_string(),
                    is_collection: true,
                    partner: Some(SmolStr::new("Order")),
                    contains_target: false,
                    referential_constraint: vec![],
                })],
            },
            RawEntityType {
                name: SmolStr::new("OrderItemType"),
                keys: vec![SmolStr::new("ID")],
                properties: vec![
                    RawProperty::new("ID", "Edm.String"),
                    RawProperty::new("Quantity", "Edm.Int32"),
                ],
                navigation_properties: vec![RawNavigationProperty::V4(RawNavigationPropertyV4 {
                    name: SmolStr::new("Order"),
                    target_type_name: "SELF.OrderType".to_string(),
                    is_collection: false,
                    partner: Some(SmolStr::new("Items")),
                    contains_target: false,
                    referential_constraint: vec![],
                })],
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
        type_definitions: vec![],
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
        annotations: IndexMap::new(),
    }
}

/// Wrap a schema into a metadata document.
pub fn metadata_with(schema: RawSchema) -> RawMetadata {
    RawMetadata {
        version: SmolStr::new("4.0"),
        references: vec![RawReference::new("SELF", NS)],
        schema,
    }
}

/// The schema plus one annotation source.
pub fn metadata_with_annotations(lists: Vec<RawAnnotationList>) -> RawMetadata {
    let mut schema = orders_schema();
    schema
        .annotations
        .insert(SmolStr::new("metadata"), lists);
    metadata_with(schema)
}

pub fn annotation_list(target: &str, annotations: Vec<RawAnnotation>) -> RawAnnotationList {
    RawAnnotationList {
        target: target.to_string(),
        annotations,
    }
}

pub fn string_pv(name: &str, value: &str) -> RawPropertyValue {
    RawPropertyValue {
        name: SmolStr::new(name),
        value: RawExpression::String(value.to_string()),
        annotations: vec![],
    }
}

/// A `UI.DataFieldForAction` record for the given action name.
pub fn action_field(label: &str, action: &str) -> RawExpression {
    RawExpression::Record(RawRecord {
        record_type: Some("UI.DataFieldForAction".to_string()),
        property_values: vec![string_pv("Label", label), string_pv("Action", action)],
        annotations: vec![],
    })
}
