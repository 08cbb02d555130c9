use super::{fixture_refs, orders_fixture};
use crate::model::ModelElement;
use crate::resolver::build_object_map;

#[test]
fn registers_container_sets_and_types() {
    let raw = orders_fixture();
    let refs = fixture_refs(&raw);
    let map = build_object_map(&raw, &refs);

    assert!(matches!(
        map.get("com.example.orders.Container"),
        Some(ModelElement::EntityContainer(_))
    ));
    assert!(matches!(
        map.get("com.example.orders.Container/Orders"),
        Some(ModelElement::EntitySet(_))
    ));
    assert!(matches!(
        map.get("com.example.orders.OrderType"),
        Some(ModelElement::EntityType(_))
    ));
    assert!(matches!(
        map.get("com.example.orders.OrderType/Status"),
        Some(ModelElement::Property(_))
    ));
    assert!(matches!(
        map.get("com.example.orders.OrderType/Items"),
        Some(ModelElement::NavigationProperty(_))
    ));
}

#[test]
fn expands_nested_complex_type_properties() {
    let raw = orders_fixture();
    let refs = fixture_refs(&raw);
    let map = build_object_map(&raw, &refs);

    // AddressType's own properties.
    assert!(matches!(
        map.get("com.example.orders.AddressType/Street"),
        Some(ModelElement::Property(_))
    ));
    // Synthesized sub-FQNs under the entity type's complex property.
    assert!(matches!(
        map.get("com.example.orders.OrderType/ShipTo/Street"),
        Some(ModelElement::Property(_))
    ));
    assert!(matches!(
        map.get("com.example.orders.OrderType/ShipTo/City"),
        Some(ModelElement::Property(_))
    ));
}

#[test]
fn registers_actions_with_group_and_reverse_key() {
    let raw = orders_fixture();
    let refs = fixture_refs(&raw);
    let map = build_object_map(&raw, &refs);

    let bound = "com.example.orders.Approve(com.example.orders.OrderType)";
    assert!(matches!(map.get(bound), Some(ModelElement::Action(_))));
    assert!(matches!(
        map.get("com.example.orders.Refresh()"),
        Some(ModelElement::Action(_))
    ));
    // Group entry aggregating overloads.
    match map.get("com.example.orders.Approve") {
        Some(ModelElement::UnboundActionGroup(group)) => {
            assert_eq!(group.overloads, vec![bound.to_string()]);
        }
        other => panic!("expected action group, got {other:?}"),
    }
    // Reverse `<bindingType>/<actionName>` key redirects to the overload.
    assert_eq!(
        map.canonical_key("com.example.orders.OrderType/Approve"),
        Some(bound)
    );
    // Parameters are registered under the overload.
    assert!(matches!(
        map.get(&format!("{bound}/comment")),
        Some(ModelElement::ActionParameter(_))
    ));
}

#[test]
fn registers_annotations_as_targets() {
    let raw = orders_fixture();
    let refs = fixture_refs(&raw);
    let map = build_object_map(&raw, &refs);

    let fqn =
        "com.example.orders.OrderType/Status@com.sap.vocabularies.Common.v1.Text";
    match map.get(fqn) {
        Some(ModelElement::Annotation(annotation)) => {
            assert_eq!(annotation.term, "com.sap.vocabularies.Common.v1.Text");
            assert!(annotation.value.is_none());
        }
        other => panic!("expected annotation, got {other:?}"),
    }
}

#[test]
fn later_writes_shadow_earlier_ones() {
    let raw = orders_fixture();
    let refs = fixture_refs(&raw);
    let mut map = build_object_map(&raw, &refs);

    let fqn = "com.example.orders.OrderType";
    let before = map.get(fqn).unwrap().kind_name();
    assert_eq!(before, "EntityType");

    let shadowing = map
        .get("com.example.orders.Container/Orders")
        .unwrap()
        .clone();
    map.insert(fqn.to_string(), shadowing);
    assert_eq!(map.get(fqn).unwrap().kind_name(), "EntitySet");
}
