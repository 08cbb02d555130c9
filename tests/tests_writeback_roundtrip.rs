//! Writeback: the typed model reproduces the raw annotation shapes it was
//! converted from, up to key ordering.

mod helpers;

use helpers::*;

use edmlink::raw::{
    RawAnnotation, RawExpression, RawPropertyValue, RawRecord,
};
use edmlink::{Writeback, convert};
use smol_str::SmolStr;

/// Convert a document carrying `annotation` on the given target, then
/// write the annotation back and compare.
fn round_trip(target: &str, model_target: &str, annotation: RawAnnotation) {
    let raw = metadata_with_annotations(vec![annotation_list(target, vec![annotation.clone()])]);
    let model = convert(&raw).unwrap();
    let writeback = Writeback::new(&model);

    let term = annotation.term.clone();
    let written = writeback
        .annotation_on(&model, model_target, &term)
        .expect("annotation should write back");
    assert_eq!(written, annotation);
}

#[test]
fn scalar_values_round_trip() {
    round_trip(
        "SELF.OrderType",
        ORDER_TYPE,
        RawAnnotation::new("Common.Label", RawExpression::String("Orders".to_string())),
    );
    round_trip(
        "SELF.OrderType",
        ORDER_TYPE,
        RawAnnotation::new("UI.Hidden", RawExpression::Bool(true)),
    );
    round_trip(
        "SELF.OrderType/Amount",
        "com.example.orders.OrderType/Amount",
        RawAnnotation::new("Measures.Scale", RawExpression::Int(2)),
    );
    round_trip(
        "SELF.OrderType/Amount",
        "com.example.orders.OrderType/Amount",
        RawAnnotation::new("Validation.Minimum", RawExpression::Decimal(0.5)),
    );
    round_trip(
        "SELF.OrderType",
        ORDER_TYPE,
        RawAnnotation::new(
            "Common.CreatedAt",
            RawExpression::Date("2024-01-01".to_string()),
        ),
    );
}

#[test]
fn qualified_annotation_round_trips() {
    round_trip(
        "SELF.OrderType",
        ORDER_TYPE,
        RawAnnotation::new("Common.Label", RawExpression::String("Mobile".to_string()))
            .with_qualifier("mobile"),
    );
}

#[test]
fn path_and_enum_values_round_trip() {
    round_trip(
        "SELF.OrderType/Status",
        "com.example.orders.OrderType/Status",
        RawAnnotation::new("Common.Text", RawExpression::Path("StatusText".to_string())),
    );
    round_trip(
        "SELF.OrderType/Status",
        "com.example.orders.OrderType/Status",
        RawAnnotation::new(
            "UI.Importance",
            RawExpression::EnumMember("UI.ImportanceType/High".to_string()),
        ),
    );
}

#[test]
fn property_path_collection_round_trips() {
    round_trip(
        "SELF.OrderType",
        ORDER_TYPE,
        RawAnnotation::new(
            "UI.SelectionFields",
            RawExpression::Collection(vec![
                RawExpression::PropertyPath("Status".to_string()),
                RawExpression::PropertyPath("Amount".to_string()),
            ]),
        ),
    );
}

#[test]
fn record_with_nested_annotations_round_trips() {
    let record = RawExpression::Record(RawRecord {
        record_type: Some("UI.DataField".to_string()),
        property_values: vec![
            RawPropertyValue {
                name: SmolStr::new("Value"),
                value: RawExpression::Path("Status".to_string()),
                annotations: vec![RawAnnotation::new(
                    "UI.Importance",
                    RawExpression::EnumMember("UI.ImportanceType/High".to_string()),
                )],
            },
            string_pv("Label", "Status"),
        ],
        annotations: vec![RawAnnotation::new("UI.Hidden", RawExpression::Bool(false))],
    });
    round_trip(
        "SELF.OrderType",
        ORDER_TYPE,
        RawAnnotation::new(
            "UI.LineItem",
            RawExpression::Collection(vec![record]),
        ),
    );
}

#[test]
fn inferred_record_type_is_not_written_back() {
    // The input record has no explicit type; conversion infers DataField,
    // writeback must omit it again.
    let annotation = RawAnnotation::new(
        "UI.LineItem",
        RawExpression::Collection(vec![RawExpression::Record(RawRecord {
            record_type: None,
            property_values: vec![string_pv("Label", "plain")],
            annotations: vec![],
        })]),
    );
    round_trip("SELF.OrderType", ORDER_TYPE, annotation);
}

#[test]
fn dynamic_expressions_pass_through_unchanged() {
    let apply = RawExpression::Apply {
        function: SmolStr::new("odata.concat"),
        parameters: vec![
            RawExpression::Path("Status".to_string()),
            RawExpression::String(" / ".to_string()),
            RawExpression::Path("Amount".to_string()),
        ],
    };
    round_trip(
        "SELF.OrderType",
        ORDER_TYPE,
        RawAnnotation::new("Common.Label", apply),
    );
}

#[test]
fn annotation_on_annotation_round_trips() {
    let annotation = RawAnnotation {
        term: "Common.Text".to_string(),
        qualifier: None,
        value: RawExpression::Path("StatusText".to_string()),
        annotations: vec![RawAnnotation::new(
            "UI.TextArrangement",
            RawExpression::EnumMember("UI.TextArrangementType/TextOnly".to_string()),
        )],
    };
    round_trip(
        "SELF.OrderType/Status",
        "com.example.orders.OrderType/Status",
        annotation,
    );
}
