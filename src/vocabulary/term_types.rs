//! Static term-to-type lookup for record type inference.
//!
//! When a record carries no explicit `Type` attribute, the implied type is
//! derived from the enclosing term and, for nested records, the current
//! property name. The full vocabulary tables live outside this crate; this
//! is the subset the converter needs.

/// Entries keyed by property name within an enclosing term.
const PROPERTY_TYPES: &[(&str, &str, &str)] = &[
    (
        "com.sap.vocabularies.UI.v1.FieldGroup",
        "Data",
        "com.sap.vocabularies.UI.v1.DataField",
    ),
    (
        "com.sap.vocabularies.UI.v1.SelectionVariant",
        "SelectOptions",
        "com.sap.vocabularies.UI.v1.SelectOptionType",
    ),
    (
        "com.sap.vocabularies.Common.v1.ValueList",
        "Parameters",
        "com.sap.vocabularies.Common.v1.ValueListParameterInOut",
    ),
];

/// Entries keyed by the term alone.
const TERM_TYPES: &[(&str, &str)] = &[
    (
        "com.sap.vocabularies.UI.v1.LineItem",
        "com.sap.vocabularies.UI.v1.DataField",
    ),
    (
        "com.sap.vocabularies.UI.v1.Identification",
        "com.sap.vocabularies.UI.v1.DataField",
    ),
    (
        "com.sap.vocabularies.UI.v1.Facets",
        "com.sap.vocabularies.UI.v1.ReferenceFacet",
    ),
    (
        "com.sap.vocabularies.UI.v1.HeaderFacets",
        "com.sap.vocabularies.UI.v1.ReferenceFacet",
    ),
    (
        "com.sap.vocabularies.UI.v1.Chart",
        "com.sap.vocabularies.UI.v1.ChartDefinitionType",
    ),
    (
        "com.sap.vocabularies.UI.v1.DataPoint",
        "com.sap.vocabularies.UI.v1.DataPointType",
    ),
    (
        "com.sap.vocabularies.UI.v1.HeaderInfo",
        "com.sap.vocabularies.UI.v1.HeaderInfoType",
    ),
    (
        "com.sap.vocabularies.UI.v1.SelectionVariant",
        "com.sap.vocabularies.UI.v1.SelectionVariantType",
    ),
    (
        "com.sap.vocabularies.UI.v1.PresentationVariant",
        "com.sap.vocabularies.UI.v1.PresentationVariantType",
    ),
    (
        "com.sap.vocabularies.UI.v1.SelectionPresentationVariant",
        "com.sap.vocabularies.UI.v1.SelectionPresentationVariantType",
    ),
    (
        "com.sap.vocabularies.Common.v1.ValueList",
        "com.sap.vocabularies.Common.v1.ValueListType",
    ),
];

/// Implied record type for a record without an explicit type attribute.
///
/// Property-scoped entries take precedence over term-level entries. Both
/// `term` and `property` are expected unaliased.
pub fn implied_record_type(term: &str, property: Option<&str>) -> Option<&'static str> {
    if let Some(property) = property {
        if let Some((_, _, implied)) = PROPERTY_TYPES
            .iter()
            .find(|(t, p, _)| *t == term && *p == property)
        {
            return Some(implied);
        }
    }
    TERM_TYPES
        .iter()
        .find(|(t, _)| *t == term)
        .map(|(_, implied)| *implied)
}
