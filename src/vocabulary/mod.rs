//! Vocabulary references and alias handling.
//!
//! Bidirectional mapping between short vocabulary aliases (`UI`, `Common`)
//! and full namespaces (`com.sap.vocabularies.UI.v1`, ...). The lookup maps
//! are built once per reference list and reused for the whole conversion.

mod term_types;

pub use term_types::implied_record_type;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::raw::RawReference;

/// The fixed default vocabulary references, always present in the output.
pub const DEFAULT_REFERENCES: &[(&str, &str)] = &[
    ("Capabilities", "Org.OData.Capabilities.V1"),
    ("Aggregation", "Org.OData.Aggregation.V1"),
    ("Validation", "Org.OData.Validation.V1"),
    ("Core", "Org.OData.Core.V1"),
    ("Measures", "Org.OData.Measures.V1"),
    ("Common", "com.sap.vocabularies.Common.v1"),
    ("UI", "com.sap.vocabularies.UI.v1"),
    ("Session", "com.sap.vocabularies.Session.v1"),
    ("Analytics", "com.sap.vocabularies.Analytics.v1"),
    ("CodeList", "com.sap.vocabularies.CodeList.v1"),
    ("PersonalData", "com.sap.vocabularies.PersonalData.v1"),
    ("Communication", "com.sap.vocabularies.Communication.v1"),
    ("HTML5", "com.sap.vocabularies.HTML5.v1"),
];

/// Alias ↔ namespace lookup over the union of the default table and the
/// project-specific references of one metadata document.
#[derive(Clone, Debug)]
pub struct VocabularyReferences {
    references: Vec<RawReference>,
    by_alias: FxHashMap<SmolStr, String>,
    by_namespace: FxHashMap<String, SmolStr>,
}

impl VocabularyReferences {
    /// Build the lookup from the default table plus `extras`, in that
    /// order. A project reference re-binding a default alias wins.
    pub fn with_extras(extras: &[RawReference]) -> Self {
        let mut references: Vec<RawReference> = DEFAULT_REFERENCES
            .iter()
            .map(|(alias, namespace)| RawReference::new(*alias, *namespace))
            .collect();
        for extra in extras {
            if let Some(existing) = references.iter_mut().find(|r| r.alias == extra.alias) {
                *existing = extra.clone();
            } else {
                references.push(extra.clone());
            }
        }
        Self::from_references(references)
    }

    fn from_references(references: Vec<RawReference>) -> Self {
        let mut by_alias = FxHashMap::default();
        let mut by_namespace = FxHashMap::default();
        for reference in &references {
            by_alias.insert(reference.alias.clone(), reference.namespace.clone());
            by_namespace.insert(reference.namespace.clone(), reference.alias.clone());
        }
        Self {
            references,
            by_alias,
            by_namespace,
        }
    }

    /// The merged reference list (defaults ∪ extras), in order.
    pub fn references(&self) -> &[RawReference] {
        &self.references
    }

    pub fn namespace_for_alias(&self, alias: &str) -> Option<&str> {
        self.by_alias.get(alias).map(String::as_str)
    }

    pub fn alias_for_namespace(&self, namespace: &str) -> Option<&SmolStr> {
        self.by_namespace.get(namespace)
    }

    /// Replace a leading `Alias.` with its full namespace.
    ///
    /// Strings that do not start with a known alias come back unchanged, so
    /// already-unaliased input is a fixpoint.
    pub fn unalias(&self, value: &str) -> String {
        if let Some((head, rest)) = value.split_once('.') {
            if let Some(namespace) = self.by_alias.get(head) {
                return format!("{namespace}.{rest}");
            }
        }
        value.to_string()
    }

    /// Replace a leading full namespace with its alias.
    ///
    /// The namespace is everything up to the last `.` before any `/`, `#`
    /// or `@`; unknown namespaces come back unchanged.
    pub fn alias(&self, value: &str) -> String {
        let head_end = value
            .find(['/', '#', '@'])
            .unwrap_or(value.len());
        let (head, tail) = value.split_at(head_end);
        if let Some((namespace, name)) = head.rsplit_once('.') {
            if let Some(alias) = self.by_namespace.get(namespace) {
                return format!("{alias}.{name}{tail}");
            }
        }
        value.to_string()
    }

    /// Unalias an annotation target path.
    ///
    /// The leading segment, every `@`-introduced term, and a parenthesized
    /// action binding type all get their alias expanded; structural
    /// `/`-segments are left alone.
    pub fn unalias_target(&self, target: &str) -> String {
        target
            .split('@')
            .map(|chunk| match chunk.split_once('(') {
                Some((head, rest)) if rest.ends_with(')') => {
                    let inner = &rest[..rest.len() - 1];
                    format!("{}({})", self.unalias(head), self.unalias(inner))
                }
                _ => self.unalias(chunk),
            })
            .collect::<Vec<_>>()
            .join("@")
    }

    /// Re-alias an enum member value, member-wise for space-separated
    /// flag values: `com...UI.v1.Importance/High` → `UI.Importance/High`.
    pub fn realias_enum(&self, value: &str) -> String {
        value
            .split(' ')
            .map(|member| match member.split_once('/') {
                Some((enum_type, flag)) => format!("{}/{flag}", self.alias(enum_type)),
                None => self.alias(member),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split a dotted term with optional qualifier: `ns.Term#q` → (`ns.Term`, `q`).
pub fn split_term_and_qualifier(term: &str) -> (&str, Option<&str>) {
    match term.split_once('#') {
        Some((base, qualifier)) => (base, Some(qualifier)),
        None => (term, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn refs() -> VocabularyReferences {
        VocabularyReferences::with_extras(&[RawReference::new("SELF", "com.example.orders")])
    }

    #[rstest]
    #[case("UI.LineItem", "com.sap.vocabularies.UI.v1.LineItem")]
    #[case("Common.Text", "com.sap.vocabularies.Common.v1.Text")]
    #[case("Core.Description", "Org.OData.Core.V1.Description")]
    #[case("SELF.OrderType", "com.example.orders.OrderType")]
    fn unalias_expands_known_aliases(#[case] aliased: &str, #[case] unaliased: &str) {
        let refs = refs();
        assert_eq!(refs.unalias(aliased), unaliased);
        assert_eq!(refs.alias(unaliased), aliased);
    }

    #[rstest]
    #[case("UI.LineItem")]
    #[case("Common.Text#qualified")]
    #[case("com.unknown.namespace.Term")]
    fn alias_unalias_round_trip(#[case] value: &str) {
        let refs = refs();
        assert_eq!(refs.alias(refs.unalias(value).as_str()), value);
    }

    #[test]
    fn unalias_is_fixpoint_on_unaliased_input() {
        let refs = refs();
        let full = "com.sap.vocabularies.UI.v1.LineItem";
        assert_eq!(refs.unalias(full), full);
    }

    #[test]
    fn unalias_keeps_qualifier() {
        let refs = refs();
        assert_eq!(
            refs.unalias("UI.LineItem#mobile"),
            "com.sap.vocabularies.UI.v1.LineItem#mobile"
        );
    }

    #[test]
    fn alias_stops_at_path_separator() {
        let refs = refs();
        assert_eq!(
            refs.alias("com.example.orders.OrderType/Status"),
            "SELF.OrderType/Status"
        );
    }

    #[test]
    fn unalias_target_expands_each_term() {
        let refs = refs();
        assert_eq!(
            refs.unalias_target("SELF.OrderType/Status@Common.Text"),
            "com.example.orders.OrderType/Status@com.sap.vocabularies.Common.v1.Text"
        );
    }

    #[test]
    fn unalias_target_expands_action_binding_types() {
        let refs = refs();
        assert_eq!(
            refs.unalias_target("SELF.Approve(SELF.OrderType)"),
            "com.example.orders.Approve(com.example.orders.OrderType)"
        );
    }

    #[test]
    fn realias_enum_handles_flag_values() {
        let refs = refs();
        assert_eq!(
            refs.realias_enum(
                "com.sap.vocabularies.UI.v1.Importance/High com.sap.vocabularies.UI.v1.Importance/Medium"
            ),
            "UI.Importance/High UI.Importance/Medium"
        );
    }

    #[test]
    fn project_reference_overrides_default_alias() {
        let refs = VocabularyReferences::with_extras(&[RawReference::new(
            "UI",
            "com.example.custom.UI",
        )]);
        assert_eq!(refs.unalias("UI.Custom"), "com.example.custom.UI.Custom");
        // Still 13 defaults + 0 extras: the override replaced in place.
        assert_eq!(refs.references().len(), DEFAULT_REFERENCES.len());
    }

    #[test]
    fn split_term_extracts_qualifier() {
        assert_eq!(
            split_term_and_qualifier("UI.LineItem#mobile"),
            ("UI.LineItem", Some("mobile"))
        );
        assert_eq!(split_term_and_qualifier("UI.LineItem"), ("UI.LineItem", None));
    }
}
