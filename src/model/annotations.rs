//! Per-element annotation index.
//!
//! Keyed first by vocabulary alias, then by `term#qualifier`, mirrored into
//! a flat index keyed by the unaliased dotted term so lookup is O(1)
//! regardless of which spelling the caller uses. The index stores the FQNs
//! of annotation elements; the values live once, in the object map.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::vocabulary::VocabularyReferences;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationIndex {
    /// alias → `Term#qualifier` → annotation FQN.
    groups: IndexMap<SmolStr, IndexMap<SmolStr, String>>,
    /// Unaliased `ns.Term#qualifier` → annotation FQN.
    flat: FxHashMap<String, String>,
}

impl AnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an annotation under its unaliased term.
    ///
    /// Returns false (and leaves the index unchanged) when the key is
    /// already present and `override_existing` is not set — this is how
    /// a bound overload's own annotation survives unbound-group fan-out.
    pub fn insert(
        &mut self,
        refs: &VocabularyReferences,
        term: &str,
        qualifier: Option<&str>,
        annotation_fqn: String,
        override_existing: bool,
    ) -> bool {
        let flat_key = Self::keyed(term, qualifier);
        if !override_existing && self.flat.contains_key(&flat_key) {
            return false;
        }

        let (namespace, local) = term.rsplit_once('.').unwrap_or(("", term));
        let group: SmolStr = refs
            .alias_for_namespace(namespace)
            .cloned()
            .unwrap_or_else(|| SmolStr::new(namespace));
        let inner_key = SmolStr::new(Self::keyed(local, qualifier));

        self.groups
            .entry(group)
            .or_default()
            .insert(inner_key, annotation_fqn.clone());
        self.flat.insert(flat_key, annotation_fqn);
        true
    }

    /// Look up an annotation FQN by term, in aliased or unaliased
    /// spelling, with an optional `#qualifier` suffix.
    pub fn lookup(&self, refs: &VocabularyReferences, term: &str) -> Option<&str> {
        self.flat.get(&refs.unalias(term)).map(String::as_str)
    }

    /// Direct flat-key lookup: `ns.Term` or `ns.Term#qualifier`, unaliased.
    pub fn get(&self, flat_key: &str) -> Option<&str> {
        self.flat.get(flat_key).map(String::as_str)
    }

    pub fn contains(&self, term: &str, qualifier: Option<&str>) -> bool {
        self.flat.contains_key(&Self::keyed(term, qualifier))
    }

    /// Iterate `(alias, term#qualifier, annotation FQN)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &SmolStr, &str)> {
        self.groups.iter().flat_map(|(alias, terms)| {
            terms
                .iter()
                .map(move |(key, fqn)| (alias, key, fqn.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    fn keyed(term: &str, qualifier: Option<&str>) -> String {
        match qualifier {
            Some(qualifier) => format!("{term}#{qualifier}"),
            None => term.to_string(),
        }
    }
}
