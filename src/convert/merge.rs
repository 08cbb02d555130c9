//! Annotation merger and applier.
//!
//! Merge: group raw annotation lists by unaliased target FQN across
//! sources; a duplicate `{term, qualifier}` on the same target is replaced
//! in place, so the later source wins per key while unrelated entries keep
//! first-source order. Apply: convert each merged annotation, register it
//! as an object-map element under `target@term#qualifier`, and write its
//! key into the target's annotation index.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::model::{Annotation, AnnotationValue, ModelElement, slot_mut};
use crate::raw::{RawAnnotation, RawExpression, RawSchema};
use crate::resolver::{ObjectMap, annotation_fqn};
use crate::vocabulary::{VocabularyReferences, split_term_and_qualifier};

use super::value::{ConversionScope, convert_expression};
use super::{Context, ConvertError, DeferredAnnotationList};

/// One merge-winning annotation for a target.
#[derive(Clone, Debug)]
pub(crate) struct MergedAnnotation {
    /// Unaliased dotted term, qualifier split off.
    pub term: String,
    pub qualifier: Option<SmolStr>,
    pub value: RawExpression,
    /// Annotations on this annotation.
    pub nested: Vec<RawAnnotation>,
    pub source: SmolStr,
}

/// Merge all sources' annotation lists, keyed by unaliased target FQN.
///
/// Targets naming the container under its bare name are normalized to the
/// container FQN before grouping.
pub(crate) fn merge_annotation_lists(
    refs: &VocabularyReferences,
    schema: &RawSchema,
    container_fqn: &str,
) -> IndexMap<String, Vec<MergedAnnotation>> {
    let mut merged: IndexMap<String, Vec<MergedAnnotation>> = IndexMap::new();

    for (source, lists) in &schema.annotations {
        for list in lists {
            let mut target = refs.unalias_target(&list.target);
            if target == schema.entity_container.name.as_str() {
                target = container_fqn.to_string();
            }
            let entries = merged.entry(target).or_default();

            for annotation in &list.annotations {
                let unaliased = refs.unalias(&annotation.term);
                let (term, embedded) = split_term_and_qualifier(&unaliased);
                let qualifier = annotation
                    .qualifier
                    .clone()
                    .or_else(|| embedded.map(SmolStr::new));

                let entry = MergedAnnotation {
                    term: term.to_string(),
                    qualifier,
                    value: annotation.value.clone(),
                    nested: annotation.annotations.clone(),
                    source: source.clone(),
                };
                match entries
                    .iter_mut()
                    .find(|e| e.term == entry.term && e.qualifier == entry.qualifier)
                {
                    // Same {term, qualifier} on the same target: the later
                    // source replaces in place.
                    Some(existing) => *existing = entry,
                    None => entries.push(entry),
                }
            }
        }
    }

    merged
}

/// Apply merged annotations onto their targets.
///
/// Annotations targeting an unbound action group fan out to every overload
/// without overriding an overload's own annotations; targets absent from
/// the map are deferred to the second apply pass.
pub(crate) fn apply_annotations(
    map: &mut ObjectMap,
    ctx: &mut Context,
    merged: IndexMap<String, Vec<MergedAnnotation>>,
) -> Result<(), ConvertError> {
    for (target, annotations) in merged {
        let Some(key) = map.canonical_key(&target).map(str::to_string) else {
            trace!("[APPLY] deferring nested target '{target}'");
            ctx.deferred_targets.push(DeferredAnnotationList {
                target,
                annotations,
            });
            continue;
        };

        if let Some(ModelElement::UnboundActionGroup(group)) = map.get(&key) {
            let overloads = group.overloads.clone();
            for overload in overloads {
                apply_list(map, ctx, &overload, &annotations, false)?;
            }
        } else {
            apply_list(map, ctx, &key, &annotations, true)?;
        }
    }
    Ok(())
}

fn apply_list(
    map: &mut ObjectMap,
    ctx: &mut Context,
    target_key: &str,
    annotations: &[MergedAnnotation],
    override_existing: bool,
) -> Result<(), ConvertError> {
    for annotation in annotations {
        let already_set = map
            .get(target_key)
            .is_some_and(|element| {
                element
                    .annotations()
                    .contains(&annotation.term, annotation.qualifier.as_deref())
            });
        if already_set && !override_existing {
            continue;
        }

        let fqn = annotation_key(target_key, &annotation.term, annotation.qualifier.as_deref());
        register_annotation(
            map,
            ctx,
            &fqn,
            &annotation.term,
            annotation.qualifier.clone(),
            target_key,
            &annotation.value,
            &annotation.nested,
            &annotation.source,
        )?;
        if let Some(element) = map.get_mut(target_key) {
            element.annotations_mut().insert(
                &ctx.refs,
                &annotation.term,
                annotation.qualifier.as_deref(),
                fqn,
                override_existing,
            );
        }
    }
    Ok(())
}

/// `<target>@<term>[#qualifier]`.
pub(crate) fn annotation_key(target: &str, term: &str, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(qualifier) => format!("{target}@{term}#{qualifier}"),
        None => format!("{target}@{term}"),
    }
}

/// Convert one annotation value and register the annotation as an element,
/// recursing into nested annotations on the annotation itself and on
/// records/property values inside the value.
#[allow(clippy::too_many_arguments)]
pub(crate) fn register_annotation(
    map: &mut ObjectMap,
    ctx: &mut Context,
    fqn: &str,
    term: &str,
    qualifier: Option<SmolStr>,
    resolution_root: &str,
    value: &RawExpression,
    nested_annotations: &[RawAnnotation],
    source: &SmolStr,
) -> Result<(), ConvertError> {
    let scope = ConversionScope {
        annotation_fqn: fqn,
        resolution_root,
        term,
    };
    let mut slot = Vec::new();
    let mut nested_regs = Vec::new();
    let converted = convert_expression(
        map,
        ctx,
        &scope,
        &mut slot,
        fqn,
        None,
        value,
        &mut nested_regs,
    )?;

    // A builder placeholder (or an earlier source's element) may already
    // carry annotations of its own; shadowing must not lose them.
    let existing_annotations = match map.get(fqn) {
        Some(ModelElement::Annotation(existing)) => existing.annotations.clone(),
        _ => Default::default(),
    };
    map.insert(
        fqn.to_string(),
        ModelElement::Annotation(Annotation {
            term: term.to_string(),
            qualifier,
            fully_qualified_name: fqn.to_string(),
            value: Some(converted),
            source: Some(source.clone()),
            annotations: existing_annotations,
        }),
    );

    // Nested annotation lists on records and property values.
    for reg in nested_regs {
        let (nested_fqn, nested_term, nested_qualifier) =
            annotation_fqn(&ctx.refs, &reg.node_fqn, &reg.raw);
        register_annotation(
            map,
            ctx,
            &nested_fqn,
            &nested_term,
            nested_qualifier.clone(),
            resolution_root,
            &reg.raw.value,
            &reg.raw.annotations,
            source,
        )?;

        if let Some(ModelElement::Annotation(owner)) = map.get_mut(fqn) {
            if let Some(value) = owner.value.as_mut() {
                if let Some(AnnotationValue::Record(record)) = slot_mut(value, &reg.record_slot) {
                    let index = match &reg.property {
                        Some(name) => record
                            .property_value_mut(name)
                            .map(|property_value| &mut property_value.annotations),
                        None => Some(&mut record.annotations),
                    };
                    if let Some(index) = index {
                        index.insert(
                            &ctx.refs,
                            &nested_term,
                            nested_qualifier.as_deref(),
                            nested_fqn,
                            true,
                        );
                    }
                }
            }
        }
    }

    // Annotations on the annotation itself.
    for nested in nested_annotations {
        let (nested_fqn, nested_term, nested_qualifier) = annotation_fqn(&ctx.refs, fqn, nested);
        register_annotation(
            map,
            ctx,
            &nested_fqn,
            &nested_term,
            nested_qualifier.clone(),
            resolution_root,
            &nested.value,
            &nested.annotations,
            source,
        )?;
        if let Some(element) = map.get_mut(fqn) {
            element.annotations_mut().insert(
                &ctx.refs,
                &nested_term,
                nested_qualifier.as_deref(),
                nested_fqn,
                true,
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use smol_str::SmolStr;

    use crate::raw::{RawAnnotationList, RawEntityContainer};

    fn schema_with_sources(
        sources: Vec<(&str, Vec<RawAnnotationList>)>,
    ) -> RawSchema {
        let mut annotations = IndexMap::new();
        for (source, lists) in sources {
            annotations.insert(SmolStr::new(source), lists);
        }
        RawSchema {
            namespace: "com.example.orders".to_string(),
            entity_container: RawEntityContainer {
                name: SmolStr::new("Container"),
            },
            annotations,
            ..Default::default()
        }
    }

    fn label(value: &str) -> RawAnnotation {
        RawAnnotation::new("Common.Label", RawExpression::String(value.to_string()))
    }

    #[test]
    fn later_source_wins_per_key() {
        let refs = VocabularyReferences::with_extras(&[]);
        let schema = schema_with_sources(vec![
            (
                "a",
                vec![RawAnnotationList {
                    target: "com.example.orders.OrderType".to_string(),
                    annotations: vec![label("X")],
                }],
            ),
            (
                "b",
                vec![RawAnnotationList {
                    target: "com.example.orders.OrderType".to_string(),
                    annotations: vec![label("Y")],
                }],
            ),
        ]);

        let merged = merge_annotation_lists(&refs, &schema, "com.example.orders.Container");
        let entries = &merged["com.example.orders.OrderType"];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, RawExpression::String("Y".to_string()));
        assert_eq!(entries[0].source.as_str(), "b");
    }

    #[test]
    fn unrelated_entries_keep_first_source_order() {
        let refs = VocabularyReferences::with_extras(&[]);
        let schema = schema_with_sources(vec![
            (
                "a",
                vec![RawAnnotationList {
                    target: "com.example.orders.OrderType".to_string(),
                    annotations: vec![label("X")],
                }],
            ),
            (
                "b",
                vec![RawAnnotationList {
                    target: "com.example.orders.OrderType".to_string(),
                    annotations: vec![
                        RawAnnotation::new(
                            "Common.Heading",
                            RawExpression::String("H".to_string()),
                        ),
                        label("Y"),
                    ],
                }],
            ),
        ]);

        let merged = merge_annotation_lists(&refs, &schema, "com.example.orders.Container");
        let entries = &merged["com.example.orders.OrderType"];
        let terms: Vec<_> = entries.iter().map(|e| e.term.as_str()).collect();
        assert_eq!(
            terms,
            vec![
                "com.sap.vocabularies.Common.v1.Label",
                "com.sap.vocabularies.Common.v1.Heading",
            ]
        );
        assert_eq!(entries[0].value, RawExpression::String("Y".to_string()));
    }

    #[test]
    fn qualifier_distinguishes_entries() {
        let refs = VocabularyReferences::with_extras(&[]);
        let schema = schema_with_sources(vec![(
            "a",
            vec![RawAnnotationList {
                target: "com.example.orders.OrderType".to_string(),
                annotations: vec![
                    label("plain"),
                    label("qualified").with_qualifier("extra"),
                ],
            }],
        )]);

        let merged = merge_annotation_lists(&refs, &schema, "com.example.orders.Container");
        assert_eq!(merged["com.example.orders.OrderType"].len(), 2);
    }

    #[test]
    fn bare_container_target_is_normalized() {
        let refs = VocabularyReferences::with_extras(&[]);
        let schema = schema_with_sources(vec![(
            "a",
            vec![RawAnnotationList {
                target: "Container".to_string(),
                annotations: vec![label("X")],
            }],
        )]);

        let merged = merge_annotation_lists(&refs, &schema, "com.example.orders.Container");
        assert!(merged.contains_key("com.example.orders.Container"));
    }
}
