//! Deferred resolution passes.
//!
//! Two late passes over the completed object map: the pending-path queue
//! (every path-family node queued by the value converter) and the
//! deferred nested-annotation bucket (annotation lists whose target is
//! itself a nested annotation node, only addressable after the first
//! apply pass ran).

use smol_str::SmolStr;
use tracing::trace;

use crate::model::{AnnotationValue, ModelElement, ValueStep, slot_mut};
use crate::resolver::{ObjectMap, ResolveOptions, resolve};

use super::merge::{annotation_key, register_annotation};
use super::{Context, ConvertError};

/// Re-resolve every queued path node against the complete map.
///
/// `inline` records splice the resolved annotation's value over the node;
/// all others back-patch `target`. Paths that still fail here produce the
/// one-and-only diagnostic for their path string.
pub(crate) fn process_pending_paths(map: &mut ObjectMap, ctx: &mut Context) {
    let pending = std::mem::take(&mut ctx.pending_paths);
    trace!("[DEFERRED] {} pending path(s)", pending.len());

    for record in pending {
        let options = ResolveOptions {
            annotation_term: Some(&record.term),
            ..Default::default()
        };
        let resolution = resolve(
            map,
            &ctx.refs,
            &mut ctx.diagnostics,
            &record.start,
            &record.path,
            &options,
        );
        let Some(target_fqn) = resolution.element_fqn().map(str::to_string) else {
            continue;
        };

        // Inline targets flatten: the referenced annotation's value
        // replaces the node. Clone it before taking the mutable borrow.
        let spliced = if record.inline {
            match map.get(&target_fqn) {
                Some(ModelElement::Annotation(annotation)) => annotation.value.clone(),
                _ => None,
            }
        } else {
            None
        };

        let Some(ModelElement::Annotation(owner)) = map.get_mut(&record.owner) else {
            continue;
        };
        let Some(value) = owner.value.as_mut() else {
            continue;
        };
        let Some(node) = slot_mut(value, &record.slot) else {
            continue;
        };
        match spliced {
            Some(replacement) => *node = replacement,
            None => {
                if let Some(path) = node.as_path_expression_mut() {
                    path.target = Some(target_fqn);
                }
            }
        }
    }
}

/// Where a deferred annotation attaches within the base annotation.
enum Attach {
    /// The target is the annotation element itself.
    AnnotationSelf,
    /// A record node, addressed by slot.
    Record(Vec<ValueStep>),
    /// A property value of the record addressed by slot.
    Property(Vec<ValueStep>, SmolStr),
}

/// Second apply pass: re-attempt annotation lists whose target is a nested
/// annotation node, by descending the already-annotated graph itself —
/// split at the first `@`, then walk the remaining `/`-segments as
/// property access. Terms that still do not land are converter errors.
pub(crate) fn apply_deferred_targets(
    map: &mut ObjectMap,
    ctx: &mut Context,
) -> Result<(), ConvertError> {
    let deferred = std::mem::take(&mut ctx.deferred_targets);
    trace!("[DEFERRED] {} deferred target list(s)", deferred.len());

    for list in deferred {
        let Some((base, rest)) = list.target.split_once('@') else {
            ctx.diagnostics.converter_error(format!(
                "Unable to resolve the annotation target: {}",
                list.target
            ));
            continue;
        };
        let mut segments = rest.split('/');
        let head = segments.next().unwrap_or_default();
        let base_annotation_fqn = format!("{base}@{head}");
        let remaining: Vec<&str> = segments.collect();

        let Some(attach) = compute_attach(map, &base_annotation_fqn, &remaining) else {
            ctx.diagnostics.converter_error(format!(
                "Unable to resolve the annotation target: {}\n<Annotation Term = {head}>",
                list.target
            ));
            continue;
        };

        for annotation in &list.annotations {
            let fqn = annotation_key(
                &list.target,
                &annotation.term,
                annotation.qualifier.as_deref(),
            );
            register_annotation(
                map,
                ctx,
                &fqn,
                &annotation.term,
                annotation.qualifier.clone(),
                base,
                &annotation.value,
                &annotation.nested,
                &annotation.source,
            )?;
            attach_annotation(
                map,
                ctx,
                &base_annotation_fqn,
                &attach,
                &annotation.term,
                annotation.qualifier.as_deref(),
                fqn,
            );
        }
    }
    Ok(())
}

/// Validate the `/`-segment walk over the base annotation's value and
/// compute the attach point.
fn compute_attach(map: &ObjectMap, annotation_fqn: &str, segments: &[&str]) -> Option<Attach> {
    let Some(ModelElement::Annotation(annotation)) = map.get(annotation_fqn) else {
        return None;
    };
    if segments.is_empty() {
        return Some(Attach::AnnotationSelf);
    }

    let mut value = annotation.value.as_ref()?;
    let mut steps: Vec<ValueStep> = Vec::new();
    for (position, segment) in segments.iter().enumerate() {
        let last = position + 1 == segments.len();
        if let Ok(index) = segment.parse::<usize>() {
            let AnnotationValue::Collection(collection) = value else {
                return None;
            };
            value = collection.items.get(index)?;
            steps.push(ValueStep::Item(index));
            if last {
                return match value {
                    AnnotationValue::Record(_) => Some(Attach::Record(steps)),
                    _ => None,
                };
            }
        } else {
            let AnnotationValue::Record(record) = value else {
                return None;
            };
            let property_value = record.property_value(segment)?;
            if last {
                return Some(Attach::Property(steps, property_value.name.clone()));
            }
            steps.push(ValueStep::Property(property_value.name.clone()));
            value = &property_value.value;
        }
    }
    None
}

fn attach_annotation(
    map: &mut ObjectMap,
    ctx: &Context,
    base_annotation_fqn: &str,
    attach: &Attach,
    term: &str,
    qualifier: Option<&str>,
    fqn: String,
) {
    let Some(ModelElement::Annotation(owner)) = map.get_mut(base_annotation_fqn) else {
        return;
    };
    match attach {
        Attach::AnnotationSelf => {
            owner.annotations.insert(&ctx.refs, term, qualifier, fqn, true);
        }
        Attach::Record(steps) => {
            if let Some(value) = owner.value.as_mut() {
                if let Some(AnnotationValue::Record(record)) = slot_mut(value, steps) {
                    record.annotations.insert(&ctx.refs, term, qualifier, fqn, true);
                }
            }
        }
        Attach::Property(steps, name) => {
            if let Some(value) = owner.value.as_mut() {
                if let Some(AnnotationValue::Record(record)) = slot_mut(value, steps) {
                    if let Some(property_value) = record.property_value_mut(name) {
                        property_value
                            .annotations
                            .insert(&ctx.refs, term, qualifier, fqn, true);
                    }
                }
            }
        }
    }
}
