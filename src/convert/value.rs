//! Annotation value converter.
//!
//! Converts one raw expression node per the closed tag set. Path-family
//! nodes are resolved optimistically against the (possibly incomplete)
//! object map and queued on the pending-resolution worklist for the
//! guaranteed second pass. Record and collection conversion carry the
//! enclosing term and property context for type inference.

use smol_str::SmolStr;
use tracing::trace;

use crate::model::{
    AnnotationValue, Collection, CollectionKind, ModelElement, PathExpression, PropertyValue,
    Record, ValueStep,
};
use crate::raw::{RawAnnotation, RawExpression, RawRecord};
use crate::resolver::{ObjectMap, ResolveOptions, resolve};
use crate::vocabulary::implied_record_type;

use super::{Context, ConvertError, PendingPath};

/// A nested annotation discovered inside a record or property value,
/// registered by the apply pass after the owning annotation lands in the
/// object map.
#[derive(Clone, Debug)]
pub(crate) struct NestedReg {
    /// Slot address of the record node within the owning annotation value.
    pub record_slot: Vec<ValueStep>,
    /// Attach to this property value of the record instead of the record.
    pub property: Option<SmolStr>,
    /// FQN of the annotated node (`...@Term/0` or `...@Term/0/Value`).
    pub node_fqn: String,
    pub raw: RawAnnotation,
}

/// Conversion scope for one annotation.
pub(crate) struct ConversionScope<'a> {
    /// FQN of the annotation being converted.
    pub annotation_fqn: &'a str,
    /// Element FQN relative paths resolve from.
    pub resolution_root: &'a str,
    /// Unaliased enclosing term.
    pub term: &'a str,
}

/// Convert one raw expression into its typed form.
pub(crate) fn convert_expression(
    map: &ObjectMap,
    ctx: &mut Context,
    scope: &ConversionScope<'_>,
    slot: &mut Vec<ValueStep>,
    node_fqn: &str,
    current_property: Option<&str>,
    raw: &RawExpression,
    nested: &mut Vec<NestedReg>,
) -> Result<AnnotationValue, ConvertError> {
    match raw {
        RawExpression::String(value) => Ok(AnnotationValue::String(value.clone())),
        RawExpression::Bool(value) => Ok(AnnotationValue::Bool(*value)),
        RawExpression::Int(value) => Ok(AnnotationValue::Int(*value)),
        RawExpression::Decimal(value) => Ok(AnnotationValue::Decimal(*value)),
        RawExpression::Date(value) => Ok(AnnotationValue::Date(SmolStr::new(value))),
        RawExpression::EnumMember(value) => {
            Ok(AnnotationValue::EnumMember(ctx.refs.realias_enum(value)))
        }
        RawExpression::Path(path) => Ok(AnnotationValue::Path(convert_path(
            map, ctx, scope, slot, node_fqn, path,
        ))),
        RawExpression::PropertyPath(path) => Ok(AnnotationValue::PropertyPath(convert_path(
            map, ctx, scope, slot, node_fqn, path,
        ))),
        RawExpression::NavigationPropertyPath(path) => Ok(
            AnnotationValue::NavigationPropertyPath(convert_path(
                map, ctx, scope, slot, node_fqn, path,
            )),
        ),
        RawExpression::AnnotationPath(path) => Ok(AnnotationValue::AnnotationPath(convert_path(
            map, ctx, scope, slot, node_fqn, path,
        ))),
        RawExpression::Record(record) => Ok(AnnotationValue::Record(convert_record(
            map,
            ctx,
            scope,
            slot,
            node_fqn,
            current_property,
            record,
            nested,
        )?)),
        RawExpression::Collection(items) => convert_collection(
            map,
            ctx,
            scope,
            slot,
            node_fqn,
            current_property,
            items,
            nested,
        ),
        // Dynamic/logical expressions pass through opaquely.
        _ => Ok(AnnotationValue::Dynamic(Box::new(raw.clone()))),
    }
}

/// Build a path node: optimistic resolution now, plus a queued record for
/// the guaranteed second pass.
fn convert_path(
    map: &ObjectMap,
    ctx: &mut Context,
    scope: &ConversionScope<'_>,
    slot: &[ValueStep],
    node_fqn: &str,
    path: &str,
) -> PathExpression {
    let options = ResolveOptions {
        quiet: true,
        ..Default::default()
    };
    let optimistic = resolve(
        map,
        &ctx.refs,
        &mut ctx.diagnostics,
        scope.resolution_root,
        path,
        &options,
    );

    // A path that itself denotes an annotation is resolved inline: the
    // deferred pass splices the target's value over this node.
    let inline = path.contains('@');
    ctx.pending_paths.push_back(PendingPath {
        owner: scope.annotation_fqn.to_string(),
        slot: slot.to_vec(),
        path: path.to_string(),
        start: scope.resolution_root.to_string(),
        term: scope.term.to_string(),
        inline,
    });

    let mut node = PathExpression::new(path, node_fqn);
    node.target = optimistic.element_fqn().map(str::to_string);
    node
}

#[allow(clippy::too_many_arguments)]
fn convert_record(
    map: &ObjectMap,
    ctx: &mut Context,
    scope: &ConversionScope<'_>,
    slot: &mut Vec<ValueStep>,
    node_fqn: &str,
    current_property: Option<&str>,
    raw: &RawRecord,
    nested: &mut Vec<NestedReg>,
) -> Result<Record, ConvertError> {
    let (record_type, type_inferred) = match &raw.record_type {
        Some(explicit) => (Some(ctx.refs.unalias(explicit)), false),
        None => (
            implied_record_type(scope.term, current_property).map(str::to_string),
            true,
        ),
    };

    let mut property_values = Vec::with_capacity(raw.property_values.len());
    for property_value in &raw.property_values {
        let child_fqn = format!("{node_fqn}/{}", property_value.name);
        slot.push(ValueStep::Property(property_value.name.clone()));
        let value = convert_expression(
            map,
            ctx,
            scope,
            slot,
            &child_fqn,
            Some(property_value.name.as_str()),
            &property_value.value,
            nested,
        )?;
        slot.pop();

        for annotation in &property_value.annotations {
            nested.push(NestedReg {
                record_slot: slot.clone(),
                property: Some(property_value.name.clone()),
                node_fqn: child_fqn.clone(),
                raw: annotation.clone(),
            });
        }
        property_values.push(PropertyValue {
            name: property_value.name.clone(),
            value,
            annotations: Default::default(),
        });
    }

    for annotation in &raw.annotations {
        nested.push(NestedReg {
            record_slot: slot.clone(),
            property: None,
            node_fqn: node_fqn.to_string(),
            raw: annotation.clone(),
        });
    }

    let mut record = Record {
        record_type,
        type_inferred,
        fully_qualified_name: node_fqn.to_string(),
        property_values,
        annotations: Default::default(),
        action_target: None,
    };
    resolve_action_target(map, ctx, scope, &mut record);
    Ok(record)
}

/// The DataField(Action) convention: a record whose type names an action
/// data field gets its `Action` string property resolved to the action
/// element, through three fallbacks.
fn resolve_action_target(
    map: &ObjectMap,
    ctx: &mut Context,
    scope: &ConversionScope<'_>,
    record: &mut Record,
) {
    let is_action_field = record
        .record_type
        .as_deref()
        .is_some_and(|record_type| record_type.contains("DataFieldForAction"));
    if !is_action_field {
        return;
    }
    let Some(action_name) = record.property_value("Action").and_then(|pv| match &pv.value {
        AnnotationValue::String(name) => Some(ctx.refs.unalias(&name)),
        _ => None,
    }) else {
        return;
    };

    // 1. Bound overload on the current root type.
    let root = scope
        .resolution_root
        .split('/')
        .next()
        .unwrap_or(scope.resolution_root);
    let bound = format!("{action_name}({root})");
    if map.contains(&bound) {
        record.action_target = Some(bound);
        return;
    }

    // 2. Global lookup: unbound overload, or any overload via the group.
    let unbound = format!("{action_name}()");
    if map.contains(&unbound) {
        record.action_target = Some(unbound);
        return;
    }
    if let Some(ModelElement::UnboundActionGroup(group)) = map.get(&action_name) {
        if let Some(first) = group.overloads.first() {
            record.action_target = Some(first.clone());
            return;
        }
    }

    // 3. Action-import indirection: the last name segment may be an import.
    let import_name = action_name.rsplit('.').next().unwrap_or(&action_name);
    let import_fqn = format!("{}/{import_name}", ctx.container_fqn);
    if let Some(ModelElement::ActionImport(import)) = map.get(&import_fqn) {
        let target = import
            .action
            .clone()
            .unwrap_or_else(|| format!("{}()", import.action_name));
        if map.contains(&target) {
            record.action_target = Some(target);
            return;
        }
    }

    trace!("[CONVERT] unresolved action target '{action_name}'");
    ctx.diagnostics.converter_error(format!(
        "Unable to resolve the action '{action_name}'\n<Annotation Term = {}>\n<Record Type = {}>",
        scope.term,
        record.record_type.as_deref().unwrap_or("unknown"),
    ));
}

#[allow(clippy::too_many_arguments)]
fn convert_collection(
    map: &ObjectMap,
    ctx: &mut Context,
    scope: &ConversionScope<'_>,
    slot: &mut Vec<ValueStep>,
    node_fqn: &str,
    current_property: Option<&str>,
    items: &[RawExpression],
    nested: &mut Vec<NestedReg>,
) -> Result<AnnotationValue, ConvertError> {
    // Homogeneous item kind, inferred from the first element.
    let kind = match items.first() {
        None => {
            return Ok(AnnotationValue::Collection(Collection::empty()));
        }
        Some(RawExpression::PropertyPath(_)) => CollectionKind::PropertyPath,
        Some(RawExpression::Path(_)) => CollectionKind::Path,
        Some(RawExpression::AnnotationPath(_)) => CollectionKind::AnnotationPath,
        Some(RawExpression::NavigationPropertyPath(_)) => CollectionKind::NavigationPropertyPath,
        Some(RawExpression::Record(_)) => CollectionKind::Record,
        Some(RawExpression::String(_)) => CollectionKind::String,
        Some(other) => {
            return Err(ConvertError::UnsupportedCollectionItem {
                term: scope.term.to_string(),
                found: other.kind_name().to_string(),
            });
        }
    };

    let mut converted = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item_matches(kind, item) {
            return Err(ConvertError::UnsupportedCollectionItem {
                term: scope.term.to_string(),
                found: item.kind_name().to_string(),
            });
        }
        let child_fqn = format!("{node_fqn}/{index}");
        slot.push(ValueStep::Item(index));
        let value = convert_expression(
            map,
            ctx,
            scope,
            slot,
            &child_fqn,
            current_property,
            item,
            nested,
        )?;
        slot.pop();
        converted.push(value);
    }

    Ok(AnnotationValue::Collection(Collection {
        kind,
        items: converted,
    }))
}

/// Uniform item handling requires every element to match the inferred kind.
fn item_matches(kind: CollectionKind, item: &RawExpression) -> bool {
    matches!(
        (kind, item),
        (CollectionKind::PropertyPath, RawExpression::PropertyPath(_))
            | (CollectionKind::Path, RawExpression::Path(_))
            | (CollectionKind::AnnotationPath, RawExpression::AnnotationPath(_))
            | (
                CollectionKind::NavigationPropertyPath,
                RawExpression::NavigationPropertyPath(_)
            )
            | (CollectionKind::Record, RawExpression::Record(_))
            | (CollectionKind::String, RawExpression::String(_))
    )
}
