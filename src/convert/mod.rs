//! Conversion passes and the `convert()` entry point.
//!
//! Strict pass order: build the object map → link navigation properties →
//! merge annotation lists (normalizing container targets) → link actions,
//! imports, sets/singletons and structural properties → apply merged
//! annotations → apply the deferred nested-annotation bucket → run the
//! deferred path-target pass → assemble the final projection.

mod deferred;
mod linker;
mod merge;
mod value;

use std::collections::VecDeque;

use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

use crate::model::{Annotation, ModelElement, ValueStep};
use crate::raw::{RawMetadata, RawReference};
use crate::resolver::{
    Diagnostic, DiagnosticCollector, ObjectMap, Resolution, ResolveOptions, build_object_map,
    resolve,
};
use crate::vocabulary::VocabularyReferences;

pub(crate) use merge::MergedAnnotation;

/// Fatal structural violations. These abort the whole conversion with no
/// partial output; resolution failures never take this path.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A non-empty collection whose first item has no recognized shape.
    #[error("unsupported collection item shape '{found}' under term '{term}'")]
    UnsupportedCollectionItem { term: String, found: String },

    /// A structural property referencing a type that exists nowhere.
    #[error("property '{property}' references unknown type '{type_name}'")]
    UnknownPropertyType { property: String, type_name: String },

    /// `resolve_path` with a relative root it cannot anchor.
    #[error("cannot resolve path root for '{0}': paths must start with '/'")]
    InvalidPathRoot(String),
}

/// One queued forward reference: a path-family node awaiting the complete
/// object map.
#[derive(Clone, Debug)]
pub(crate) struct PendingPath {
    /// FQN of the annotation element owning the node.
    pub owner: String,
    /// Slot address of the node within the annotation value tree.
    pub slot: Vec<ValueStep>,
    /// The raw path string.
    pub path: String,
    /// Element FQN resolution starts from.
    pub start: String,
    /// Unaliased term, for diagnostics.
    pub term: String,
    /// Inline targets splice the resolved annotation's value over the
    /// node instead of merely setting `target`.
    pub inline: bool,
}

/// An annotation list whose target was absent from the object map during
/// the apply pass (it points at a nested annotation node); re-attempted by
/// the second apply pass.
#[derive(Clone, Debug)]
pub(crate) struct DeferredAnnotationList {
    pub target: String,
    pub annotations: Vec<MergedAnnotation>,
}

/// Per-call conversion context. Replaces any process-wide state: the
/// diagnostics collector and both worklists live and die with one
/// `convert()` call.
pub(crate) struct Context {
    pub refs: VocabularyReferences,
    pub diagnostics: DiagnosticCollector,
    pub pending_paths: VecDeque<PendingPath>,
    pub deferred_targets: Vec<DeferredAnnotationList>,
    pub container_fqn: String,
}

impl Context {
    fn new(refs: VocabularyReferences, container_fqn: String) -> Self {
        Self {
            refs,
            diagnostics: DiagnosticCollector::new(),
            pending_paths: VecDeque::new(),
            deferred_targets: Vec::new(),
            container_fqn,
        }
    }
}

/// The finished model: every list holds FQNs into the object map.
#[derive(Debug)]
pub struct ConvertedMetadata {
    pub version: SmolStr,
    pub namespace: String,
    pub entity_container: String,
    pub entity_types: Vec<String>,
    pub complex_types: Vec<String>,
    pub type_definitions: Vec<String>,
    pub entity_sets: Vec<String>,
    pub singletons: Vec<String>,
    pub actions: Vec<String>,
    pub action_imports: Vec<String>,
    /// Defaults ∪ project-specific references.
    pub references: Vec<RawReference>,
    pub diagnostics: Vec<Diagnostic>,
    object_map: ObjectMap,
    refs: VocabularyReferences,
}

impl ConvertedMetadata {
    pub fn element(&self, fqn: &str) -> Option<&ModelElement> {
        self.object_map.get(fqn)
    }

    pub fn object_map(&self) -> &ObjectMap {
        &self.object_map
    }

    pub fn vocabulary(&self) -> &VocabularyReferences {
        &self.refs
    }

    /// The annotation applied to `target` under `term` (aliased or
    /// unaliased spelling, optional `#qualifier`).
    pub fn annotation_on(&self, target: &str, term: &str) -> Option<&Annotation> {
        let element = self.object_map.get(target)?;
        let fqn = element.annotations().lookup(&self.refs, term)?;
        self.object_map.get(fqn)?.as_annotation()
    }

    /// Resolve a model path from the container.
    ///
    /// In default mode the path must start with `/`; its leading segment
    /// is taken as an entity set or singleton name, falling back to the
    /// container itself when it names neither. `resolve_directly` skips
    /// the leading-segment parse and resolves straight from the container
    /// root.
    pub fn resolve_path(
        &self,
        path: &str,
        resolve_directly: bool,
    ) -> Result<Resolution, ConvertError> {
        // Post-convert queries keep the model's diagnostics frozen.
        let mut scratch = DiagnosticCollector::new();
        let options = ResolveOptions::default();

        if resolve_directly {
            return Ok(resolve(
                &self.object_map,
                &self.refs,
                &mut scratch,
                &self.entity_container,
                path.trim_start_matches('/'),
                &options,
            ));
        }

        let Some(rest) = path.strip_prefix('/') else {
            return Err(ConvertError::InvalidPathRoot(path.to_string()));
        };
        let (head, tail) = match rest.split_once('/') {
            Some((head, tail)) => (head, tail),
            None => (rest, ""),
        };
        let candidate = format!("{}/{head}", self.entity_container);
        let is_set_like = matches!(
            self.object_map.get(&candidate),
            Some(ModelElement::EntitySet(_) | ModelElement::Singleton(_))
        );
        if is_set_like {
            Ok(resolve(
                &self.object_map,
                &self.refs,
                &mut scratch,
                &candidate,
                tail,
                &options,
            ))
        } else {
            Ok(resolve(
                &self.object_map,
                &self.refs,
                &mut scratch,
                &self.entity_container,
                rest,
                &options,
            ))
        }
    }

    /// Resolve a path relative to any element of the model.
    pub fn resolve_from(&self, start: &str, path: &str) -> Resolution {
        let mut scratch = DiagnosticCollector::new();
        resolve(
            &self.object_map,
            &self.refs,
            &mut scratch,
            start,
            path,
            &ResolveOptions::default(),
        )
    }
}

/// Convert one raw metadata document into a fully cross-linked model.
///
/// The input is read, never mutated; every call builds the output graph
/// from scratch. Resolution failures surface as diagnostics on the result,
/// structural violations as `Err`.
pub fn convert(raw: &RawMetadata) -> Result<ConvertedMetadata, ConvertError> {
    let schema = &raw.schema;
    let namespace = schema.namespace.as_str();
    let container_fqn = format!("{namespace}.{}", schema.entity_container.name);

    // Project references, plus the schema's own alias when declared.
    let mut extras = raw.references.clone();
    if let Some(alias) = &schema.alias {
        if !extras.iter().any(|r| r.alias == *alias) {
            extras.push(RawReference::new(alias.clone(), namespace));
        }
    }
    let refs = VocabularyReferences::with_extras(&extras);
    let mut ctx = Context::new(refs, container_fqn.clone());

    debug!("[CONVERT] building object map for {namespace}");
    let mut map = build_object_map(raw, &ctx.refs);

    linker::link_navigation_properties(&mut map, &ctx.refs, &schema.associations);
    linker::link_actions(&mut map);
    linker::link_action_imports(&mut map);
    linker::link_sets_and_singletons(&mut map);
    linker::link_properties(&mut map)?;

    let merged = merge::merge_annotation_lists(&ctx.refs, schema, &container_fqn);

    merge::apply_annotations(&mut map, &mut ctx, merged)?;
    deferred::apply_deferred_targets(&mut map, &mut ctx)?;
    deferred::process_pending_paths(&mut map, &mut ctx);

    let diagnostics = ctx.diagnostics.take();
    debug!(
        "[CONVERT] done: {} elements, {} diagnostics",
        map.len(),
        diagnostics.len()
    );

    Ok(ConvertedMetadata {
        version: raw.version.clone(),
        namespace: namespace.to_string(),
        entity_container: container_fqn.clone(),
        entity_types: schema
            .entity_types
            .iter()
            .map(|entity_type| format!("{namespace}.{}", entity_type.name))
            .collect(),
        complex_types: schema
            .complex_types
            .iter()
            .map(|complex_type| format!("{namespace}.{}", complex_type.name))
            .collect(),
        type_definitions: schema
            .type_definitions
            .iter()
            .map(|definition| format!("{namespace}.{}", definition.name))
            .collect(),
        entity_sets: schema
            .entity_sets
            .iter()
            .map(|set| format!("{container_fqn}/{}", set.name))
            .collect(),
        singletons: schema
            .singletons
            .iter()
            .map(|singleton| format!("{container_fqn}/{}", singleton.name))
            .collect(),
        actions: schema
            .actions
            .iter()
            .map(|action| overload_fqn(namespace, action, &ctx.refs))
            .collect(),
        action_imports: schema
            .action_imports
            .iter()
            .map(|import| format!("{container_fqn}/{}", import.name))
            .collect(),
        references: ctx.refs.references().to_vec(),
        diagnostics,
        object_map: map,
        refs: ctx.refs,
    })
}

fn overload_fqn(
    namespace: &str,
    action: &crate::raw::RawAction,
    refs: &VocabularyReferences,
) -> String {
    match action.source_type.as_deref() {
        Some(source_type) if action.is_bound => {
            format!("{namespace}.{}({})", action.name, refs.unalias(source_type))
        }
        _ => format!("{namespace}.{}()", action.name),
    }
}
