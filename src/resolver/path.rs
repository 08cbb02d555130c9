//! Path resolver — the per-kind step machine over the object map.
//!
//! Resolves a relative or absolute CSDL path string against the object map
//! by left-folding over its segments, applying one navigation rule per
//! element kind. Failure is never fatal: an unresolved fold records one
//! diagnostic per distinct path string and yields `Unresolved`.

use tracing::{trace, warn};

use crate::model::ModelElement;
use crate::vocabulary::VocabularyReferences;

use super::diagnostics::DiagnosticCollector;
use super::object_map::ObjectMap;

/// Recursion bound for `$Path`/`$AnnotationPath` re-entry; annotation
/// chains deeper than this are cyclic input.
const MAX_DEPTH: usize = 32;

#[derive(Clone, Copy, Debug, Default)]
pub struct ResolveOptions<'a> {
    /// Return the best-effort FQN string instead of requiring a map hit.
    pub path_only: bool,
    /// Collect every intermediate element visited by the fold.
    pub include_visited: bool,
    /// Term named in diagnostics for unresolved paths.
    pub annotation_term: Option<&'a str>,
    /// Suppress diagnostics (optimistic first-pass resolution).
    pub quiet: bool,
}

/// Outcome of one resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// The path leads to an element in the map.
    Element { fqn: String, visited: Vec<String> },
    /// `$Parameter` as final segment: the action's parameter list.
    Parameters {
        action: String,
        parameters: Vec<String>,
    },
    /// `path_only` mode: the FQN string constructed so far.
    PathOnly(String),
    Unresolved,
}

impl Resolution {
    pub fn element_fqn(&self) -> Option<&str> {
        match self {
            Resolution::Element { fqn, .. } => Some(fqn),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolution::Unresolved)
    }
}

/// Resolve `path` against the map, starting from the element `start`.
pub fn resolve(
    map: &ObjectMap,
    refs: &VocabularyReferences,
    diagnostics: &mut DiagnosticCollector,
    start: &str,
    path: &str,
    options: &ResolveOptions,
) -> Resolution {
    resolve_inner(map, refs, diagnostics, start, path, options, 0)
}

fn resolve_inner(
    map: &ObjectMap,
    refs: &VocabularyReferences,
    diagnostics: &mut DiagnosticCollector,
    start: &str,
    path: &str,
    options: &ResolveOptions,
    depth: usize,
) -> Resolution {
    if depth > MAX_DEPTH {
        warn!("[RESOLVE] depth limit hit for '{path}' from '{start}'");
        return fail(diagnostics, path, options, start.to_string());
    }
    trace!("[RESOLVE] '{path}' from '{start}'");

    // Re-root a Property-typed start element to its owning type.
    let mut current = match map.get(start) {
        Some(ModelElement::Property(_)) => start
            .split('/')
            .next()
            .unwrap_or(start)
            .to_string(),
        _ => start.to_string(),
    };

    let segments = split_segments(refs, path);
    let mut visited: Vec<String> = Vec::new();
    let mut index = 0;

    while index < segments.len() {
        let segment = segments[index].as_str();

        let step: Option<String> = match map.get(&current) {
            Some(ModelElement::EntitySet(set)) => step_set_like(
                map,
                &current,
                segment,
                set.entity_type.as_deref(),
                &set.entity_type_name,
                |nav| set.navigation_property_binding.get(nav),
                &segments,
                &mut index,
            ),
            Some(ModelElement::Singleton(singleton)) => step_set_like(
                map,
                &current,
                segment,
                singleton.entity_type.as_deref(),
                &singleton.entity_type_name,
                |nav| singleton.navigation_property_binding.get(nav),
                &segments,
                &mut index,
            ),
            Some(ModelElement::NavigationProperty(nav)) => {
                let direct = combine(&current, segment);
                if map.contains(&direct) {
                    Some(direct)
                } else if let Some(target) =
                    nav.target_type.as_deref().or(nav.target_type_name.as_deref())
                {
                    Some(combine(target, segment))
                } else {
                    Some(direct)
                }
            }
            Some(ModelElement::Action(action)) => {
                if segment == "$Parameter" {
                    if index + 1 == segments.len() {
                        return Resolution::Parameters {
                            action: current.clone(),
                            parameters: action.parameters.clone(),
                        };
                    }
                    index += 1;
                    Some(combine(&current, segments[index].as_str()))
                } else {
                    let candidate = combine(&current, segment);
                    if map.contains(&candidate) {
                        Some(candidate)
                    } else if let Some(source) = action
                        .source_type
                        .as_deref()
                        .or(action.source_type_name.as_deref())
                    {
                        Some(combine(source, segment))
                    } else {
                        Some(candidate)
                    }
                }
            }
            Some(ModelElement::ActionParameter(parameter)) => {
                // Rebase relative to the parent action.
                let action_fqn = current
                    .rsplit_once('/')
                    .map(|(action, _)| action.to_string())
                    .unwrap_or_else(|| current.clone());
                let candidate = combine(&action_fqn, segment);
                if map.contains(&candidate) {
                    Some(candidate)
                } else {
                    Some(combine(&parameter.type_name, segment))
                }
            }
            Some(ModelElement::Annotation(annotation))
                if segment == "$AnnotationPath" || segment == "$Path" =>
            {
                // Re-enter the resolver from the annotation's own target
                // and merge the recursive visited chain into ours.
                let path_value = annotation
                    .value
                    .as_ref()
                    .and_then(|value| value.as_path_expression())
                    .map(|path| path.value.clone());
                match path_value {
                    Some(inner_path) => {
                        let owner_end = annotation
                            .fully_qualified_name
                            .rfind('@')
                            .unwrap_or(annotation.fully_qualified_name.len());
                        let owner = annotation.fully_qualified_name[..owner_end].to_string();
                        let inner_options = ResolveOptions {
                            path_only: false,
                            include_visited: true,
                            annotation_term: options.annotation_term,
                            quiet: options.quiet,
                        };
                        match resolve_inner(
                            map,
                            refs,
                            diagnostics,
                            &owner,
                            &inner_path,
                            &inner_options,
                            depth + 1,
                        ) {
                            Resolution::Element {
                                fqn,
                                visited: inner_visited,
                            } => {
                                visited.extend(inner_visited);
                                Some(fqn)
                            }
                            _ => None,
                        }
                    }
                    None => None,
                }
            }
            // Default: direct structural field access. Also taken when the
            // intermediate FQN is not (yet) a map entry.
            _ => Some(combine(&current, segment)),
        };

        match step {
            Some(next) => current = next,
            None => return fail(diagnostics, path, options, current),
        }
        if options.include_visited {
            if let Some(key) = map.canonical_key(&current) {
                visited.push(key.to_string());
            }
        }
        index += 1;
    }

    if options.path_only {
        return Resolution::PathOnly(current);
    }
    match map.canonical_key(&current) {
        Some(key) => Resolution::Element {
            fqn: key.to_string(),
            visited,
        },
        None => fail(diagnostics, path, options, current),
    }
}

/// Navigation rule shared by entity sets and singletons.
#[allow(clippy::too_many_arguments)]
fn step_set_like<'a>(
    map: &ObjectMap,
    current: &str,
    segment: &str,
    entity_type: Option<&str>,
    entity_type_name: &str,
    binding: impl Fn(&str) -> Option<&'a String>,
    segments: &[String],
    index: &mut usize,
) -> Option<String> {
    let type_fqn = entity_type.unwrap_or(entity_type_name);
    match segment {
        "" | "$Type" => Some(type_fqn.to_string()),
        "$NavigationPropertyBinding" => {
            *index += 1;
            let nav = segments.get(*index)?;
            let target = binding(nav.as_str())?;
            if map.contains(target) {
                Some(target.clone())
            } else {
                // Plain set/singleton name: qualify with the container.
                let container = current.rsplit_once('/').map(|(c, _)| c)?;
                Some(format!("{container}/{target}"))
            }
        }
        _ if segment.starts_with('@') => Some(combine(current, segment)),
        _ => Some(combine(type_fqn, segment)),
    }
}

/// Combine a base FQN with one segment, honoring the `@`-escape rule:
/// annotation segments are appended without a `/` separator.
fn combine(base: &str, segment: &str) -> String {
    if segment.is_empty() {
        base.to_string()
    } else if segment.starts_with('@') {
        format!("{base}{segment}")
    } else {
        format!("{base}/{segment}")
    }
}

/// Split a path on `/`, further splitting any segment containing `@` into
/// a structural part and an (unaliased) annotation part.
fn split_segments(refs: &VocabularyReferences, path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    for chunk in path.split('/') {
        match chunk.find('@') {
            Some(at) if at > 0 => {
                segments.push(chunk[..at].to_string());
                segments.push(unalias_annotation_segment(refs, &chunk[at..]));
            }
            Some(_) => segments.push(unalias_annotation_segment(refs, chunk)),
            None => segments.push(chunk.to_string()),
        }
    }
    segments
}

/// `@Alias.Term#q` → `@ns.Term#q`; meta-segments (`$AnnotationPath`) and
/// already-unaliased terms pass through.
fn unalias_annotation_segment(refs: &VocabularyReferences, segment: &str) -> String {
    match segment.strip_prefix('@') {
        Some(term) => format!("@{}", refs.unalias(term)),
        None => segment.to_string(),
    }
}

fn fail(
    diagnostics: &mut DiagnosticCollector,
    path: &str,
    options: &ResolveOptions,
    best_effort: String,
) -> Resolution {
    if options.path_only {
        return Resolution::PathOnly(best_effort);
    }
    if !options.quiet {
        diagnostics.path_not_found(path, options.annotation_term);
    }
    Resolution::Unresolved
}
