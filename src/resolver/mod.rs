//! Resolution machinery.
//!
//! The object map (FQN → element arena), the builder that flattens a raw
//! metadata document into it, the path-resolution step machine, and the
//! per-conversion diagnostics collector.

mod diagnostics;
mod object_map;
mod path;

pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity};
pub use object_map::{ObjectMap, annotation_fqn, build_object_map};
pub use path::{Resolution, ResolveOptions, resolve};

#[cfg(test)]
mod tests;
