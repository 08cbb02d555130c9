//! Diagnostics — non-fatal resolution and conversion errors.
//!
//! One collector exists per `convert()` call and travels through every
//! pass as part of the conversion context; it is returned inside the
//! converted model. Path-resolution failures are deduplicated by the
//! attempted path string, so a path that fails in ten places yields one
//! entry.

use rustc_hash::FxHashSet;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Structural converter errors: unresolved action targets, dangling
    /// nested-annotation targets.
    Error,
    /// Resolution failures: a path that does not lead anywhere.
    Warning,
}

/// A diagnostic message. Presentation is an external concern; the message
/// is a human-readable block naming the offending term and path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Collects diagnostics during one conversion.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    seen_paths: FxHashSet<String>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unresolvable path, once per distinct path string.
    pub fn path_not_found(&mut self, path: &str, annotation_term: Option<&str>) {
        if !self.seen_paths.insert(path.to_string()) {
            return;
        }
        let mut message = format!("Unable to resolve the path expression: {path}\n");
        if let Some(term) = annotation_term {
            message.push_str(&format!("<Annotation Term = {term}>\n"));
        }
        message.push_str(&format!("<Path = {path}>"));
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    /// Record a non-fatal converter error.
    pub fn converter_error(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.seen_paths.clear();
        std::mem::take(&mut self.diagnostics)
    }
}
