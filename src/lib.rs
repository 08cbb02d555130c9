//! # edmlink
//!
//! Annotation and metadata resolution engine for OData CSDL models.
//!
//! Takes the raw metadata document produced by an external CSDL/XML or CDS
//! parser and resolves it into a single, fully cross-linked, strongly-typed
//! in-memory model that UI-generation layers can navigate without re-parsing
//! strings.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! writeback  → reverse converter (typed model → raw expressions)
//!   ↓
//! convert    → value converter, linker, merge/apply, deferred passes, convert()
//!   ↓
//! resolver   → object map builder, path resolver, diagnostics
//!   ↓
//! model      → resolved model elements, annotation index, typed values
//!   ↓
//! vocabulary → alias/unalias, default references, term-to-type lookup
//!   ↓
//! raw        → raw metadata input model (entity types, sets, expressions)
//! ```

// ============================================================================
// MODULES (dependency order: raw → vocabulary → model → resolver → convert)
// ============================================================================

/// Raw metadata input model: schema artifacts and annotation expressions
pub mod raw;

/// Vocabulary references: alias/unalias, default table, term-to-type lookup
pub mod vocabulary;

/// Resolved model: elements, annotation index, typed annotation values
pub mod model;

/// Resolution machinery: object map builder, path resolver, diagnostics
pub mod resolver;

/// Conversion passes: value converter, linker, merge/apply, deferred, convert()
pub mod convert;

/// Reverse converter: typed model back to raw annotation expressions
pub mod writeback;

// Re-export the primary entry points
pub use convert::{ConvertError, ConvertedMetadata, convert};
pub use raw::RawMetadata;
pub use resolver::{Diagnostic, Severity};
pub use vocabulary::VocabularyReferences;
pub use writeback::Writeback;
