//! Source index and context-aware completion engine for BRS game scripts.
//!
//! The engine keeps a best-effort view of a project's source: the
//! [`DefinitionIndex`] extracts named declarations from the entry file,
//! the [`InterfaceIndex`] infers each declared interface's settable
//! properties from its implementation function, and [`context::resolve`]
//! classifies a caret position into the namespace it is completing in
//! (the `game.` root, an object's `object.` override scope, the `m.`
//! instance scope, or a named interface) and assembles its suggestions.
//!
//! Everything is regex-over-text by design: no parsing, no diagnostics,
//! and failures only ever degrade the suggestion set. [`Analyzer`] ties
//! the pieces into one owned service; [`scan_project`] builds one from a
//! directory tree.

/// The analyzer facade and on-disk project scanning.
pub mod analyzer;
/// Static suggestion catalogs for the built-in namespaces.
pub mod catalog;
/// Caret context classification and suggestion assembly.
pub mod context;
/// Declaration scanning and the per-kind definition index.
pub mod definitions;
/// Error types for on-disk project scanning.
pub mod error;
/// Interface property inference.
pub mod interfaces;
mod scan;

/// Re-export the analyzer entry points.
pub use analyzer::{Analyzer, is_entry_file, scan_project};
/// Re-export the suggestion model.
pub use catalog::{SuggestionItem, SuggestionKind};
/// Re-export context resolution results.
pub use context::{Completion, TriggerNamespace};
/// Re-export the declaration model.
pub use definitions::{Declaration, DeclarationKind, DefinitionIndex};
/// Re-export scanning errors.
pub use error::{ScanError, ScanResult};
/// Re-export the interface property model.
pub use interfaces::{InterfaceIndex, PropertyDescriptor, PropertyKind};
