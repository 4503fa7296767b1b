//! Source type string translation.
//!
//! Each source variant owns a static, immutable `TypeMapping` built once at
//! first use and never mutated. Lookups are case-insensitive. A string with
//! no entry translates to [`ColumnType::Unknown`] and emits a warning-level
//! diagnostic; it is never an error.
//!
//! Diagnostics go through an injected [`DiagnosticSink`] rather than a
//! global logger, so callers can swap the channel or assert on events in
//! tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::types::ColumnType;

/// A warning-level event emitted during metadata processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A source type string had no entry in the variant's mapping table.
    /// Carries the original, non-normalized string.
    UnmappedType { source_type: String },
}

/// Capability for reporting diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Default sink: one line per event on stderr.
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::UnmappedType { source_type } => {
                eprintln!("metadata: unknown source data type: {}", source_type);
            }
        }
    }
}

/// Sink that collects events for later inspection.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events emitted so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().unwrap().clone()
    }

    /// Remove and return all collected events.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.events.lock().unwrap().push(diagnostic);
    }
}

/// An immutable source-type -> canonical-type lookup table.
///
/// Keys are the normalized (lowercase) source type strings.
pub struct TypeMapping {
    entries: HashMap<&'static str, ColumnType>,
}

impl TypeMapping {
    /// Build a mapping from a static entry table.
    pub fn new(entries: &[(&'static str, ColumnType)]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
        }
    }

    /// Translate a source type string into the canonical vocabulary.
    ///
    /// Case-folds the input before lookup. Unrecognized strings, including
    /// the empty string and parameterized forms like `array(string)`, land
    /// on [`ColumnType::Unknown`] with exactly one diagnostic carrying the
    /// original string. Never fails.
    pub fn map(&self, source_type: &str, diagnostics: &dyn DiagnosticSink) -> ColumnType {
        let normalized = source_type.to_lowercase();

        match self.entries.get(normalized.as_str()) {
            Some(mapped) => *mapped,
            None => {
                diagnostics.emit(Diagnostic::UnmappedType {
                    source_type: source_type.to_string(),
                });
                ColumnType::Unknown
            }
        }
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
