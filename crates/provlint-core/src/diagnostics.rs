//! Diagnostic types emitted by analyzer passes.

use serde::Serialize;
use std::path::PathBuf;

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// File path relative to the unit root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Creates a location from a `proc-macro2` span.
    #[must_use]
    pub fn from_span(file: impl Into<PathBuf>, span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            file: file.into(),
            line: start.line,
            column: start.column + 1,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A position-tagged issue report produced by one analyzer.
///
/// Diagnostics never interrupt scheduling; they are collected, filtered
/// against suppression directives, and handed to the caller sorted by
/// position.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Where the issue was found.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Name of the producing analyzer.
    pub analyzer: &'static str,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub fn new(location: Location, message: impl Into<String>, analyzer: &'static str) -> Self {
        Self {
            location,
            message: message.into(),
            analyzer,
        }
    }

    /// Sort key: file, then line, then column, then analyzer.
    #[must_use]
    pub(crate) fn sort_key(&self) -> (&PathBuf, usize, usize, &'static str) {
        (
            &self.location.file,
            self.location.line,
            self.location.column,
            self.analyzer,
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} [{}]", self.location, self.message, self.analyzer)
    }
}

/// Sorts diagnostics into their stable reporting order.
pub(crate) fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}
