//! Error types for the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors, detected before any pass runs.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Two registered analyzers share a name.
    #[error("duplicate analyzer name: {0}")]
    DuplicateAnalyzer(String),

    /// The analyzer Requires graph contains a cycle.
    #[error("analyzer dependency cycle: {}", cycle.join(" -> "))]
    RequiresCycle {
        /// The names forming the cycle, in dependency order.
        cycle: Vec<String>,
    },

    /// The unit import graph contains a cycle, so no processing order exists.
    #[error("unit import cycle: {}", cycle.join(" -> "))]
    ImportCycle {
        /// The unit names forming the cycle.
        cycle: Vec<String>,
    },

    /// An explicit import names a unit that is not part of the corpus.
    #[error("unit {unit} imports unknown unit {import}")]
    UnknownImport {
        /// The importing unit.
        unit: String,
        /// The unresolved import name.
        import: String,
    },
}

/// Errors raised while constructing a [`Corpus`](crate::Corpus).
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A source file failed to parse.
    #[error("parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Two units share a name.
    #[error("duplicate unit name: {0}")]
    DuplicateUnit(String),

    /// The corpus violates a scheduling precondition.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Error returned by an analyzer's run function.
///
/// A `RunError` aborts the failing analyzer's downstream chain within the
/// current unit; sibling units and independent analyzer subtrees proceed.
#[derive(Debug, Error)]
pub enum RunError {
    /// IO error while reading collaborator data.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Syntax error while re-parsing a source file.
    #[error("syntax error: {0}")]
    Syntax(#[from] syn::Error),

    /// Misuse of the pass context.
    #[error(transparent)]
    Pass(#[from] PassError),

    /// Free-form failure description.
    #[error("{0}")]
    Message(String),
}

impl RunError {
    /// Creates a free-form run error.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Programming errors in the use of a [`Pass`](crate::Pass) context.
#[derive(Debug, Error)]
pub enum PassError {
    /// `result_of` was called for an analyzer not listed in `requires`.
    #[error("analyzer {analyzer} did not declare a dependency on {requested}")]
    UndeclaredDependency {
        /// The calling analyzer.
        analyzer: &'static str,
        /// The analyzer whose result was requested.
        requested: &'static str,
    },

    /// A declared dependency produced no result for this unit.
    #[error("dependency {requested} has no result for unit {unit}")]
    MissingResult {
        /// The analyzer whose result was requested.
        requested: &'static str,
        /// The unit being analyzed.
        unit: String,
    },

    /// A dependency result could not be downcast to the requested type.
    #[error("result of {requested} has an unexpected type")]
    ResultType {
        /// The analyzer whose result was requested.
        requested: &'static str,
    },

    /// A fact export named a symbol declared by a different unit.
    #[error("analyzer {analyzer} exported a fact for a symbol outside unit {unit}")]
    ForeignSymbol {
        /// The exporting analyzer.
        analyzer: &'static str,
        /// The unit being analyzed.
        unit: String,
    },

    /// A fact export used a kind the analyzer did not declare.
    #[error("analyzer {analyzer} did not declare fact kind {kind}")]
    UndeclaredFactKind {
        /// The exporting analyzer.
        analyzer: &'static str,
        /// The undeclared kind tag.
        kind: &'static str,
    },
}

/// A recorded analyzer failure for one unit.
#[derive(Debug, Error)]
#[error("analyzer {analyzer} failed on unit {unit}: {error}")]
pub struct PassFailure {
    /// Name of the failing analyzer.
    pub analyzer: &'static str,
    /// Name of the unit it failed on.
    pub unit: String,
    /// The underlying error.
    #[source]
    pub error: RunError,
}
