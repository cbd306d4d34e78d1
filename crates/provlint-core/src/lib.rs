//! # provlint-core
//!
//! A framework for composing lint and analysis checks over a multi-unit
//! source corpus. Checks ([`Analyzer`]s) declare requirements on each
//! other; the [`Driver`] schedules the resulting graph over the corpus,
//! memoizing each pass's [result](PassResult) per unit and propagating
//! [facts](FactStore) across unit boundaries so that whole-corpus
//! properties ("is this exported symbol referenced anywhere?") stay
//! expressible.
//!
//! - [`Analyzer`]: immutable pass descriptor with declared requirements
//! - [`Corpus`] / [`Unit`]: compilation units, symbols, import graph
//! - [`Pass`]: per-(analyzer, unit) execution environment
//! - [`FactStore`]: the only channel that crosses unit boundaries
//! - [`Driver`]: dependency-ordered, wave-parallel scheduling
//! - [`SuppressionIndex`]: inline `lintignore:<name>` directives
//!
//! ## Example
//!
//! ```ignore
//! use provlint_core::{Corpus, Driver, UnitSource};
//!
//! let corpus = Corpus::builder()
//!     .unit(UnitSource::new("provider").file("main.rs", source))
//!     .build()?;
//! let driver = Driver::new(&[&MY_CHECK])?;
//! let report = driver.run(&corpus);
//! for diagnostic in report.diagnostics() {
//!     println!("{diagnostic}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod diagnostics;
mod driver;
mod error;
mod facts;
mod graph;
mod pass;
mod suppress;
mod unit;

pub use analyzer::{no_result, Analyzer, PassResult, RunFn};
pub use config::{CheckConfig, Config, ConfigError};
pub use diagnostics::{Diagnostic, Location};
pub use driver::{AbortedPass, AnalyzerId, Driver, RunReport};
pub use error::{ConfigurationError, CorpusError, PassError, PassFailure, RunError};
pub use facts::{FactKind, FactStore, FactValue};
pub use graph::DependencyGraph;
pub use pass::Pass;
pub use suppress::SuppressionIndex;
pub use unit::{
    Corpus, CorpusBuilder, SourceFile, Symbol, SymbolId, SymbolKey, SymbolKind, SymbolTable, Unit,
    UnitId, UnitSource,
};
