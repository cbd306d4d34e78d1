//! # provlint-passes
//!
//! Built-in analysis passes for provlint.
//!
//! This crate provides the provider-oriented analyzers that run on top of
//! the `provlint-core` scheduling engine.
//!
//! ## Available Analyzers
//!
//! | Name | Description |
//! |------|-------------|
//! | `docsindex` | Indexes documentation pages under the docs directory |
//! | `registryindex` | Indexes registered resource and data source names |
//! | `doccoverage` | Checks that every registered entity has a documentation page |
//! | `apiindex` | Indexes the exported API surface of the library unit |
//! | `usage` | Collects library symbol references made by a unit |
//! | `apicovered` | Measures how much of the library surface a unit exercises |
//! | `apiunused` | Lists library symbols a unit never references |
//!
//! ## Usage
//!
//! ```ignore
//! use provlint_core::Driver;
//! use provlint_passes::{DOC_COVERAGE, API_COVERAGE};
//!
//! let driver = Driver::new(&[&DOC_COVERAGE, &API_COVERAGE])?;
//! let report = driver.run(&corpus);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api_coverage;
mod api_index;
mod api_unused;
mod doc_coverage;
mod docs_index;
mod registry_index;
mod usage;

pub use api_coverage::{render_coverage_table, Coverage, Fraction, API_COVERAGE};
pub use api_index::{
    ApiIndex, NameInFile, NamesByFile, API_INDEX, FACT_API_FIELD, FACT_API_FUNC, FACT_API_METHOD,
    FACT_API_TYPE,
};
pub use api_unused::{UnusedApi, API_UNUSED};
pub use doc_coverage::DOC_COVERAGE;
pub use docs_index::{DocPage, DocsIndex, DOCS_INDEX};
pub use registry_index::{RegistryIndex, REGISTRY_INDEX};
pub use usage::{Usage, USAGE};

use provlint_core::Analyzer;

/// All built-in analyzers in a stable listing order.
#[must_use]
pub fn all_analyzers() -> Vec<&'static Analyzer> {
    vec![
        &DOCS_INDEX,
        &REGISTRY_INDEX,
        &DOC_COVERAGE,
        &API_INDEX,
        &USAGE,
        &API_COVERAGE,
        &API_UNUSED,
    ]
}
