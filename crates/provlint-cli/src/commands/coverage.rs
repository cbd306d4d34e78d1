//! Coverage command implementation.

use anyhow::{bail, Context, Result};
use provlint_core::{Corpus, Driver, RunReport, Unit};
use provlint_passes::{render_coverage_table, Coverage, API_COVERAGE};
use std::path::Path;

/// Runs the coverage command.
pub fn run(path: &Path, config: Option<&Path>) -> Result<()> {
    let check = super::resolve_check_config(path, config)?;
    let corpus = crate::loader::load_corpus(path, check)?;
    let driver = Driver::new(&[&API_COVERAGE]).context("Failed to build analysis plan")?;
    let report = driver.run(&corpus);

    for failure in report.failures() {
        tracing::error!("{failure}");
    }

    let rows = consumer_rows(&corpus, &report);
    if rows.is_empty() {
        bail!("no unit imports the library unit {:?}", corpus.check().library_unit);
    }
    let mut stdout = std::io::stdout().lock();
    render_coverage_table(&rows, &mut stdout).context("Failed to write coverage table")?;

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

/// Collects per-consumer coverage results, skipping units with no
/// visible library surface (including the library itself).
pub(super) fn consumer_rows<'a>(
    corpus: &Corpus,
    report: &'a RunReport,
) -> Vec<(String, &'a Coverage)> {
    corpus
        .units()
        .filter(|unit| is_consumer(corpus, unit))
        .filter_map(|unit| {
            let coverage: &Coverage = report.result_of(&API_COVERAGE, unit.id)?;
            (!coverage.is_empty()).then(|| (unit.name.clone(), coverage))
        })
        .collect()
}

/// A consumer is any non-test unit, other than the library itself, that
/// can see the library unit through its imports.
pub(super) fn is_consumer(corpus: &Corpus, unit: &Unit) -> bool {
    let Some(library) = corpus.unit_by_name(&corpus.check().library_unit) else {
        return false;
    };
    unit.id != library.id && !unit.is_test_unit() && corpus.is_visible_from(unit.id, library.id)
}
