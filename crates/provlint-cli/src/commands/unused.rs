//! Unused command implementation.

use anyhow::{bail, Context, Result};
use provlint_core::Driver;
use provlint_passes::{UnusedApi, API_UNUSED};
use std::path::Path;

/// Runs the unused command.
///
/// A symbol is reported only when every consumer of the library leaves
/// it unreferenced, so the per-unit reports are intersected first.
pub fn run(path: &Path, config: Option<&Path>) -> Result<()> {
    let check = super::resolve_check_config(path, config)?;
    let corpus = crate::loader::load_corpus(path, check)?;
    let driver = Driver::new(&[&API_UNUSED]).context("Failed to build analysis plan")?;
    let report = driver.run(&corpus);

    for failure in report.failures() {
        tracing::error!("{failure}");
    }

    let per_consumer: Vec<&UnusedApi> = corpus
        .units()
        .filter(|unit| super::coverage::is_consumer(&corpus, unit))
        .filter_map(|unit| report.result_of(&API_UNUSED, unit.id))
        .collect();
    if per_consumer.is_empty() {
        bail!("no unit imports the library unit {:?}", corpus.check().library_unit);
    }

    let merged = UnusedApi::intersect(&per_consumer);
    let mut stdout = std::io::stdout().lock();
    merged
        .render_json(&mut stdout)
        .context("Failed to write unused report")?;

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
