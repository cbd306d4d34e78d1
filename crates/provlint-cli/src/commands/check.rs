//! Check command implementation.

use anyhow::{Context, Result};
use provlint_core::Driver;
use provlint_passes::DOC_COVERAGE;
use std::path::Path;

use crate::OutputFormat;

/// Runs the check command.
pub fn run(path: &Path, format: OutputFormat, config: Option<&Path>) -> Result<()> {
    let check = super::resolve_check_config(path, config)?;
    let corpus = crate::loader::load_corpus(path, check)?;
    let driver = Driver::new(&[&DOC_COVERAGE]).context("Failed to build analysis plan")?;

    tracing::info!("Analyzing {} units under {}", corpus.len(), path.display());
    let report = driver.run(&corpus);

    for failure in report.failures() {
        tracing::error!("{failure}");
    }
    for skipped in report.aborted() {
        tracing::warn!(
            "analyzer {} skipped on unit {}: requirement {} has no result",
            skipped.analyzer,
            skipped.unit,
            skipped.requirement
        );
    }
    match format {
        OutputFormat::Text => {
            for diagnostic in report.diagnostics() {
                println!("{diagnostic}");
            }
        }
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(report.diagnostics())
                .context("Failed to serialize diagnostics")?;
            println!("{rendered}");
        }
    }

    if !report.diagnostics().is_empty() || report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
