//! Documentation coverage check.
//!
//! Every registered resource and data source must have a documentation
//! page whose filename follows the configured naming convention: strip
//! the configured prefix from the entity name and append the configured
//! suffix. A missing page is reported at the registration site.

use crate::docs_index::{DocsIndex, DOCS_INDEX};
use crate::registry_index::{RegistryIndex, REGISTRY_INDEX};
use provlint_core::{no_result, Analyzer, Pass, PassResult, RunError};

/// Reports registered entities without a documentation page.
pub static DOC_COVERAGE: Analyzer = Analyzer {
    name: "doccoverage",
    doc: "checks that every registered entity has a documentation page",
    requires: &[&DOCS_INDEX, &REGISTRY_INDEX],
    fact_kinds: &[],
    run,
};

fn run(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let docs: &DocsIndex = pass.result_of(&DOCS_INDEX)?;
    let registry: &RegistryIndex = pass.result_of(&REGISTRY_INDEX)?;
    let config = pass.config();

    let mut missing = Vec::new();
    for (name, location) in &registry.resources {
        let page = config.expected_page(name);
        if !docs.has_resource_page(&page) {
            missing.push((
                location.clone(),
                format!("Resource {name:?} is missing a docs page named {page:?}"),
            ));
        }
    }
    for (name, location) in &registry.data_sources {
        let page = config.expected_page(name);
        if !docs.has_data_source_page(&page) {
            missing.push((
                location.clone(),
                format!("Data source {name:?} is missing a docs page named {page:?}"),
            ));
        }
    }
    for (location, message) in missing {
        pass.report(location, message);
    }
    Ok(no_result())
}
