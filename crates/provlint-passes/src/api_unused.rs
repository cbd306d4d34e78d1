//! Unused API surface detection.
//!
//! The inverse of coverage: for each declaring file of the library,
//! lists the exported names the unit never references. A name is only
//! truly dead if no consumer references it, so [`UnusedApi::intersect`]
//! combines the per-unit reports before rendering.

use crate::api_index::{ApiIndex, NamesByFile, API_INDEX};
use crate::usage::{Usage, USAGE};
use provlint_core::{Analyzer, Pass, PassResult, RunError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::sync::Arc;

/// Lists library symbols a unit never references.
pub static API_UNUSED: Analyzer = Analyzer {
    name: "apiunused",
    doc: "lists library symbols a unit never references",
    requires: &[&API_INDEX, &USAGE],
    fact_kinds: &[],
    run,
};

/// Unreferenced library symbols, grouped by declaring filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnusedApi {
    /// Unused names keyed by declaring filename, sorted.
    pub by_file: BTreeMap<String, Vec<String>>,
}

impl UnusedApi {
    /// Returns true if the unit references the whole visible surface.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_file.values().all(Vec::is_empty)
    }

    /// Intersects reports from several units: a name survives only if
    /// every report lists it as unused.
    #[must_use]
    pub fn intersect(reports: &[&UnusedApi]) -> UnusedApi {
        let Some((first, rest)) = reports.split_first() else {
            return UnusedApi::default();
        };
        let mut by_file = BTreeMap::new();
        for (filename, names) in &first.by_file {
            let survivors: Vec<String> = names
                .iter()
                .filter(|name| {
                    rest.iter().all(|report| {
                        report
                            .by_file
                            .get(filename)
                            .is_some_and(|other| other.contains(name))
                    })
                })
                .cloned()
                .collect();
            if !survivors.is_empty() {
                by_file.insert(filename.clone(), survivors);
            }
        }
        UnusedApi { by_file }
    }

    /// Writes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn render_json(&self, out: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, &self.by_file)?;
        writeln!(out)
    }
}

fn run(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    if pass.unit.is_test_unit() {
        return Ok(Arc::new(UnusedApi::default()));
    }
    let index: &ApiIndex = pass.result_of(&API_INDEX)?;
    let usage: &Usage = pass.result_of(&USAGE)?;

    let mut by_file: BTreeMap<String, Vec<String>> = BTreeMap::new();
    leftovers(&mut by_file, &index.types, &usage.types);
    leftovers(&mut by_file, &index.funcs, &usage.funcs);
    leftovers(&mut by_file, &index.methods, &usage.methods);
    leftovers(&mut by_file, &index.fields, &usage.fields);
    for names in by_file.values_mut() {
        names.sort_unstable();
        names.dedup();
    }
    Ok(Arc::new(UnusedApi { by_file }))
}

fn leftovers(
    by_file: &mut BTreeMap<String, Vec<String>>,
    index: &NamesByFile,
    used: &BTreeSet<String>,
) {
    for (filename, names) in index {
        let unused: Vec<String> = names
            .iter()
            .filter(|name| !used.contains(*name))
            .cloned()
            .collect();
        if !unused.is_empty() {
            by_file.entry(filename.clone()).or_default().extend(unused);
        }
    }
}
