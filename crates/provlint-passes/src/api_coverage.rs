//! API coverage measurement.
//!
//! Compares the names a unit references against the library surface
//! visible to it and computes, per declaring file, the fraction of
//! exported symbols the unit exercises. A file with no indexed symbols
//! counts as fully covered.

use crate::api_index::{ApiIndex, NamesByFile, API_INDEX};
use crate::usage::{Usage, USAGE};
use provlint_core::{Analyzer, Pass, PassResult, RunError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::sync::Arc;

/// Measures per-file coverage of the library surface by each unit.
pub static API_COVERAGE: Analyzer = Analyzer {
    name: "apicovered",
    doc: "measures how much of the library surface a unit exercises",
    requires: &[&API_INDEX, &USAGE],
    fact_kinds: &[],
    run,
};

/// A used-out-of-total count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Fraction {
    /// Symbols the unit references.
    pub used: usize,
    /// Symbols the file exports.
    pub total: usize,
}

impl Fraction {
    /// Coverage as a percentage. An empty surface is fully covered.
    #[must_use]
    pub fn percent(self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.used as f64 / self.total as f64 * 100.0
        }
    }
}

/// Per-file coverage of the library surface by one unit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Coverage {
    /// Coverage keyed by declaring filename.
    pub by_file: BTreeMap<String, Fraction>,
}

impl Coverage {
    /// Returns true if no library surface was visible to the unit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty()
    }

    /// Sum of all per-file fractions.
    #[must_use]
    pub fn total(&self) -> Fraction {
        let mut sum = Fraction::default();
        for fraction in self.by_file.values() {
            sum.used += fraction.used;
            sum.total += fraction.total;
        }
        sum
    }
}

fn run(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    // Test units exercise the surface incidentally; their numbers would
    // only distort the merged table.
    if pass.unit.is_test_unit() {
        return Ok(Arc::new(Coverage::default()));
    }
    let index: &ApiIndex = pass.result_of(&API_INDEX)?;
    let usage: &Usage = pass.result_of(&USAGE)?;

    let mut by_file: BTreeMap<String, Fraction> = BTreeMap::new();
    tally(&mut by_file, &index.types, &usage.types);
    tally(&mut by_file, &index.funcs, &usage.funcs);
    tally(&mut by_file, &index.methods, &usage.methods);
    tally(&mut by_file, &index.fields, &usage.fields);

    Ok(Arc::new(Coverage { by_file }))
}

fn tally(by_file: &mut BTreeMap<String, Fraction>, index: &NamesByFile, used: &BTreeSet<String>) {
    for (filename, names) in index {
        let entry = by_file.entry(filename.clone()).or_default();
        entry.total += names.len();
        entry.used += names.iter().filter(|name| used.contains(*name)).count();
    }
}

/// Renders a merged coverage table.
///
/// Rows are labeled `unit/filename`, sorted by ascending coverage so the
/// least-covered files surface first, with a final `Total` row summed
/// across every unit.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_coverage_table(
    rows: &[(String, &Coverage)],
    out: &mut impl Write,
) -> io::Result<()> {
    let mut lines: Vec<(String, Fraction)> = Vec::new();
    let mut total = Fraction::default();
    for (unit, coverage) in rows {
        for (filename, fraction) in &coverage.by_file {
            lines.push((format!("{unit}/{filename}"), *fraction));
            total.used += fraction.used;
            total.total += fraction.total;
        }
    }
    lines.sort_by(|a, b| {
        a.1.percent()
            .partial_cmp(&b.1.percent())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    for (label, fraction) in &lines {
        writeln!(
            out,
            "{label}: {}/{} ({:.1}%)",
            fraction.used,
            fraction.total,
            fraction.percent()
        )?;
    }
    writeln!(
        out,
        "Total: {}/{} ({:.1}%)",
        total.used,
        total.total,
        total.percent()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_surface_is_fully_covered() {
        assert!((Fraction { used: 0, total: 0 }.percent() - 100.0).abs() < f64::EPSILON);
        assert!((Fraction { used: 1, total: 4 }.percent() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tally_counts_only_matching_names() {
        let mut index = NamesByFile::new();
        index.insert(
            "client.rs".to_string(),
            vec!["Client".to_string(), "Error".to_string()],
        );
        let used: BTreeSet<String> = ["Client".to_string()].into_iter().collect();

        let mut by_file = BTreeMap::new();
        tally(&mut by_file, &index, &used);
        assert_eq!(by_file["client.rs"], Fraction { used: 1, total: 2 });
    }

    #[test]
    fn table_sorts_by_ascending_coverage_with_total() {
        let mut low = Coverage::default();
        low.by_file
            .insert("a.rs".to_string(), Fraction { used: 0, total: 2 });
        let mut high = Coverage::default();
        high.by_file
            .insert("b.rs".to_string(), Fraction { used: 2, total: 2 });

        let rows = vec![
            ("second".to_string(), &high),
            ("first".to_string(), &low),
        ];
        let mut out = Vec::new();
        render_coverage_table(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "first/a.rs: 0/2 (0.0%)",
                "second/b.rs: 2/2 (100.0%)",
                "Total: 2/4 (50.0%)",
            ]
        );
    }
}
