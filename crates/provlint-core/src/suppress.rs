//! Inline suppression directives.
//!
//! A comment of the form `//lintignore:doccoverage` (one or more
//! comma-separated analyzer names) attaches to the suppressible
//! construct starting on the same line or the line below. Diagnostics
//! positioned anywhere under that construct and produced by a named
//! analyzer are dropped before being surfaced; directives for other
//! names have no effect.
//!
//! The lookup index is built once per unit, never re-walked per
//! diagnostic.

use crate::diagnostics::Diagnostic;
use crate::unit::Unit;

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use syn::spanned::Spanned;
use syn::visit::Visit;

/// Marker of a `lintignore` directive.
const DIRECTIVE: &str = "lintignore:";

/// Per-unit suppression index: directive lines and suppressible
/// construct spans for each file.
#[derive(Debug, Default)]
pub struct SuppressionIndex {
    files: HashMap<PathBuf, FileIndex>,
}

#[derive(Debug, Default)]
struct FileIndex {
    /// Directive line -> analyzer names it suppresses.
    directives: BTreeMap<usize, Vec<String>>,
    /// Suppressible construct spans (start line, end line), sorted by
    /// start line.
    constructs: Vec<(usize, usize)>,
}

impl SuppressionIndex {
    /// Builds the index for one unit.
    #[must_use]
    pub fn build(unit: &Unit) -> Self {
        let mut files = HashMap::new();
        for file in &unit.files {
            let mut index = FileIndex::default();
            for (i, line) in file.content.lines().enumerate() {
                if let Some(names) = parse_directive(line) {
                    index.directives.insert(i + 1, names);
                }
            }
            // Construct spans are only needed when a directive exists,
            // which also keeps directive-free files unparsed here.
            if !index.directives.is_empty() {
                if let Ok(ast) = file.parse() {
                    let mut collector = ConstructCollector::default();
                    collector.visit_file(&ast);
                    collector.spans.sort_unstable();
                    index.constructs = collector.spans;
                }
            }
            files.insert(file.path.clone(), index);
        }
        Self { files }
    }

    /// Returns true if the diagnostic falls under a construct carrying a
    /// directive naming its producing analyzer.
    #[must_use]
    pub fn is_suppressed(&self, diagnostic: &Diagnostic) -> bool {
        let Some(index) = self.files.get(&diagnostic.location.file) else {
            return false;
        };
        index.is_suppressed(diagnostic.location.line, diagnostic.analyzer)
    }

    /// Filters a batch of diagnostics, dropping suppressed entries.
    #[must_use]
    pub fn filter(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        diagnostics
            .into_iter()
            .filter(|d| !self.is_suppressed(d))
            .collect()
    }
}

impl FileIndex {
    fn is_suppressed(&self, line: usize, analyzer: &str) -> bool {
        // Attachment point: the nearest enclosing construct's first
        // line, or the diagnostic's own line for positions outside any
        // indexed construct.
        let attach = self.enclosing_start(line).unwrap_or(line);
        self.directive_covers(attach, analyzer)
    }

    /// Start line of the smallest indexed construct containing `line`.
    fn enclosing_start(&self, line: usize) -> Option<usize> {
        // Candidates all start at or before `line`; the index is sorted
        // by start, so cut the tail off first.
        let cut = self.constructs.partition_point(|&(start, _)| start <= line);
        self.constructs[..cut]
            .iter()
            .filter(|&&(_, end)| end >= line)
            .min_by_key(|&&(start, end)| end - start)
            .map(|&(start, _)| start)
    }

    /// A directive on the attachment line or the line just above it.
    fn directive_covers(&self, attach: usize, analyzer: &str) -> bool {
        [attach.saturating_sub(1), attach]
            .iter()
            .filter_map(|l| self.directives.get(l))
            .any(|names| names.iter().any(|n| n == analyzer))
    }
}

/// Parses a `lintignore` directive out of a source line, if any.
fn parse_directive(line: &str) -> Option<Vec<String>> {
    let comment_at = line.find("//")?;
    let comment = line[comment_at + 2..].trim_start();
    let rest = comment.strip_prefix(DIRECTIVE)?;
    let names: Vec<String> = rest
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// Collects spans of suppressible constructs: items and the entry
/// expressions of array literals (registry entries).
#[derive(Default)]
struct ConstructCollector {
    spans: Vec<(usize, usize)>,
}

impl ConstructCollector {
    fn push_span(&mut self, span: proc_macro2::Span) {
        self.spans.push((span.start().line, span.end().line));
    }
}

impl<'ast> Visit<'ast> for ConstructCollector {
    fn visit_item(&mut self, item: &'ast syn::Item) {
        self.push_span(item.span());
        syn::visit::visit_item(self, item);
    }

    fn visit_expr_array(&mut self, array: &'ast syn::ExprArray) {
        for elem in &array.elems {
            self.push_span(elem.span());
        }
        syn::visit::visit_expr_array(self, array);
    }

    fn visit_field_value(&mut self, field: &'ast syn::FieldValue) {
        self.push_span(field.span());
        syn::visit::visit_field_value(self, field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Location;
    use crate::unit::{Corpus, UnitSource};

    fn diag(file: &str, line: usize, analyzer: &'static str) -> Diagnostic {
        Diagnostic::new(Location::new(file, line, 1), "issue", analyzer)
    }

    fn index_for(src: &str) -> SuppressionIndex {
        let corpus = Corpus::builder()
            .unit(UnitSource::new("u").file("lib.rs", src))
            .build()
            .expect("valid source");
        SuppressionIndex::build(corpus.unit_by_name("u").expect("present"))
    }

    #[test]
    fn parse_directive_forms() {
        assert_eq!(
            parse_directive("//lintignore:doccoverage"),
            Some(vec!["doccoverage".to_string()])
        );
        assert_eq!(
            parse_directive("    // lintignore:a, b"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            parse_directive("let x = 1; //lintignore:usage"),
            Some(vec!["usage".to_string()])
        );
        assert!(parse_directive("// just a comment").is_none());
        assert!(parse_directive("//lintignore:").is_none());
    }

    #[test]
    fn directive_above_item_suppresses_inside_it() {
        let index = index_for(
            "//lintignore:doccoverage\npub fn registry() {\n    let x = 1;\n}\n",
        );
        assert!(index.is_suppressed(&diag("lib.rs", 3, "doccoverage")));
    }

    #[test]
    fn other_analyzer_names_are_unaffected() {
        let index = index_for("//lintignore:doccoverage\npub fn registry() {}\n");
        assert!(index.is_suppressed(&diag("lib.rs", 2, "doccoverage")));
        assert!(!index.is_suppressed(&diag("lib.rs", 2, "usage")));
    }

    #[test]
    fn name_match_is_exact() {
        let index = index_for("//lintignore:doc\npub fn registry() {}\n");
        assert!(!index.is_suppressed(&diag("lib.rs", 2, "doccoverage")));
    }

    #[test]
    fn nearest_enclosing_construct_wins() {
        // The directive sits on the inner function, not the module, so
        // diagnostics elsewhere in the module survive.
        let src = "pub mod m {\n    //lintignore:x\n    pub fn inner() {}\n    pub fn other() {}\n}\n";
        let index = index_for(src);
        assert!(index.is_suppressed(&diag("lib.rs", 3, "x")));
        assert!(!index.is_suppressed(&diag("lib.rs", 4, "x")));
    }

    #[test]
    fn array_entries_are_suppressible() {
        let src = r#"pub static NAMES: &[(&str, u32)] = &[
    ("keep", 1),
    //lintignore:doccoverage
    ("skip", 2),
];
"#;
        let index = index_for(src);
        assert!(index.is_suppressed(&diag("lib.rs", 4, "doccoverage")));
        assert!(!index.is_suppressed(&diag("lib.rs", 2, "doccoverage")));
    }

    #[test]
    fn no_directive_no_suppression() {
        let index = index_for("pub fn registry() {}\n");
        assert!(!index.is_suppressed(&diag("lib.rs", 1, "doccoverage")));
    }
}
