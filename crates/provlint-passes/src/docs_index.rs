//! Documentation page index.
//!
//! Walks the documentation directory of the corpus and indexes every page
//! under its `resources` and `data-sources` subdirectories. Other analyzers
//! consume the index instead of touching the filesystem themselves.
//!
//! A missing documentation directory (or a missing subdirectory) yields an
//! empty index rather than an error; an unreadable file aborts the pass.

use provlint_core::{Analyzer, Pass, PassResult, RunError};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

/// Subdirectory holding resource pages.
const RESOURCES_DIR: &str = "resources";

/// Subdirectory holding data source pages.
const DATA_SOURCES_DIR: &str = "data-sources";

/// Indexes documentation pages for the resource and data source checks.
pub static DOCS_INDEX: Analyzer = Analyzer {
    name: "docsindex",
    doc: "indexes documentation pages under the docs directory",
    requires: &[],
    fact_kinds: &[],
    run,
};

/// One documentation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPage {
    /// Base filename of the page, e.g. `project.md`.
    pub filename: String,
    /// Full page content.
    pub content: String,
}

/// All indexed documentation pages, split by entity category.
#[derive(Debug, Clone, Default)]
pub struct DocsIndex {
    /// Pages under `resources/`, sorted by filename.
    pub resources: Vec<DocPage>,
    /// Pages under `data-sources/`, sorted by filename.
    pub data_sources: Vec<DocPage>,
}

impl DocsIndex {
    /// Returns true if a resource page with the given filename exists.
    #[must_use]
    pub fn has_resource_page(&self, filename: &str) -> bool {
        self.resources.iter().any(|p| p.filename == filename)
    }

    /// Returns true if a data source page with the given filename exists.
    #[must_use]
    pub fn has_data_source_page(&self, filename: &str) -> bool {
        self.data_sources.iter().any(|p| p.filename == filename)
    }
}

fn run(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let Some(root) = pass.corpus.docs_root() else {
        debug!("no docs root configured, docs index is empty");
        return Ok(Arc::new(DocsIndex::default()));
    };

    let index = DocsIndex {
        resources: read_pages(&root.join(RESOURCES_DIR))?,
        data_sources: read_pages(&root.join(DATA_SOURCES_DIR))?,
    };
    debug!(
        resources = index.resources.len(),
        data_sources = index.data_sources.len(),
        "indexed documentation pages"
    );
    Ok(Arc::new(index))
}

fn read_pages(dir: &Path) -> Result<Vec<DocPage>, RunError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut pages = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(|e| RunError::message(e.to_string()))?;
        if !entry.file_type().is_file()
            || entry.path().extension() != Some(std::ffi::OsStr::new("md"))
        {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();
        let content = std::fs::read_to_string(entry.path())?;
        pages.push(DocPage { filename, content });
    }
    pages.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_yields_no_pages() {
        let dir = tempfile::tempdir().unwrap();
        let pages = read_pages(&dir.path().join("resources")).unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn pages_are_sorted_and_non_markdown_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("resources");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("zebra.md"), "z").unwrap();
        std::fs::write(root.join("alpha.md"), "a").unwrap();
        std::fs::write(root.join("notes.txt"), "skip me").unwrap();

        let pages = read_pages(&root).unwrap();
        let names: Vec<&str> = pages.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(names, vec!["alpha.md", "zebra.md"]);
        assert_eq!(pages[0].content, "a");
    }

    #[test]
    fn lookup_by_filename() {
        let index = DocsIndex {
            resources: vec![DocPage {
                filename: "project.md".to_string(),
                content: String::new(),
            }],
            data_sources: Vec::new(),
        };
        assert!(index.has_resource_page("project.md"));
        assert!(!index.has_resource_page("group.md"));
        assert!(!index.has_data_source_page("project.md"));
    }
}
