//! Corpus loading from a directory tree.
//!
//! Every immediate subdirectory of the root that contains at least one
//! `.rs` file becomes a unit named after the directory. Imports between
//! units are derived from `use` declarations by the corpus builder, so
//! the loader only gathers sources.

use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use provlint_core::{CheckConfig, Corpus, UnitSource};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Builds a corpus from the units found under `root`.
pub fn load_corpus(root: &Path, check: CheckConfig) -> Result<Corpus> {
    let mut builder = Corpus::builder();
    if let Some(docs) = find_docs_dir(root, &check.docs_dir) {
        debug!("using docs directory {}", docs.display());
        builder = builder.docs_root(docs);
    }
    builder = builder.check(check);

    let mut found = 0usize;
    let mut entries: Vec<PathBuf> = std::fs::read_dir(root)
        .with_context(|| format!("Failed to read {}", root.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    entries.sort();

    for dir in entries {
        let Some(unit) = load_unit(&dir)? else {
            continue;
        };
        builder = builder.unit(unit);
        found += 1;
    }
    if found == 0 {
        bail!("no units found under {}", root.display());
    }

    builder
        .build()
        .with_context(|| format!("Failed to build corpus from {}", root.display()))
}

/// Reads the `.rs` files of one candidate unit directory, honoring
/// ignore files. Returns `None` if the directory holds no Rust sources.
fn load_unit(dir: &Path) -> Result<Option<UnitSource>> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut sources: Vec<(PathBuf, String)> = Vec::new();
    for entry in WalkBuilder::new(dir).build() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() || path.extension() != Some(std::ffi::OsStr::new("rs")) {
            continue;
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        sources.push((path.to_path_buf(), content));
    }
    if sources.is_empty() {
        return Ok(None);
    }
    sources.sort_by(|a, b| a.0.cmp(&b.0));

    debug!(unit = %name, files = sources.len(), "loaded unit");
    let mut unit = UnitSource::new(name);
    for (path, content) in sources {
        unit = unit.file(path, content);
    }
    Ok(Some(unit))
}

/// Finds the documentation directory: `<root>/<docs_dir>` or the same
/// name in any ancestor of the root.
fn find_docs_dir(root: &Path, docs_dir: &str) -> Option<PathBuf> {
    let mut current = Some(root);
    while let Some(dir) = current {
        let candidate = dir.join(docs_dir);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
