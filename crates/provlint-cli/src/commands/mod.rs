//! CLI subcommand implementations.

pub mod check;
pub mod coverage;
pub mod list_analyzers;
pub mod unused;

use anyhow::{Context, Result};
use provlint_core::{CheckConfig, Config};
use std::path::Path;

/// Resolves the check configuration: an explicit `--config` path, a
/// `provlint.toml` next to the analyzed tree, or the defaults.
pub fn resolve_check_config(root: &Path, config: Option<&Path>) -> Result<CheckConfig> {
    if let Some(path) = config {
        let config = Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        return Ok(config.check);
    }
    let local = root.join("provlint.toml");
    if local.is_file() {
        tracing::debug!("using config {}", local.display());
        let config = Config::from_file(&local)
            .with_context(|| format!("Failed to load config: {}", local.display()))?;
        return Ok(config.check);
    }
    Ok(CheckConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_file_present() {
        let dir = tempfile::tempdir().unwrap();
        let check = resolve_check_config(dir.path(), None).unwrap();
        assert_eq!(check.library_unit, "gitlab");
    }

    #[test]
    fn local_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("provlint.toml"),
            "[check]\nlibrary_unit = \"sdk\"\n",
        )
        .unwrap();
        let check = resolve_check_config(dir.path(), None).unwrap();
        assert_eq!(check.library_unit, "sdk");
    }
}
