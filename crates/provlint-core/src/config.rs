//! Configuration for the reference checks.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level configuration, loaded from `provlint.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Check-specific settings.
    #[serde(default)]
    pub check: CheckConfig,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Settings consumed by the built-in analyzers.
///
/// The documentation filename convention (strip a prefix from the entity
/// name, append a suffix, compare against indexed page filenames) is
/// injectable rather than hardcoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Prefix stripped from an entity name when deriving its page name.
    #[serde(default = "default_strip_prefix")]
    pub doc_page_strip_prefix: String,

    /// Suffix appended to the stripped entity name.
    #[serde(default = "default_page_suffix")]
    pub doc_page_suffix: String,

    /// Name of the designated library unit whose exported surface is
    /// indexed for the API usage checks.
    #[serde(default = "default_library_unit")]
    pub library_unit: String,

    /// Leading path segment under which consumers reference the library
    /// (e.g. `gitlab` in `gitlab::Client`).
    #[serde(default = "default_library_ident")]
    pub library_ident: String,

    /// Directory name holding documentation pages.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            doc_page_strip_prefix: default_strip_prefix(),
            doc_page_suffix: default_page_suffix(),
            library_unit: default_library_unit(),
            library_ident: default_library_ident(),
            docs_dir: default_docs_dir(),
        }
    }
}

impl CheckConfig {
    /// Derives the expected documentation page filename for an entity.
    #[must_use]
    pub fn expected_page(&self, entity: &str) -> String {
        let stem = entity
            .strip_prefix(&self.doc_page_strip_prefix)
            .unwrap_or(entity);
        format!("{stem}{}", self.doc_page_suffix)
    }
}

fn default_strip_prefix() -> String {
    "gitlab_".to_string()
}

fn default_page_suffix() -> String {
    ".md".to_string()
}

fn default_library_unit() -> String {
    "gitlab".to_string()
}

fn default_library_ident() -> String {
    "gitlab".to_string()
}

fn default_docs_dir() -> String {
    "docs".to_string()
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_scheme() {
        let config = CheckConfig::default();
        assert_eq!(config.expected_page("gitlab_project"), "project.md");
        assert_eq!(config.expected_page("unprefixed"), "unprefixed.md");
    }

    #[test]
    fn parse_overrides() {
        let toml = r#"
[check]
doc_page_strip_prefix = "aws_"
doc_page_suffix = ".markdown"
library_unit = "aws-sdk"
"#;
        let config = Config::parse(toml).expect("valid toml");
        assert_eq!(config.check.expected_page("aws_instance"), "instance.markdown");
        assert_eq!(config.check.library_unit, "aws-sdk");
        assert_eq!(config.check.docs_dir, "docs");
    }

    #[test]
    fn empty_config_is_valid() {
        let config = Config::parse("").expect("empty toml");
        assert_eq!(config.check.doc_page_suffix, ".md");
    }
}
