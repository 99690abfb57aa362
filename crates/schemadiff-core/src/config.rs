//! Configuration schema (schemadiff.toml)

use crate::error::Result;
use crate::ignore::IgnoreFilter;
use serde::{Deserialize, Serialize};

/// Ignore rules applied before comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// `[kind:]wildcard` patterns, e.g. `table:temp_*`
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Fingerprint settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Hash table and column comments too
    #[serde(default)]
    pub include_comments: bool,

    /// Hash tables (and their children) only
    #[serde(default)]
    pub tables_only: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub fingerprint: FingerprintConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> std::result::Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> std::result::Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> std::result::Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Compile the configured patterns plus any extra ones
    pub fn ignore_filter<S: AsRef<str>>(&self, extra: &[S]) -> Result<IgnoreFilter> {
        IgnoreFilter::compile(
            self.ignore
                .patterns
                .iter()
                .map(String::as_str)
                .chain(extra.iter().map(AsRef::as_ref)),
        )
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ObjectKind;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.ignore.patterns.is_empty());
        assert!(!config.fingerprint.include_comments);
        assert!(!config.fingerprint.tables_only);
    }

    #[test]
    fn parse_full_config() {
        let config = Config::from_toml(
            r#"
            [ignore]
            patterns = ["table:temp_*", "*_audit"]

            [fingerprint]
            include_comments = true
            "#,
        )
        .unwrap();

        assert_eq!(config.ignore.patterns.len(), 2);
        assert!(config.fingerprint.include_comments);
        assert!(!config.fingerprint.tables_only);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn ignore_filter_merges_extra_patterns() {
        let config = Config::from_toml("[ignore]\npatterns = [\"table:temp_*\"]").unwrap();
        let filter = config.ignore_filter(&["view:old_*"]).unwrap();

        assert_eq!(filter.len(), 2);
        assert!(filter.should_ignore(ObjectKind::Table, "temp_x"));
        assert!(filter.should_ignore(ObjectKind::View, "old_report"));
    }

    #[test]
    fn ignore_filter_rejects_bad_pattern() {
        let config = Config::from_toml("[ignore]\npatterns = [\"bogus:x\"]").unwrap();
        assert!(config.ignore_filter::<&str>(&[]).is_err());
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut config = Config::default();
        config.ignore.patterns.push("index:sys_*".to_string());
        config.fingerprint.tables_only = true;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemadiff.toml");
        config.save_to_file(&path).unwrap();

        let parsed = Config::from_file(&path).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        assert!(matches!(
            Config::from_toml("[ignore\npatterns = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
