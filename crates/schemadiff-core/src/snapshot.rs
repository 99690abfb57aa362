//! Loading and saving schema snapshots
//!
//! Snapshots are serialized [`Schema`] values. The format is chosen from the
//! file extension: `.json`, `.yaml`/`.yml` or `.toml`.

use crate::schema::Schema;
use std::path::Path;

/// Snapshot load/save errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported snapshot format '{0}' (expected .json, .yaml, .yml or .toml)")]
    UnsupportedFormat(String),

    #[error("failed to decode snapshot: {0}")]
    Decode(String),

    #[error("failed to encode snapshot: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(LoadError::UnsupportedFormat(ext)),
        }
    }
}

/// Load a snapshot from a `.json`, `.yaml`/`.yml` or `.toml` file
pub fn load_schema(path: &Path) -> Result<Schema, LoadError> {
    let format = Format::from_path(path)?;

    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    match format {
        Format::Json => schema_from_json(&contents),
        Format::Yaml => serde_yaml::from_str(&contents).map_err(|e| LoadError::Decode(e.to_string())),
        Format::Toml => toml::from_str(&contents).map_err(|e| LoadError::Decode(e.to_string())),
    }
}

/// Decode a snapshot from JSON text
pub fn schema_from_json(json: &str) -> Result<Schema, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::Decode(e.to_string()))
}

/// Write a snapshot as pretty JSON, YAML or TOML, by extension
pub fn save_schema(schema: &Schema, path: &Path) -> Result<(), LoadError> {
    let contents = match Format::from_path(path)? {
        Format::Json => {
            serde_json::to_string_pretty(schema).map_err(|e| LoadError::Encode(e.to_string()))?
        }
        Format::Yaml => serde_yaml::to_string(schema).map_err(|e| LoadError::Encode(e.to_string()))?,
        Format::Toml => toml::to_string_pretty(schema).map_err(|e| LoadError::Encode(e.to_string()))?,
    };

    std::fs::write(path, contents).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}
