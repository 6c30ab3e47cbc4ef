//! Configuration types for Tessera
//!
//! The persisted client configuration has a fixed schema: a `servers`
//! section with ordered `data` and `metadata` host lists, and a `storage`
//! section naming the backend plugin and its path.

use crate::error::{Error, Result};
use crate::types::StorageBackend;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration for a Tessera client
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Server lists
    pub servers: ServersConfig,
    /// Storage backend configuration
    pub storage: StorageConfig,
}

/// Data and metadata server lists, in connection order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServersConfig {
    pub data: Vec<String>,
    pub metadata: Vec<String>,
}

/// Storage backend selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend plugin
    pub backend: StorageBackend,
    /// Backend path (directory for `posix`/`gio`, ignored for `null`)
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: PathBuf::from("/var/lib/tessera"),
        }
    }
}

impl Config {
    /// Build a configuration from comma-separated host lists
    pub fn from_lists(
        data: &str,
        metadata: &str,
        backend: StorageBackend,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            servers: ServersConfig {
                data: split_list(data),
                metadata: split_list(metadata),
            },
            storage: StorageConfig {
                backend,
                path: path.into(),
            },
        }
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Configuration(e.to_string()))
    }

    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Write the configuration file, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Check that at least one data and one metadata server are listed
    pub fn validate(&self) -> Result<()> {
        if self.servers.data.is_empty() {
            return Err(Error::Configuration("no data servers configured".into()));
        }
        if self.servers.metadata.is_empty() {
            return Err(Error::Configuration(
                "no metadata servers configured".into(),
            ));
        }
        Ok(())
    }
}

/// Split a comma-separated list, trimming whitespace around each entry.
/// Empty entries are dropped.
#[must_use]
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_split_list_trims() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("single"), vec!["single"]);
        assert!(split_list("").is_empty());
        assert_eq!(split_list("a,,b, "), vec!["a", "b"]);
    }

    #[test]
    fn test_toml_schema() {
        let config = Config::from_lists("d1,d2", "m1", StorageBackend::Gio, "/srv/tessera");
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[servers]"));
        assert!(text.contains("[storage]"));
        assert!(text.contains("backend = \"gio\""));

        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_unknown_backend() {
        let text = r#"
            [servers]
            data = ["d1"]
            metadata = ["m1"]

            [storage]
            backend = "mongodb"
            path = "/tmp"
        "#;
        assert!(matches!(
            Config::from_toml_str(text),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_empty_metadata() {
        let mut config = Config::from_lists("d1", "m1", StorageBackend::Null, "/tmp");
        config.servers.metadata.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/tessera/tessera.toml");
        let config = Config::from_lists("d1", "m1,m2", StorageBackend::Posix, "/data");
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
