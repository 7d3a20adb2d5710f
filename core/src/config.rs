//! Client configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3020";
pub const DEFAULT_CATALOG_URL: &str = "https://rickandmortyapi.com/api/character";

pub const ENV_API_URL: &str = "PERSONAJES_API_URL";
pub const ENV_CATALOG_URL: &str = "PERSONAJES_CATALOG_URL";
pub const ENV_STORAGE_DIR: &str = "PERSONAJES_STORAGE_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    /// Upper bound on catalog pages fetched per session.
    #[serde(default = "default_catalog_max_pages")]
    pub catalog_max_pages: usize,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Directory for `FileStorage`; `None` keeps state in memory.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            catalog_url: default_catalog_url(),
            catalog_max_pages: default_catalog_max_pages(),
            timeout_secs: None,
            storage_dir: None,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_catalog_max_pages() -> usize {
    1
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Apply `PERSONAJES_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_CATALOG_URL) {
            self.catalog_url = url;
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_secs.map(std::time::Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_base_url, "http://localhost:3020");
        assert_eq!(config.catalog_max_pages, 1);
        assert!(config.timeout().is_none());
    }

    #[test]
    fn toml_overrides_fields() {
        let config = ClientConfig::from_toml_str(
            r#"
            api_base_url = "https://api.example.com"
            catalog_max_pages = 3
            timeout_secs = 10
            storage_dir = "/tmp/personajes"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.catalog_max_pages, 3);
        assert_eq!(config.timeout(), Some(std::time::Duration::from_secs(10)));
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/personajes")));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = ClientConfig::from_toml_str("catalog_max_pages = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ClientConfig::load("/nonexistent/personajes.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn overrides_replace_configured_values() {
        let config = ClientConfig::default().with_overrides(|key| match key {
            ENV_API_URL => Some("http://10.0.0.2:3020".to_string()),
            ENV_STORAGE_DIR => Some("/var/lib/personajes".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://10.0.0.2:3020");
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.storage_dir, Some(PathBuf::from("/var/lib/personajes")));
    }
}
