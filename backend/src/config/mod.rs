//! Server configuration.
//!
//! Values come from a TOML file named by `GEOLAYERS_CONFIG`; every field has a
//! default so the server also starts with no file at all.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "GEOLAYERS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite file holding collections, features and groups.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// SQLite file backing the layer cache.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Maximum accepted JSON body, in megabytes.
    #[serde(default = "default_json_limit_mb")]
    pub json_limit_mb: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_store_path() -> PathBuf {
    PathBuf::from("geolayers.sqlite")
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("geolayers_cache.sqlite")
}

fn default_json_limit_mb() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store_path: default_store_path(),
            cache_path: default_cache_path(),
            json_limit_mb: default_json_limit_mb(),
        }
    }
}

impl ServerConfig {
    /// Loads the file named by `GEOLAYERS_CONFIG`, or the defaults when unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// JSON body limit in bytes.
    pub fn json_limit_bytes(&self) -> usize {
        self.json_limit_mb * 1024 * 1024
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(ServerConfig::from_toml("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn partial_file_overrides_given_fields() {
        let config = ServerConfig::from_toml(
            r#"
            port = 8088
            store_path = "/var/lib/geolayers/store.sqlite"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8088);
        assert_eq!(config.store_path, PathBuf::from("/var/lib/geolayers/store.sqlite"));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.json_limit_bytes(), 64 * 1024 * 1024);
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = \"0.0.0.0\"").unwrap();
        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.socket_addr(), "0.0.0.0:3001");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ServerConfig::from_file(Path::new("/nonexistent/geolayers.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(ServerConfig::from_toml("port = \"eighty\"").is_err());
    }
}
