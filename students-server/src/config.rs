//! Service configuration
//!
//! Loaded once from a YAML file at startup and handed to the components that
//! need it. Nothing below this module reads environment variables or CLI flags.
//!
//! ```yaml
//! env: "dev"
//! storage_path: "storage/storage.db"
//! http_server:
//!   addr: "localhost:8082"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default grace window for draining in-flight requests on shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Deployment environment name (e.g. "dev", "production")
    pub env: String,
    /// SQLite database file
    pub storage_path: PathBuf,
    pub http_server: HttpServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Listen address, `host:port`. Hostnames are resolved at bind time.
    pub addr: String,

    /// Seconds to wait for in-flight requests after a shutdown signal
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Allow any CORS origin (default: false = localhost only)
    #[serde(default)]
    pub cors_permissive: bool,
}

fn default_shutdown_timeout_secs() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_SECS
}

impl HttpServerConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            cors_permissive: false,
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Configuration loading errors. All of these are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {path:?}")]
    NotFound { path: PathBuf },

    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing required config value '{field}'")]
    Missing { field: &'static str },
}

impl Config {
    /// Read and validate the YAML config at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate config from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the environment name (used for the `ENV` override).
    pub fn with_env(mut self, env: impl Into<String>) -> Result<Self, ConfigError> {
        self.env = env.into();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.env.trim().is_empty() {
            return Err(ConfigError::Missing { field: "env" });
        }
        if self.storage_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing {
                field: "storage_path",
            });
        }
        if self.http_server.addr.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "http_server.addr",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
env: "dev"
storage_path: "storage/storage.db"
http_server:
  addr: "localhost:8082"
"#;

    #[test]
    fn parses_sample_with_defaults() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.env, "dev");
        assert_eq!(config.storage_path, PathBuf::from("storage/storage.db"));
        assert_eq!(config.http_server.addr, "localhost:8082");
        assert_eq!(config.http_server.shutdown_timeout(), Duration::from_secs(5));
        assert!(!config.http_server.cors_permissive);
    }

    #[test]
    fn explicit_shutdown_timeout() {
        let yaml = r#"
env: prod
storage_path: /var/lib/students.db
http_server:
  addr: "0.0.0.0:80"
  shutdown_timeout_secs: 12
  cors_permissive: true
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.http_server.shutdown_timeout_secs, 12);
        assert!(config.http_server.cors_permissive);
    }

    #[test]
    fn missing_section_is_parse_error() {
        let err = Config::from_yaml("env: dev\nstorage_path: a.db\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn blank_env_is_missing() {
        let yaml = "env: \"\"\nstorage_path: a.db\nhttp_server:\n  addr: \"127.0.0.1:1\"\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "env" }));
    }

    #[test]
    fn env_override_replaces_value() {
        let config = Config::from_yaml(SAMPLE).unwrap().with_env("staging").unwrap();
        assert_eq!(config.env, "staging");
        assert!(Config::from_yaml(SAMPLE).unwrap().with_env("  ").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.http_server.addr, "localhost:8082");
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"env: [unterminated").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
