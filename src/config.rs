//! Configuration management for evilurl
//!
//! Configuration is read from `./config/evilurl.toml` (or `--config <path>`).
//! When the default file is absent the embedded template is used, so the tool
//! works out of the box; `--init` writes that template to disk for editing.

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/evilurl.toml";

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = include_str!("../config/evilurl.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid address in '{field}': {address} (expected ip:port format)")]
    InvalidAddress { field: String, address: String },

    #[error("Configuration field '{field}' must be greater than zero")]
    ZeroValue { field: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub confusables: ConfusablesConfig,
    pub dns: DnsConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfusablesConfig {
    /// Path to a JSON confusable table; empty selects the built-in table
    #[serde(default)]
    pub path: String,
}

impl ConfusablesConfig {
    pub fn table_path(&self) -> Option<&Path> {
        if self.path.trim().is_empty() {
            None
        } else {
            Some(Path::new(&self.path))
        }
    }
}

/// DNS registration lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DnsConfig {
    pub lookup_timeout_secs: u64,
    pub parallel_lookups: usize,
    #[serde(default)]
    pub rate_limit_qps: u32,
    #[serde(default)]
    pub servers: Vec<DnsServerConfig>,
}

/// Traditional DNS server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DnsServerConfig {
    pub name: String,
    pub address: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    /// Candidate cap per domain (0 = unbounded)
    #[serde(default)]
    pub max_candidates: u64,
}

impl AnalysisConfig {
    pub fn candidate_limit(&self) -> Option<u64> {
        if self.max_candidates == 0 {
            None
        } else {
            Some(self.max_candidates)
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path, falling back to the embedded
    /// template when no file exists there
    pub fn load() -> Result<Self, ConfigError> {
        match Self::load_from_path(Path::new(CONFIG_PATH)) {
            Err(ConfigError::FileNotFound(_)) => Self::embedded(),
            other => other,
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dns.lookup_timeout_secs == 0 {
            return Err(ConfigError::ZeroValue {
                field: "dns.lookup_timeout_secs".to_string(),
            });
        }
        if self.dns.parallel_lookups == 0 {
            return Err(ConfigError::ZeroValue {
                field: "dns.parallel_lookups".to_string(),
            });
        }

        for (i, server) in self.dns.servers.iter().enumerate() {
            if server.name.trim().is_empty() {
                return Err(ConfigError::EmptyRequired {
                    field: format!("dns.servers[{}].name", i),
                });
            }
            if server.address.parse::<SocketAddr>().is_err() {
                return Err(ConfigError::InvalidAddress {
                    field: format!("dns.servers[{}].address", i),
                    address: server.address.clone(),
                });
            }
            if server.timeout_secs == 0 {
                return Err(ConfigError::ZeroValue {
                    field: format!("dns.servers[{}].timeout_secs", i),
                });
            }
        }

        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: Result<AppConfig, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok(), "Default config should parse: {:?}", config.err());
    }

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::embedded().expect("Default config should validate");
        assert!(config.confusables.table_path().is_none());
        assert_eq!(config.analysis.candidate_limit(), None);
        assert_eq!(config.dns.servers.len(), 2);
    }

    #[test]
    fn test_optional_sections_default() {
        let config_str = r#"
[dns]
lookup_timeout_secs = 5
parallel_lookups = 4
"#;

        let config = AppConfig::from_toml(config_str).expect("Config should parse without optional sections");
        assert!(config.dns.servers.is_empty(), "servers should default to empty (system resolver)");
        assert_eq!(config.dns.rate_limit_qps, 0);
        assert_eq!(config.analysis.max_candidates, 0);
        assert!(config.confusables.table_path().is_none());
    }

    #[test]
    fn test_candidate_limit() {
        let config_str = r#"
[confusables]
path = "/etc/evilurl/table.json"

[dns]
lookup_timeout_secs = 5
parallel_lookups = 4

[analysis]
max_candidates = 5000
"#;

        let config = AppConfig::from_toml(config_str).unwrap();
        assert_eq!(config.analysis.candidate_limit(), Some(5000));
        assert_eq!(config.confusables.table_path(), Some(Path::new("/etc/evilurl/table.json")));
    }

    #[test]
    fn test_invalid_server_address() {
        let config_str = r#"
[dns]
lookup_timeout_secs = 5
parallel_lookups = 4

[[dns.servers]]
name = "Broken"
address = "1.1.1.1"
timeout_secs = 2
"#;

        assert!(matches!(
            AppConfig::from_toml(config_str),
            Err(ConfigError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_zero_parallel_lookups_rejected() {
        let config_str = r#"
[dns]
lookup_timeout_secs = 5
parallel_lookups = 0
"#;

        assert!(matches!(
            AppConfig::from_toml(config_str),
            Err(ConfigError::ZeroValue { .. })
        ));
    }
}
