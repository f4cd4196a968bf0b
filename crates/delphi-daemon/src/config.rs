//! Configuration file management.

use std::path::{Path, PathBuf};

use delphi_oracle::OracleParams;
use delphi_types::AccountName;
use serde::{Deserialize, Serialize};

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Oracle tunables and the static validator list.
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// RPC settings.
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Accounts allowed to push signed actions.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Oracle configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(flatten)]
    pub params: OracleParams,
    /// Active validators; at most 21 are used.
    #[serde(default)]
    pub validators: Vec<AccountName>,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory. Empty = platform default.
    #[serde(default)]
    pub data_dir: String,
}

/// RPC configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Socket file name inside the data directory.
    #[serde(default = "default_socket_name")]
    pub socket_name: String,
    /// Furthest into the future a pushed action may expire.
    #[serde(default = "default_action_ttl")]
    pub action_ttl_secs: u64,
}

/// One registered account key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub name: AccountName,
    /// Hex-encoded Ed25519 verifying key.
    pub public_key: String,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_socket_name() -> String {
    "delphi.sock".to_string()
}

fn default_action_ttl() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            socket_name: default_socket_name(),
            action_ttl_secs: default_action_ttl(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: DaemonConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> PathBuf {
        if self.storage.data_dir.is_empty() {
            Self::default_data_dir()
        } else {
            PathBuf::from(&self.storage.data_dir)
        }
    }

    /// Get the config file path.
    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("DELPHI_CONFIG") {
            return PathBuf::from(path);
        }
        Self::default_data_dir().join("config.toml")
    }

    /// Platform-specific default data directory.
    fn default_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("DELPHI_DATA_DIR") {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/Delphi")
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs_fallback(".delphi")
        }
    }
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/delphi"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.oracle.params, OracleParams::default());
        assert!(config.oracle.validators.is_empty());
        assert_eq!(config.rpc.socket_name, "delphi.sock");
        assert_eq!(config.rpc.action_ttl_secs, 300);
        assert_eq!(config.advanced.log_level, "info");
        assert!(config.accounts.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = DaemonConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let parsed: DaemonConfig = toml::from_str(&toml_str).expect("parse");
        assert_eq!(parsed.oracle.params, config.oracle.params);
    }

    #[test]
    fn test_partial_config() {
        let config: DaemonConfig = toml::from_str(
            r#"
            [oracle]
            min_interval_secs = 30
            controller = "admin"
            validators = ["producer1", "producer2"]

            [storage]
            data_dir = "/var/lib/delphi"

            [[accounts]]
            name = "feeder"
            public_key = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
            "#,
        )
        .expect("parse");
        assert_eq!(config.oracle.params.min_interval_secs, 30);
        assert_eq!(config.oracle.params.capacity, 21);
        assert_eq!(config.oracle.params.controller.to_string(), "admin");
        assert_eq!(config.oracle.validators.len(), 2);
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/delphi"));
        assert_eq!(config.accounts[0].name.to_string(), "feeder");
        assert_eq!(config.rpc.socket_name, "delphi.sock");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("delphi-config-that-does-not-exist.toml");
        let config = DaemonConfig::load_from(&path).expect("load");
        assert_eq!(config.rpc.action_ttl_secs, 300);
    }
}
