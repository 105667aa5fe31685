//! # Scanner Configuration
//!
//! Loaded once at startup from a TOML file, then overridden from the
//! environment, then validated. Immutable afterwards.
//!
//! ```toml
//! [rpc]
//! endpoint = "https://127.0.0.1:8332"
//! user = "scanner"
//! password = "secret"
//! cert_path = "/etc/nonce-scan/node.pem"
//! timeout_secs = 30
//!
//! [storage]
//! db_path = "./data/ldb"
//! sync_writes = true
//! block_cache_mb = 256
//!
//! [scan]
//! queue_capacity = 4096
//! progress_interval = 1000
//! signature_push_len = 71
//! stop_height = 800000
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `NS_RPC_ENDPOINT` | `rpc.endpoint` |
//! | `NS_RPC_USER` | `rpc.user` |
//! | `NS_RPC_PASSWORD` | `rpc.password` |
//! | `NS_DB_PATH` | `storage.db_path` |

use crate::adapters::storage::RocksDbConfig;
use ns_01_signature_extraction::{ExtractorConfig, DEFAULT_SIGNATURE_PUSH_LEN};
use ns_03_scan_loop::{ScanConfig, DEFAULT_PROGRESS_INTERVAL, DEFAULT_QUEUE_CAPACITY};
use serde::Deserialize;
use shared_types::{BlockHeight, Classify, ErrorClass};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_RPC_ENDPOINT: &str = "NS_RPC_ENDPOINT";
pub const ENV_RPC_USER: &str = "NS_RPC_USER";
pub const ENV_RPC_PASSWORD: &str = "NS_RPC_PASSWORD";
pub const ENV_DB_PATH: &str = "NS_DB_PATH";

/// Configuration errors. Always fatal, and always raised before scanning.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A field has an unusable value.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The TLS root certificate is missing or unreadable.
    #[error("bad certificate {path}: {reason}")]
    Certificate { path: String, reason: String },
}

impl Classify for ConfigError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Configuration
    }
}

/// Complete scanner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerConfig {
    pub rpc: RpcConfig,
    pub storage: StorageConfig,
    pub scan: ScanSection,
}

/// Node connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RpcConfig {
    /// JSON-RPC URL of the node.
    pub endpoint: String,
    pub user: String,
    pub password: String,
    /// PEM root certificate to trust for an `https` endpoint.
    pub cert_path: Option<PathBuf>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8332".to_string(),
            user: String::new(),
            password: String::new(),
            cert_path: None,
            timeout_secs: 30,
        }
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Signature store location and tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    /// fsync every write.
    pub sync_writes: bool,
    pub block_cache_mb: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/ldb"),
            sync_writes: true,
            block_cache_mb: 256,
        }
    }
}

impl StorageConfig {
    pub fn rocksdb_config(&self) -> RocksDbConfig {
        RocksDbConfig {
            path: self.db_path.clone(),
            block_cache_size: self.block_cache_mb.saturating_mul(1024 * 1024),
            sync_writes: self.sync_writes,
            ..RocksDbConfig::default()
        }
    }
}

/// Scan loop and extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSection {
    pub queue_capacity: usize,
    pub progress_interval: u64,
    /// Push length treated as a legacy signature candidate.
    pub signature_push_len: usize,
    pub stop_height: Option<BlockHeight>,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            signature_push_len: DEFAULT_SIGNATURE_PUSH_LEN,
            stop_height: None,
        }
    }
}

impl ScanSection {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            queue_capacity: self.queue_capacity,
            progress_interval: self.progress_interval,
            stop_height: self.stop_height,
        }
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            signature_push_len: self.signature_push_len,
            ..ExtractorConfig::default()
        }
    }
}

impl ScannerConfig {
    /// Read and parse a config file. No overrides, no validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse TOML. Missing sections and fields take their defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// File (when given), then process environment.
    ///
    /// Not validated: `scan` needs [`validate`](Self::validate), listing
    /// collisions needs only the storage section.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_RPC_ENDPOINT) {
            self.rpc.endpoint = endpoint;
        }
        if let Some(user) = lookup(ENV_RPC_USER) {
            self.rpc.user = user;
        }
        if let Some(password) = lookup(ENV_RPC_PASSWORD) {
            self.rpc.password = password;
        }
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.storage.db_path = PathBuf::from(path);
        }
    }

    /// Check everything that can be checked without contacting the node.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.rpc.endpoint).map_err(|e| ConfigError::Invalid {
            field: "rpc.endpoint",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "rpc.endpoint",
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if self.rpc.user.is_empty() {
            return Err(ConfigError::Invalid {
                field: "rpc.user",
                reason: "must not be empty".into(),
            });
        }
        if self.rpc.password.is_empty() {
            return Err(ConfigError::Invalid {
                field: "rpc.password",
                reason: "must not be empty".into(),
            });
        }
        if self.rpc.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "rpc.timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if let Some(path) = &self.rpc.cert_path {
            read_pem_certificate(path)?;
        }
        if self.scan.queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "scan.queue_capacity",
                reason: "must be greater than zero".into(),
            });
        }
        if self.scan.progress_interval == 0 {
            return Err(ConfigError::Invalid {
                field: "scan.progress_interval",
                reason: "must be greater than zero".into(),
            });
        }
        if self.scan.signature_push_len < 9 || self.scan.signature_push_len > 73 {
            return Err(ConfigError::Invalid {
                field: "scan.signature_push_len",
                reason: format!(
                    "{} is outside the DER signature size range 9..=73",
                    self.scan.signature_push_len
                ),
            });
        }
        Ok(())
    }
}

const PEM_CERT_BEGIN: &str = "-----BEGIN CERTIFICATE-----";

/// Read a PEM file and check it holds at least one certificate.
pub fn read_pem_certificate(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let bytes = std::fs::read(path).map_err(|e| ConfigError::Certificate {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let is_pem = std::str::from_utf8(&bytes)
        .map(|text| text.contains(PEM_CERT_BEGIN))
        .unwrap_or(false);
    if !is_pem {
        return Err(ConfigError::Certificate {
            path: path.display().to_string(),
            reason: "no PEM certificate block found".into(),
        });
    }
    Ok(bytes)
}
