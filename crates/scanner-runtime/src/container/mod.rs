//! # Container
//!
//! Process-wide configuration, loaded once before anything else starts.

pub mod config;

pub use config::{
    read_pem_certificate, ConfigError, RpcConfig, ScanSection, ScannerConfig, StorageConfig,
};
