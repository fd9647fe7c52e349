//! PublisherConfig - Config Loader output
//!
//! Describes one writer process: the writer itself, the broker it talks to,
//! where start-up documents are fetched from and how it reports.

use serde::{Deserialize, Serialize};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Writer settings
    pub writer: WriterConfig,

    /// Broker settings
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Document service settings
    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Logging and metrics settings
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

/// Channel writer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Writer name (used in logs and metric labels)
    pub name: String,

    /// Transactional mode flag, fixed for the writer's lifetime
    #[serde(default)]
    pub transactional: bool,
}

/// Broker backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerKind {
    /// In-process broker that journals publishes
    #[default]
    Loopback,
}

/// Broker settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default)]
    pub kind: BrokerKind,

    /// Loopback only: fail every Nth publish (0 = never)
    #[serde(default)]
    pub fail_every: u64,
}

/// Document service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Base URL that relative document paths are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Logging and metrics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilitySettings {
    #[serde(default)]
    pub log_format: LogFormat,

    /// Prometheus port (0 = disabled)
    #[serde(default)]
    pub metrics_port: u16,

    /// Default level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            metrics_port: 0,
            log_level: default_log_level(),
        }
    }
}
