//! Global configuration types for Stratifi.
//!
//! `AppConfig` represents the optional `config.toml` in the data directory.
//! Environment variables override file values (see `stratifi-infra::config`).
//! All fields have sensible defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Stratifi backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// sqlx database URL. Defaults to `{data_dir}/stratifi.db` when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub agent: AgentBackendConfig,

    /// Sessions created closer together than this are treated as duplicates
    /// by the cleanup command.
    #[serde(default = "default_cleanup_window_minutes")]
    pub cleanup_window_minutes: i64,
}

fn default_cleanup_window_minutes() -> i64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            server: ServerConfig::default(),
            agent: AgentBackendConfig::default(),
            cleanup_window_minutes: default_cleanup_window_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream agent service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBackendConfig {
    #[serde(default = "default_agent_url")]
    pub url: String,

    #[serde(default = "default_agent_timeout_secs")]
    pub timeout_secs: u64,

    /// When false, every chat turn is answered by the local heuristic.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_agent_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_agent_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for AgentBackendConfig {
    fn default() -> Self {
        Self {
            url: default_agent_url(),
            timeout_secs: default_agent_timeout_secs(),
            enabled: true,
        }
    }
}
