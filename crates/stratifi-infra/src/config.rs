//! Configuration loader for Stratifi.
//!
//! Layering: [`AppConfig::default()`] ← `{data_dir}/config.toml` ← environment.
//! A missing or malformed config file falls back to defaults.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use stratifi_types::config::AppConfig;

use crate::sqlite::pool::default_database_url;

pub const ENV_DATA_DIR: &str = "STRATIFI_DATA_DIR";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_AGENT_BACKEND_URL: &str = "AGENT_BACKEND_URL";
pub const ENV_AGENT_TIMEOUT_SECS: &str = "AGENT_TIMEOUT_SECS";
pub const ENV_VAULT_KEY: &str = "STRATIFI_VAULT_KEY";
pub const ENV_DISABLE_REMOTE_AGENT: &str = "STRATIFI_DISABLE_REMOTE_AGENT";
pub const ENV_OTEL: &str = "STRATIFI_OTEL";

/// Everything the binary needs to start, resolved once at startup.
#[derive(Debug)]
pub struct RuntimeConfig {
    pub data_dir: PathBuf,
    pub app: AppConfig,
    pub database_url: String,
    pub vault_key: Option<SecretString>,
    pub otel: bool,
}

impl RuntimeConfig {
    /// Resolve from the process environment.
    pub async fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok()).await
    }

    /// Resolve using `lookup` for environment variables.
    pub async fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = resolve_data_dir(&lookup);
        let app = apply_env_overrides(load_app_config(&data_dir).await, &lookup);
        let database_url = resolve_database_url(&app, &data_dir);
        let vault_key = lookup(ENV_VAULT_KEY)
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from);
        let otel = lookup(ENV_OTEL).is_some_and(|v| is_truthy(&v));

        Self {
            data_dir,
            app,
            database_url,
            vault_key,
            otel,
        }
    }
}

/// Resolve the data directory.
///
/// Priority:
/// 1. `STRATIFI_DATA_DIR` environment variable
/// 2. `~/.stratifi`
fn resolve_data_dir<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".stratifi");
    }

    PathBuf::from(".stratifi")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`AppConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Apply environment overrides on top of file configuration.
///
/// Unparsable numeric values are ignored with a warning.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_DATABASE_URL).filter(|v| !v.is_empty()) {
        config.database_url = Some(url);
    }

    if let Some(url) = lookup(ENV_AGENT_BACKEND_URL).filter(|v| !v.is_empty()) {
        config.agent.url = url;
    }

    if let Some(raw) = lookup(ENV_AGENT_TIMEOUT_SECS) {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => config.agent.timeout_secs = secs,
            _ => tracing::warn!(value = %raw, "Ignoring invalid {ENV_AGENT_TIMEOUT_SECS}"),
        }
    }

    if lookup(ENV_DISABLE_REMOTE_AGENT).is_some_and(|v| is_truthy(&v)) {
        config.agent.enabled = false;
    }

    config
}

/// The configured database URL, or the default SQLite file in `data_dir`.
pub fn resolve_database_url(config: &AppConfig, data_dir: &Path) -> String {
    config
        .database_url
        .clone()
        .unwrap_or_else(|| default_database_url(data_dir))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn load_app_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.agent.timeout_secs, 30);
        assert!(config.database_url.is_none());
    }

    #[tokio::test]
    async fn load_app_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[agent]
url = "http://agent:9000"
timeout_secs = 12
"#,
        )
        .await
        .unwrap();

        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.agent.url, "http://agent:9000");
        assert_eq!(config.agent.timeout_secs, 12);
    }

    #[tokio::test]
    async fn load_app_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_app_config(tmp.path()).await;
        assert_eq!(config.agent.url, "http://localhost:8000");
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut file = AppConfig::default();
        file.agent.url = "http://from-file".to_string();

        let config = apply_env_overrides(
            file,
            env(&[
                (ENV_AGENT_BACKEND_URL, "http://from-env"),
                (ENV_AGENT_TIMEOUT_SECS, "7"),
                (ENV_DATABASE_URL, "sqlite::memory:"),
                (ENV_DISABLE_REMOTE_AGENT, "true"),
            ]),
        );
        assert_eq!(config.agent.url, "http://from-env");
        assert_eq!(config.agent.timeout_secs, 7);
        assert_eq!(config.database_url.as_deref(), Some("sqlite::memory:"));
        assert!(!config.agent.enabled);
    }

    #[test]
    fn invalid_timeout_is_ignored() {
        let config = apply_env_overrides(
            AppConfig::default(),
            env(&[(ENV_AGENT_TIMEOUT_SECS, "soon"), (ENV_DISABLE_REMOTE_AGENT, "0")]),
        );
        assert_eq!(config.agent.timeout_secs, 30);
        assert!(config.agent.enabled);
    }

    #[test]
    fn database_url_defaults_to_data_dir() {
        let url = resolve_database_url(&AppConfig::default(), Path::new("/var/lib/stratifi"));
        assert_eq!(url, "sqlite:///var/lib/stratifi/stratifi.db?mode=rwc");
    }

    #[tokio::test]
    async fn runtime_config_reads_data_dir_and_flags() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_string_lossy().to_string();
        let runtime = RuntimeConfig::resolve(env(&[
            (ENV_DATA_DIR, dir.as_str()),
            (ENV_OTEL, "yes"),
            (ENV_VAULT_KEY, "  "),
        ]))
        .await;

        assert_eq!(runtime.data_dir, tmp.path());
        assert!(runtime.otel);
        assert!(runtime.vault_key.is_none());
        assert!(runtime.database_url.ends_with("stratifi.db?mode=rwc"));
    }
}
