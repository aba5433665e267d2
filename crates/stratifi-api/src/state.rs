//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/crypto/backend traits; AppState pins
//! them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use stratifi_core::agent::backend::ResponseGenerator;
use stratifi_core::agent::service::AgentService;
use stratifi_core::chat::service::ChatService;
use stratifi_core::identity::IdentityResolver;
use stratifi_infra::agent_client::RemoteAgentClient;
use stratifi_infra::config::RuntimeConfig;
use stratifi_infra::crypto::hash::Sha256ContentHasher;
use stratifi_infra::crypto::vault::VaultCrypto;
use stratifi_infra::sqlite::agent::SqliteAgentRepository;
use stratifi_infra::sqlite::chat::SqliteChatRepository;
use stratifi_infra::sqlite::pool::DatabasePool;
use stratifi_infra::sqlite::user::SqliteUserRepository;
use stratifi_infra::wallet::EthersKeyGenerator;
use stratifi_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteIdentityResolver = IdentityResolver<SqliteUserRepository>;

pub type ConcreteChatService = ChatService<SqliteChatRepository, Sha256ContentHasher>;

pub type ConcreteAgentService = AgentService<
    SqliteUserRepository,
    SqliteAgentRepository,
    EthersKeyGenerator,
    VaultCrypto,
    RemoteAgentClient,
>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<ConcreteIdentityResolver>,
    pub chat_service: Arc<ConcreteChatService>,
    pub agent_service: Arc<ConcreteAgentService>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, load the vault, wire services.
    pub async fn init(runtime: &RuntimeConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&runtime.data_dir).await?;

        let db_pool = DatabasePool::new(&runtime.database_url).await?;
        let vault = VaultCrypto::load(runtime.vault_key.as_ref(), &runtime.data_dir)?;

        tracing::debug!(
            data_dir = %runtime.data_dir.display(),
            remote_agent = runtime.app.agent.enabled,
            "Application state initialized"
        );

        Self::build(
            db_pool,
            vault,
            runtime.app.clone(),
            runtime.data_dir.clone(),
        )
    }

    /// Wire services over an open pool.
    pub fn build(
        db_pool: DatabasePool,
        vault: VaultCrypto,
        config: AppConfig,
        data_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let identity = IdentityResolver::new(SqliteUserRepository::new(db_pool.clone()));

        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            Sha256ContentHasher::new(),
        );

        let generator = if config.agent.enabled {
            let client = RemoteAgentClient::from_config(&config.agent)
                .context("failed to build the remote agent HTTP client")?;
            ResponseGenerator::remote(client)
        } else {
            ResponseGenerator::local_only()
        };

        let agent_service = AgentService::new(
            IdentityResolver::new(SqliteUserRepository::new(db_pool.clone())),
            SqliteAgentRepository::new(db_pool.clone()),
            EthersKeyGenerator::new(),
            vault,
            generator,
        );

        Ok(Self {
            identity: Arc::new(identity),
            chat_service: Arc::new(chat_service),
            agent_service: Arc::new(agent_service),
            config: Arc::new(config),
            data_dir,
            db_pool,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use stratifi_infra::sqlite::pool::default_database_url;

    /// State over a throwaway SQLite file, with the remote agent at `agent_url`
    /// (or disabled when `None`).
    pub(crate) async fn test_state(agent_url: Option<&str>) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);

        let pool = DatabasePool::new(&default_database_url(&data_dir))
            .await
            .unwrap();

        let mut config = AppConfig::default();
        match agent_url {
            Some(url) => {
                config.agent.url = url.to_string();
                config.agent.timeout_secs = 2;
            }
            None => config.agent.enabled = false,
        }

        AppState::build(pool, VaultCrypto::new(&[9u8; 32]), config, data_dir).unwrap()
    }
}
