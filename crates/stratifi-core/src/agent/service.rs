//! Agent service: custodial agent wallet creation and agent chat turns.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use stratifi_types::activity::{ActivityStatus, ActivityType, UserActivity};
use stratifi_types::agent::{
    chain_name, AgentScratchpad, AgentWallet, HistoryEntry, ResponseSource, WalletAction,
};
use stratifi_types::error::{AgentError, IdentityError, RepositoryError};
use stratifi_types::user::{normalize_wallet_address, UserPreferences, DEFAULT_RISK_PROFILE};
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::backend::{AgentBackend, AgentRequest, ResponseGenerator};
use crate::agent::intent::{extract_wallet_action, MORPHO_USDC_POOL};
use crate::agent::keys::{AgentKeyGenerator, KeyCipher};
use crate::agent::prompt::{append_scratchpad, contextual_message, PromptContext};
use crate::identity::IdentityResolver;
use crate::repository::agent::AgentRepository;
use crate::repository::user::UserRepository;

/// Body of `POST /create_agent`. Fields are optional so that missing ones
/// can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAgentRequest {
    #[serde(rename = "userWalletAddress", default)]
    pub user_wallet_address: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// Body of `POST /chat_with_agent`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatTurnRequest {
    #[serde(rename = "userWalletAddress", default)]
    pub user_wallet_address: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(rename = "messageHistory", default)]
    pub message_history: Vec<HistoryEntry>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of one agent chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub response: String,
    pub wallet_action: Option<WalletAction>,
    pub scratchpad: String,
    pub source: ResponseSource,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn missing(names: Vec<&str>) -> Result<(), AgentError> {
    if names.is_empty() {
        Ok(())
    } else {
        Err(AgentError::MissingParameters(names.join(", ")))
    }
}

/// Orchestrates agent wallets, the scratchpad, and response generation.
pub struct AgentService<U, A, K, C, B>
where
    U: UserRepository,
    A: AgentRepository,
    K: AgentKeyGenerator,
    C: KeyCipher,
    B: AgentBackend,
{
    identity: IdentityResolver<U>,
    agent_repo: A,
    keygen: K,
    cipher: C,
    generator: ResponseGenerator<B>,
}

impl<U, A, K, C, B> AgentService<U, A, K, C, B>
where
    U: UserRepository,
    A: AgentRepository,
    K: AgentKeyGenerator,
    C: KeyCipher,
    B: AgentBackend,
{
    pub fn new(
        identity: IdentityResolver<U>,
        agent_repo: A,
        keygen: K,
        cipher: C,
        generator: ResponseGenerator<B>,
    ) -> Self {
        Self {
            identity,
            agent_repo,
            keygen,
            cipher,
            generator,
        }
    }

    /// Access the agent repository.
    pub fn agent_repo(&self) -> &A {
        &self.agent_repo
    }

    /// Return the agent for `(wallet, chain)`, creating it if absent.
    pub async fn create_agent(&self, request: &CreateAgentRequest) -> Result<AgentWallet, AgentError> {
        let wallet = present(&request.user_wallet_address);
        let chain_id = request.chain_id.filter(|id| *id != 0);

        let mut absent = Vec::new();
        if wallet.is_none() {
            absent.push("userWalletAddress");
        }
        if chain_id.is_none() {
            absent.push("chain_id");
        }
        missing(absent)?;
        let (Some(wallet), Some(chain_id)) = (wallet, chain_id) else {
            return Err(AgentError::MissingParameters("userWalletAddress, chain_id".to_string()));
        };

        let seed = UserPreferences {
            chain_id: Some(chain_id),
            risk_profile: Some(DEFAULT_RISK_PROFILE.to_string()),
            ..Default::default()
        };
        let user = self.identity.resolve_with_preferences(wallet, seed).await?;

        if user.preferences.risk_profile.is_none() {
            let mut preferences = user.preferences.clone();
            preferences.risk_profile = Some(DEFAULT_RISK_PROFILE.to_string());
            if let Err(e) = self
                .identity
                .user_repo()
                .update_preferences(&user.id, &preferences)
                .await
            {
                warn!(user_id = %user.id, error = %e, "Failed to set default risk profile");
            }
        }

        let wallet = user.wallet_address;
        if let Some(existing) = self.agent_repo.find_agent(&wallet, chain_id).await? {
            info!(agent_id = %existing.agent_id, chain_id, "Returning existing agent");
            return Ok(existing);
        }

        let key = self.keygen.generate()?;
        let encrypted_private_key = self.cipher.seal(key.private_key_hex.as_bytes())?;
        let agent = AgentWallet {
            agent_id: self.keygen.new_agent_id(),
            user_wallet_address: wallet.clone(),
            chain_id,
            wallet_address: key.address,
            encrypted_private_key,
            created_at: Utc::now(),
        };

        match self.agent_repo.insert_agent(&agent).await {
            Ok(()) => {
                info!(
                    agent_id = %agent.agent_id,
                    address = %agent.wallet_address,
                    chain_id,
                    "Created agent wallet"
                );
                Ok(agent)
            }
            Err(RepositoryError::Conflict(_)) => {
                let existing = self
                    .agent_repo
                    .find_agent(&wallet, chain_id)
                    .await?
                    .ok_or(RepositoryError::NotFound)?;
                Ok(existing)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether chat turns try the remote agent before answering locally.
    pub fn remote_enabled(&self) -> bool {
        self.generator.has_remote()
    }

    /// Wallet activities recorded for a user wallet, newest first.
    pub async fn activities(
        &self,
        user_wallet_address: &str,
    ) -> Result<Vec<UserActivity>, AgentError> {
        let wallet = normalize_wallet_address(user_wallet_address)
            .ok_or(AgentError::Identity(IdentityError::InvalidAddress))?;
        Ok(self.agent_repo.list_activities(&wallet).await?)
    }

    /// Decrypt an agent's private key (hex).
    #[cfg(test)]
    fn reveal_private_key(&self, agent: &AgentWallet) -> Result<String, AgentError> {
        let plaintext = self.cipher.open(&agent.encrypted_private_key)?;
        String::from_utf8(plaintext).map_err(|_| AgentError::Encryption)
    }

    /// Run one chat turn against the agent.
    pub async fn chat(&self, request: &ChatTurnRequest) -> Result<ChatTurn, AgentError> {
        let wallet = present(&request.user_wallet_address);
        let chain_id = request.chain_id.filter(|id| *id != 0);
        let agent_id = present(&request.agent_id);
        let session_id = present(&request.session_id);
        let message = present(&request.message);

        let mut absent = Vec::new();
        if wallet.is_none() {
            absent.push("userWalletAddress");
        }
        if chain_id.is_none() {
            absent.push("chain_id");
        }
        if agent_id.is_none() {
            absent.push("agent_id");
        }
        if session_id.is_none() {
            absent.push("session_id");
        }
        if message.is_none() {
            absent.push("message");
        }
        missing(absent)?;
        let (Some(wallet), Some(chain_id), Some(agent_id), Some(session_id), Some(message)) =
            (wallet, chain_id, agent_id, session_id, message)
        else {
            return Err(AgentError::MissingParameters("request".to_string()));
        };

        let wallet = normalize_wallet_address(wallet).ok_or(AgentError::AgentNotFound)?;
        let agent = self
            .agent_repo
            .get_agent(agent_id)
            .await?
            .filter(|a| a.user_wallet_address == wallet)
            .ok_or(AgentError::AgentNotFound)?;

        let risk_profile = self
            .identity
            .user_repo()
            .find_by_wallet(&wallet)
            .await?
            .and_then(|u| u.preferences.risk_profile)
            .unwrap_or_else(|| DEFAULT_RISK_PROFILE.to_string());

        let existing = self.agent_repo.get_scratchpad(session_id).await?;
        let previous = existing.as_ref().map(|s| s.content.as_str());

        let prompt = contextual_message(&PromptContext {
            user_wallet: request.user_wallet_address.as_deref().unwrap_or(&wallet).trim(),
            chain_id,
            agent_wallet: &agent.wallet_address,
            risk_profile: &risk_profile,
            scratchpad: previous,
            history: &request.message_history,
            message,
        });
        let upstream = AgentRequest {
            message: prompt,
            session_id: session_id.to_string(),
            user_id: agent.agent_id.clone(),
        };

        let generated = self
            .generator
            .generate(&upstream, message, chain_name(chain_id))
            .await;

        let wallet_action = match generated.source {
            ResponseSource::RemoteAgent => extract_wallet_action(&generated.text),
            ResponseSource::LocalHeuristic => None,
        };

        let now = Utc::now();
        let scratchpad = AgentScratchpad {
            session_id: session_id.to_string(),
            content: append_scratchpad(previous, message, &generated.text, now),
            updated_at: now,
        };
        if let Err(e) = self.agent_repo.upsert_scratchpad(&scratchpad).await {
            warn!(session_id = %session_id, error = %e, "Failed to persist agent scratchpad");
        }

        if let Some(action) = &wallet_action {
            let activity = UserActivity {
                id: Uuid::now_v7(),
                user_wallet_address: wallet.clone(),
                session_id: Some(session_id.to_string()),
                activity_type: ActivityType::Lend,
                token_symbol: "USDC".to_string(),
                pool_id: MORPHO_USDC_POOL.to_string(),
                amount: action.value.clone(),
                transaction_hash: None,
                status: ActivityStatus::Pending,
                created_at: now,
                metadata: serde_json::json!({
                    "agent_id": agent.agent_id,
                    "wallet_action": action,
                }),
            };
            if let Err(e) = self.agent_repo.record_activity(&activity).await {
                warn!(session_id = %session_id, error = %e, "Failed to record wallet activity");
            }
        }

        info!(
            agent_id = %agent.agent_id,
            session_id = %session_id,
            source = ?generated.source,
            wallet_action = wallet_action.is_some(),
            "Agent chat turn complete"
        );

        Ok(ChatTurn {
            response: generated.text,
            wallet_action,
            scratchpad: scratchpad.content,
            source: generated.source,
        })
    }
}
