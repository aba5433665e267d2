//! In-memory repository implementations shared by the service tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use stratifi_types::activity::UserActivity;
use stratifi_types::agent::{AgentScratchpad, AgentWallet};
use stratifi_types::chat::{ChatMessage, ChatSession};
use stratifi_types::error::{AgentError, RepositoryError};
use stratifi_types::user::{User, UserPreferences};
use uuid::Uuid;

use crate::agent::keys::{AgentKeyGenerator, GeneratedKey, KeyCipher};
use crate::hash::ContentHasher;
use crate::repository::agent::AgentRepository;
use crate::repository::chat::ChatRepository;
use crate::repository::user::UserRepository;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<ChatSession>,
    messages: Vec<ChatMessage>,
    agents: Vec<AgentWallet>,
    scratchpads: Vec<AgentScratchpad>,
    activities: Vec<UserActivity>,
}

/// Cloneable in-memory store; clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `Connection` until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Connection)
        } else {
            Ok(())
        }
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn session_count(&self) -> usize {
        self.tables.lock().unwrap().sessions.len()
    }

    pub fn agent_count(&self) -> usize {
        self.tables.lock().unwrap().agents.len()
    }

    pub fn activities(&self) -> Vec<UserActivity> {
        self.tables.lock().unwrap().activities.clone()
    }

    /// Insert a session bypassing all checks (for seeding fixtures).
    pub fn seed_session(&self, session: ChatSession) {
        self.tables.lock().unwrap().sessions.push(session);
    }
}

/// Deterministic test hasher: the "hash" is the content itself.
pub struct IdentityHasher;

impl ContentHasher for IdentityHasher {
    fn compute_hash(&self, content: &str) -> String {
        content.to_string()
    }
}

/// Key generator producing sequential addresses and derivable keys.
#[derive(Default)]
pub struct FakeKeyGenerator {
    counter: AtomicU64,
}

impl FakeKeyGenerator {
    pub fn private_key_for(address: &str) -> String {
        format!("{:0>64}", address.trim_start_matches("0x"))
    }
}

impl AgentKeyGenerator for FakeKeyGenerator {
    fn generate(&self) -> Result<GeneratedKey, AgentError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let address = format!("0x{n:040x}");
        Ok(GeneratedKey {
            private_key_hex: Self::private_key_for(&address),
            address,
        })
    }

    fn new_agent_id(&self) -> String {
        Uuid::now_v7().simple().to_string()
    }
}

/// Reversible byte scrambler standing in for the vault.
pub struct XorCipher;

impl KeyCipher for XorCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, AgentError> {
        Ok(plaintext.iter().map(|b| b ^ 0x5a).collect())
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, AgentError> {
        self.seal(sealed)
    }
}

impl UserRepository for InMemoryStore {
    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, RepositoryError> {
        self.check()?;
        // Let concurrent resolvers interleave between lookup and insert.
        tokio::task::yield_now().await;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|u| u.wallet_address == wallet_address)
            .cloned())
    }

    async fn get_user(&self, user_id: &Uuid) -> Result<Option<User>, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.id == *user_id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<User, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables
            .users
            .iter()
            .any(|u| u.wallet_address == user.wallet_address)
        {
            return Err(RepositoryError::Conflict("users.wallet_address".to_string()));
        }
        tables.users.push(user.clone());
        Ok(user.clone())
    }

    async fn touch_last_active(
        &self,
        user_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<User, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == *user_id)
            .ok_or(RepositoryError::NotFound)?;
        user.last_active = at;
        Ok(user.clone())
    }

    async fn update_preferences(
        &self,
        user_id: &Uuid,
        preferences: &UserPreferences,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == *user_id)
            .ok_or(RepositoryError::NotFound)?;
        user.preferences = preferences.clone();
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().users.len() as u64)
    }
}

impl ChatRepository for InMemoryStore {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(key) = &session.context_key {
            let taken = tables.sessions.iter().any(|s| {
                s.is_active && s.user_id == session.user_id && s.context_key.as_ref() == Some(key)
            });
            if taken {
                return Err(RepositoryError::Conflict("chat_sessions.context_key".to_string()));
            }
        }
        tables.sessions.push(session.clone());
        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.sessions.iter().find(|s| s.id == *session_id).cloned())
    }

    async fn find_by_context_key(
        &self,
        user_id: &Uuid,
        context_key: &str,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .sessions
            .iter()
            .find(|s| {
                s.is_active
                    && s.user_id == *user_id
                    && s.context_key.as_deref() == Some(context_key)
            })
            .cloned())
    }

    async fn list_active_sessions(&self, user_id: &Uuid) -> Result<Vec<ChatSession>, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let mut sessions: Vec<ChatSession> = tables
            .sessions
            .iter()
            .filter(|s| s.is_active && s.user_id == *user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        Ok(sessions)
    }

    async fn list_all_active_sessions(&self) -> Result<Vec<ChatSession>, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let mut sessions: Vec<ChatSession> =
            tables.sessions.iter().filter(|s| s.is_active).cloned().collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn deactivate_sessions(&self, session_ids: &[Uuid]) -> Result<u64, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let mut changed = 0;
        for session in tables.sessions.iter_mut() {
            if session.is_active && session_ids.contains(&session.id) {
                session.is_active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let session = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == message.session_id)
            .ok_or(RepositoryError::NotFound)?;
        if session.last_message_at < message.created_at {
            session.last_message_at = message.created_at;
        }
        tables.messages.push(message.clone());
        Ok(())
    }

    async fn get_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.session_id == *session_id)
            .cloned()
            .collect())
    }

    async fn delete_messages(&self, session_ids: &[Uuid]) -> Result<u64, RepositoryError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.messages.len();
        tables.messages.retain(|m| !session_ids.contains(&m.session_id));
        Ok((before - tables.messages.len()) as u64)
    }

    async fn count_active_sessions(&self) -> Result<u64, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.sessions.iter().filter(|s| s.is_active).count() as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().messages.len() as u64)
    }
}

impl AgentRepository for InMemoryStore {
    async fn find_agent(
        &self,
        user_wallet_address: &str,
        chain_id: u64,
    ) -> Result<Option<AgentWallet>, RepositoryError> {
        self.check()?;
        tokio::task::yield_now().await;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .agents
            .iter()
            .find(|a| a.user_wallet_address == user_wallet_address && a.chain_id == chain_id)
            .cloned())
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentWallet>, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.agents.iter().find(|a| a.agent_id == agent_id).cloned())
    }

    async fn insert_agent(&self, agent: &AgentWallet) -> Result<(), RepositoryError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.agents.iter().any(|a| {
            a.user_wallet_address == agent.user_wallet_address && a.chain_id == agent.chain_id
        }) {
            return Err(RepositoryError::Conflict("agent_wallets".to_string()));
        }
        tables.agents.push(agent.clone());
        Ok(())
    }

    async fn count_agents(&self) -> Result<u64, RepositoryError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().agents.len() as u64)
    }

    async fn get_scratchpad(&self, session_id: &str) -> Result<Option<AgentScratchpad>, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .scratchpads
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned())
    }

    async fn upsert_scratchpad(&self, scratchpad: &AgentScratchpad) -> Result<(), RepositoryError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        tables
            .scratchpads
            .retain(|s| s.session_id != scratchpad.session_id);
        tables.scratchpads.push(scratchpad.clone());
        Ok(())
    }

    async fn record_activity(&self, activity: &UserActivity) -> Result<(), RepositoryError> {
        self.check()?;
        self.tables.lock().unwrap().activities.push(activity.clone());
        Ok(())
    }

    async fn list_activities(&self, user_wallet_address: &str) -> Result<Vec<UserActivity>, RepositoryError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let mut activities: Vec<UserActivity> = tables
            .activities
            .iter()
            .filter(|a| a.user_wallet_address == user_wallet_address)
            .cloned()
            .collect();
        activities.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(activities)
    }
}
