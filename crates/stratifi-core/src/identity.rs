//! Wallet-address identity resolution.
//!
//! `IdentityResolver` maps a wallet address to exactly one durable `User`.
//! Concurrent first logins for the same wallet race on the store's unique
//! constraint; the loser re-queries and returns the winner's row.

use chrono::Utc;
use stratifi_types::error::{IdentityError, RepositoryError};
use stratifi_types::user::{normalize_wallet_address, User, UserPreferences};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::repository::user::UserRepository;

/// Resolves wallet addresses to user records, creating them on first sight.
pub struct IdentityResolver<U: UserRepository> {
    user_repo: U,
}

impl<U: UserRepository> IdentityResolver<U> {
    pub fn new(user_repo: U) -> Self {
        Self { user_repo }
    }

    /// Access the user repository.
    pub fn user_repo(&self) -> &U {
        &self.user_repo
    }

    /// Resolve a wallet address to its user, creating the user if absent.
    pub async fn resolve(&self, wallet_address: &str) -> Result<User, IdentityError> {
        self.resolve_with_preferences(wallet_address, UserPreferences::default())
            .await
    }

    /// Like [`resolve`](Self::resolve), but seeds `preferences` when the user
    /// is created. Existing users keep their stored preferences.
    pub async fn resolve_with_preferences(
        &self,
        wallet_address: &str,
        preferences: UserPreferences,
    ) -> Result<User, IdentityError> {
        let wallet = normalize_wallet_address(wallet_address).ok_or(IdentityError::InvalidAddress)?;

        if let Some(existing) = self.user_repo.find_by_wallet(&wallet).await? {
            return Ok(self.touch(existing).await);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            wallet_address: wallet.clone(),
            created_at: now,
            last_active: now,
            preferences,
        };

        match self.user_repo.insert_user(&user).await {
            Ok(created) => {
                info!(user_id = %created.id, wallet = %wallet, "Created user");
                Ok(created)
            }
            Err(RepositoryError::Conflict(_)) => {
                debug!(wallet = %wallet, "Lost user creation race, re-querying");
                let existing = self
                    .user_repo
                    .find_by_wallet(&wallet)
                    .await?
                    .ok_or(RepositoryError::NotFound)?;
                Ok(self.touch(existing).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Bump `last_active`. A failed touch is not worth failing the login for.
    async fn touch(&self, user: User) -> User {
        match self.user_repo.touch_last_active(&user.id, Utc::now()).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Failed to update last_active");
                user
            }
        }
    }
}
