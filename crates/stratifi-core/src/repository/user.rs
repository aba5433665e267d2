//! User repository trait definition.

use chrono::{DateTime, Utc};
use stratifi_types::error::RepositoryError;
use stratifi_types::user::{User, UserPreferences};
use uuid::Uuid;

/// Repository trait for user persistence.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait UserRepository: Send + Sync {
    /// Look up a user by normalized wallet address.
    fn find_by_wallet(
        &self,
        wallet_address: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Get a user by id.
    fn get_user(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Insert a new user. Returns `Conflict` if the wallet address is taken.
    fn insert_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Set `last_active` and return the updated row. `NotFound` if absent.
    fn touch_last_active(
        &self,
        user_id: &Uuid,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Replace the stored preferences.
    fn update_preferences(
        &self,
        user_id: &Uuid,
        preferences: &UserPreferences,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Count all users.
    fn count_users(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
