//! SQLite user repository implementation.

use chrono::{DateTime, Utc};
use sqlx::Row;
use stratifi_core::repository::user::UserRepository;
use stratifi_types::error::RepositoryError;
use stratifi_types::user::{User, UserPreferences};
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, write_error};

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain User.
struct UserRow {
    id: String,
    wallet_address: String,
    created_at: String,
    last_active: String,
    preferences: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            wallet_address: row.try_get("wallet_address")?,
            created_at: row.try_get("created_at")?,
            last_active: row.try_get("last_active")?,
            preferences: row.try_get("preferences")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let preferences: UserPreferences = serde_json::from_str(&self.preferences)
            .map_err(|e| RepositoryError::Query(format!("invalid preferences: {e}")))?;

        Ok(User {
            id,
            wallet_address: self.wallet_address,
            created_at: parse_datetime(&self.created_at)?,
            last_active: parse_datetime(&self.last_active)?,
            preferences,
        })
    }
}

fn row_to_user(row: Option<sqlx::sqlite::SqliteRow>) -> Result<Option<User>, RepositoryError> {
    match row {
        Some(row) => {
            let user_row =
                UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(Some(user_row.into_user()?))
        }
        None => Ok(None),
    }
}

fn preferences_json(preferences: &UserPreferences) -> Result<String, RepositoryError> {
    serde_json::to_string(preferences)
        .map_err(|e| RepositoryError::Query(format!("failed to serialize preferences: {e}")))
}

impl UserRepository for SqliteUserRepository {
    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE wallet_address = ?")
            .bind(wallet_address)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        row_to_user(row)
    }

    async fn get_user(&self, user_id: &Uuid) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        row_to_user(row)
    }

    async fn insert_user(&self, user: &User) -> Result<User, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO users (id, wallet_address, created_at, last_active, preferences)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.to_string())
        .bind(&user.wallet_address)
        .bind(format_datetime(&user.created_at))
        .bind(format_datetime(&user.last_active))
        .bind(preferences_json(&user.preferences)?)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| write_error(e, "users.wallet_address"))?;

        Ok(user.clone())
    }

    async fn touch_last_active(
        &self,
        user_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query("UPDATE users SET last_active = ? WHERE id = ? RETURNING *")
            .bind(format_datetime(&at))
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row_to_user(row)?.ok_or(RepositoryError::NotFound)
    }

    async fn update_preferences(
        &self,
        user_id: &Uuid,
        preferences: &UserPreferences,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET preferences = ? WHERE id = ?")
            .bind(preferences_json(preferences)?)
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM users")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stratifi_core::identity::IdentityResolver;

    use super::*;
    use crate::sqlite::test_support::test_pool;

    fn make_user(wallet: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::now_v7(),
            wallet_address: wallet.to_string(),
            created_at: now,
            last_active: now,
            preferences: UserPreferences::default(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("0xabc");
        repo.insert_user(&user).await.unwrap();

        let found = repo.find_by_wallet("0xabc").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(repo.get_user(&user.id).await.unwrap().unwrap().wallet_address, "0xabc");
        assert!(repo.find_by_wallet("0xdef").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_wallet_is_conflict() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.insert_user(&make_user("0xabc")).await.unwrap();

        let err = repo.insert_user(&make_user("0xabc")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_touch_and_preferences() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("0xabc");
        repo.insert_user(&user).await.unwrap();

        let later = user.last_active + chrono::Duration::seconds(5);
        let touched = repo.touch_last_active(&user.id, later).await.unwrap();
        assert_eq!(touched.last_active, later);

        let prefs = UserPreferences {
            risk_profile: Some("conservative".to_string()),
            chain_id: Some(10),
            ..Default::default()
        };
        repo.update_preferences(&user.id, &prefs).await.unwrap();
        let stored = repo.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.preferences, prefs);

        let err = repo
            .touch_last_active(&Uuid::now_v7(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_concurrent_resolve_creates_one_row() {
        let pool = test_pool().await;
        let resolver = Arc::new(IdentityResolver::new(SqliteUserRepository::new(pool.clone())));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move {
                resolver.resolve("0xAAAA").await.unwrap().id
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        assert!(ids.iter().all(|id| *id == ids[0]));
        let repo = SqliteUserRepository::new(pool);
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }
}
