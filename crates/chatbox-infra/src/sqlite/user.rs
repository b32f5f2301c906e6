//! SQLite user repository implementation.

use sqlx::Row;
use uuid::Uuid;

use chatbox_core::repository::user::UserRepository;
use chatbox_types::error::RepositoryError;
use chatbox_types::user::User;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid, write_error};

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: String,
    username: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        Ok(User {
            id: parse_uuid(&self.id, "user id")?,
            username: self.username,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl SqliteUserRepository {
    async fn fetch_one_by(&self, column: &str, value: String) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT id, username, created_at FROM users WHERE {column} = ?"
        ))
        .bind(value)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &User, api_key_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO users (id, username, api_key_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.username)
            .bind(api_key_hash)
            .bind(format_datetime(&user.created_at))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| write_error(e, || format!("user '{}' already exists", user.username)))?;

        Ok(())
    }

    async fn get_user(&self, id: &Uuid) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_by("id", id.to_string()).await
    }

    async fn find_by_api_key_hash(&self, api_key_hash: &str) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_by("api_key_hash", api_key_hash.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_support::test_pool;
    use chrono::{SubsecRound, Utc};

    fn make_user(name: &str) -> User {
        User {
            id: Uuid::now_v7(),
            username: name.to_string(),
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let user = make_user("alice");
        repo.create_user(&user, "deadbeef").await.unwrap();

        assert_eq!(repo.get_user(&user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(repo.find_by_api_key_hash("deadbeef").await.unwrap(), Some(user));
        assert!(repo.find_by_api_key_hash("cafebabe").await.unwrap().is_none());
        assert!(repo.get_user(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.create_user(&make_user("bob"), "h1").await.unwrap();

        let result = repo.create_user(&make_user("bob"), "h2").await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }
}
