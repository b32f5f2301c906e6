//! User accounts and API key authentication.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use chatbox_types::error::{ChatError, RepositoryError};
use chatbox_types::user::User;

use crate::repository::user::UserRepository;
use crate::service::hash::KeyHasher;

const USERNAME_MAX_LENGTH: usize = 150;
const API_KEY_PREFIX: &str = "cbx_";

/// A freshly created user with the plaintext API key. The key is not stored
/// anywhere and cannot be recovered later.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user: User,
    pub api_key: String,
}

pub struct UserService<U: UserRepository, H: KeyHasher> {
    users: U,
    hasher: H,
}

impl<U: UserRepository, H: KeyHasher> UserService<U, H> {
    pub fn new(users: U, hasher: H) -> Self {
        Self { users, hasher }
    }

    /// Create a user and issue their API key.
    pub async fn create_user(&self, username: &str) -> Result<NewUser, ChatError> {
        let username = validate_username(username)?;

        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        let api_key = generate_api_key();

        self.users
            .create_user(&user, &self.hasher.hash_key(&api_key))
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    ChatError::Conflict(format!("username '{}' is taken", user.username))
                }
                other => ChatError::Storage(other),
            })?;

        info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(NewUser { user, api_key })
    }

    /// Resolve the owner of `api_key`, if any.
    pub async fn authenticate(&self, api_key: &str) -> Result<Option<User>, ChatError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Ok(None);
        }
        Ok(self
            .users
            .find_by_api_key_hash(&self.hasher.hash_key(api_key))
            .await?)
    }
}

fn validate_username(raw: &str) -> Result<&str, ChatError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(ChatError::InvalidInput("username cannot be empty".to_string()));
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(ChatError::InvalidInput(format!(
            "username must be at most {USERNAME_MAX_LENGTH} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(ChatError::InvalidInput(
            "username may only contain letters, digits, and @.+-_".to_string(),
        ));
    }
    Ok(username)
}

/// 256 random bits from two v4 UUIDs, hex encoded.
fn generate_api_key() -> String {
    format!(
        "{API_KEY_PREFIX}{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}
