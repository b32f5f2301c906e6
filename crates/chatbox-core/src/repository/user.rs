//! User repository trait definition.

use chatbox_types::error::RepositoryError;
use chatbox_types::user::User;
use uuid::Uuid;

/// Repository trait for user accounts and their API key hashes.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait UserRepository: Send + Sync {
    /// Create a user. Returns `Conflict` if the username is taken.
    fn create_user(
        &self,
        user: &User,
        api_key_hash: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get_user(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Look up the owner of an API key by the key's SHA-256 hex hash.
    fn find_by_api_key_hash(
        &self,
        api_key_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;
}
