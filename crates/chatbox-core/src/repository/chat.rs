//! Chat repository trait definition.
//!
//! Covers chats, memberships, group admin roles, and the per-user chat feed
//! ordered by most recent message.

use chatbox_types::chat::{AdminRole, Chat, ChatSummary, Membership};
use chatbox_types::error::RepositoryError;
use chatbox_types::pagination::OrderingKey;
use uuid::Uuid;

use crate::pagination::OrderedCollectionProvider;

/// Repository trait for chat persistence.
///
/// Every read that takes a `user_id` is scoped to chats the user is a member
/// of; a chat the user cannot see is reported as absent.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// The chat-by-recency feed of one user.
    type Feed: OrderedCollectionProvider<Item = ChatSummary>;

    // -----------------------------------------------------------------------
    // Chats
    // -----------------------------------------------------------------------

    /// Chats `user_id` belongs to, keyed by their last message.
    fn chat_feed(&self, user_id: &Uuid) -> Self::Feed;

    /// Create a chat together with its initial members.
    fn create_chat(
        &self,
        chat: &Chat,
        members: &[Uuid],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get_chat_for_member(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Returns `NotFound` if the chat is not a group.
    fn rename_group(
        &self,
        chat_id: &Uuid,
        group_name: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a chat with its memberships, roles, and messages.
    /// Returns `true` if the chat existed.
    fn delete_chat(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    // -----------------------------------------------------------------------
    // Memberships
    // -----------------------------------------------------------------------

    fn get_membership(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Membership>, RepositoryError>> + Send;

    /// Returns `Conflict` if the user is already a member.
    fn add_member(
        &self,
        membership: &Membership,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove a member and return how many members remain.
    fn remove_member(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Move the member's read position to `seen`, unless it is already at or
    /// past it. Returns the position after the update.
    fn advance_last_seen(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
        seen: &OrderingKey,
    ) -> impl std::future::Future<Output = Result<OrderingKey, RepositoryError>> + Send;

    // -----------------------------------------------------------------------
    // Admin roles
    // -----------------------------------------------------------------------

    fn get_admin_role(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<AdminRole>, RepositoryError>> + Send;

    /// Insert or replace a member's admin role.
    fn set_admin_role(
        &self,
        role: &AdminRole,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
