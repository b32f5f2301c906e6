//! Message repository trait definition.

use chatbox_types::error::RepositoryError;
use chatbox_types::message::Message;
use uuid::Uuid;

use crate::pagination::OrderedCollectionProvider;

/// Which messages of a chat a feed covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageScope {
    All,
    /// Messages after the given member's last-seen position.
    UnreadBy(Uuid),
}

/// Repository trait for chat messages.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait MessageRepository: Send + Sync {
    type Feed: OrderedCollectionProvider<Item = Message>;

    /// Messages of one chat, keyed by `(sent_at, id)`. The caller has already
    /// checked membership.
    fn message_feed(&self, chat_id: &Uuid, scope: MessageScope) -> Self::Feed;

    fn save_message(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a message if it belongs to a chat `user_id` is a member of.
    fn get_message_for_member(
        &self,
        message_id: &Uuid,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Message>, RepositoryError>> + Send;

    /// Replace a message's text. Returns `NotFound` if it does not exist.
    fn update_text(
        &self,
        message_id: &Uuid,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Returns `true` if the message existed.
    fn delete_message(
        &self,
        message_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
