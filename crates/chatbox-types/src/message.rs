//! Chat message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::OrderingKey;

/// A single message within a chat.
///
/// Messages are ordered by `(sent_at, id)`. `id` is a UUIDv7, so messages sent
/// within the same microsecond still have a stable tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    /// Author. `None` once the author's account has been deleted.
    pub user_id: Option<Uuid>,
    pub sent_at: DateTime<Utc>,
    pub text: String,
}

impl Message {
    /// The message feed ordering key.
    pub fn ordering_key(&self) -> OrderingKey {
        OrderingKey::new(self.sent_at, self.id)
    }
}

/// Request body for sending a message.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// Request body for editing a message.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditMessageRequest {
    pub text: String,
}
