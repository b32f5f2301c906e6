//! Per-feed pagination settings.

use chatbox_types::config::{PageSizeConfig, PaginationConfig};

/// Static description of a paginated feed.
///
/// `timestamp_field` and `id_field` name the two columns of the feed's
/// projected row that form its ordering key. Store adapters filter and sort on
/// exactly these columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSpec {
    pub name: &'static str,
    pub timestamp_field: &'static str,
    pub id_field: &'static str,
    pub default_limit: u32,
    pub max_limit: u32,
}

impl FeedSpec {
    /// Messages within one chat, keyed by `(sent_at, id)`.
    pub fn messages(config: &PaginationConfig) -> Self {
        Self::with_sizes("messages", "sent_at", "id", &config.messages)
    }

    /// Chats ordered by their most recent message.
    ///
    /// The key columns are produced by the last-message aggregation, which
    /// falls back to the chat's own `(created_at, id)` when it has no messages.
    pub fn chats(config: &PaginationConfig) -> Self {
        Self::with_sizes("chats", "activity_at", "activity_id", &config.chats)
    }

    fn with_sizes(
        name: &'static str,
        timestamp_field: &'static str,
        id_field: &'static str,
        sizes: &PageSizeConfig,
    ) -> Self {
        Self {
            name,
            timestamp_field,
            id_field,
            default_limit: sizes.default_page_size,
            max_limit: sizes.max_page_size,
        }
    }
}
