//! SQLite message repository and the per-chat message feed.

use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use chatbox_core::pagination::{FeedSpec, OrderedCollectionProvider, RangeQuery};
use chatbox_core::repository::message::{MessageRepository, MessageScope};
use chatbox_types::config::PaginationConfig;
use chatbox_types::error::RepositoryError;
use chatbox_types::message::Message;
use chatbox_types::pagination::Item;

use super::pool::DatabasePool;
use super::range::push_range_query;
use super::{format_datetime, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `MessageRepository`.
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

pub(super) struct MessageRow {
    id: String,
    chat_id: String,
    user_id: Option<String>,
    sent_at: String,
    text: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            user_id: row.try_get("user_id")?,
            sent_at: row.try_get("sent_at")?,
            text: row.try_get("text")?,
        })
    }

    /// The last-message columns of a chat feed row (`lm_*`), if the chat has
    /// any message.
    pub(super) fn from_last_message(
        row: &sqlx::sqlite::SqliteRow,
        chat_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let id: Option<String> = row.try_get("lm_id")?;
        let Some(id) = id else {
            return Ok(None);
        };
        Ok(Some(Self {
            id,
            chat_id: chat_id.to_string(),
            user_id: row.try_get("lm_user_id")?,
            sent_at: row.try_get("lm_sent_at")?,
            text: row.try_get("lm_text")?,
        }))
    }

    pub(super) fn into_message(self) -> Result<Message, RepositoryError> {
        Ok(Message {
            id: parse_uuid(&self.id, "message id")?,
            chat_id: parse_uuid(&self.chat_id, "chat_id")?,
            user_id: self
                .user_id
                .as_deref()
                .map(|u| parse_uuid(u, "user_id"))
                .transpose()?,
            sent_at: parse_datetime(&self.sent_at)?,
            text: self.text,
        })
    }
}

const MESSAGE_COLUMNS: &str = "m.id, m.chat_id, m.user_id, m.sent_at, m.text";

// ---------------------------------------------------------------------------
// Message feed
// ---------------------------------------------------------------------------

/// Messages of one chat, optionally only those after a member's read position.
pub struct SqliteMessageFeed {
    pool: DatabasePool,
    chat_id: Uuid,
    scope: MessageScope,
    feed: FeedSpec,
}

impl SqliteMessageFeed {
    fn push_base(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(format!("SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.chat_id = "));
        qb.push_bind(self.chat_id.to_string());

        if let MessageScope::UnreadBy(user_id) = self.scope {
            qb.push(
                " AND (m.sent_at, m.id) > (SELECT ms.last_seen_message_at, ms.last_seen_message_id \
                 FROM memberships ms WHERE ms.chat_id = m.chat_id AND ms.user_id = ",
            );
            qb.push_bind(user_id.to_string());
            qb.push(")");
        }
    }
}

impl OrderedCollectionProvider for SqliteMessageFeed {
    type Item = Message;

    async fn fetch(&self, query: &RangeQuery) -> Result<Vec<Item<Message>>, RepositoryError> {
        let mut qb = QueryBuilder::new("");
        push_range_query(&mut qb, &self.feed, query, &|qb| self.push_base(qb));

        let rows = qb
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let message = MessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_message()?;
            items.push(Item::new(message.ordering_key(), message));
        }
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// MessageRepository implementation
// ---------------------------------------------------------------------------

impl MessageRepository for SqliteMessageRepository {
    type Feed = SqliteMessageFeed;

    fn message_feed(&self, chat_id: &Uuid, scope: MessageScope) -> SqliteMessageFeed {
        SqliteMessageFeed {
            pool: self.pool.clone(),
            chat_id: *chat_id,
            scope,
            // Only the key columns are read here; page sizes are the paginator's.
            feed: FeedSpec::messages(&PaginationConfig::default()),
        }
    }

    async fn save_message(&self, message: &Message) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO messages (id, chat_id, user_id, sent_at, text) VALUES (?, ?, ?, ?, ?)")
            .bind(message.id.to_string())
            .bind(message.chat_id.to_string())
            .bind(message.user_id.map(|u| u.to_string()))
            .bind(format_datetime(&message.sent_at))
            .bind(&message.text)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_message_for_member(
        &self,
        message_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages m
             JOIN memberships ms ON ms.chat_id = m.chat_id AND ms.user_id = ?
             WHERE m.id = ?"
        ))
        .bind(user_id.to_string())
        .bind(message_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let message_row = MessageRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(message_row.into_message()?))
            }
            None => Ok(None),
        }
    }

    async fn update_text(&self, message_id: &Uuid, text: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE messages SET text = ? WHERE id = ?")
            .bind(text)
            .bind(message_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_message(&self, message_id: &Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(message_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
