//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `chatbox-core`: chats with their group
//! info, memberships with read positions, admin roles, and the per-user chat
//! feed ordered by last message.

use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use chatbox_core::pagination::{FeedSpec, OrderedCollectionProvider, RangeQuery};
use chatbox_core::repository::chat::ChatRepository;
use chatbox_types::chat::{AdminPrivilege, AdminRole, Chat, ChatSummary, GroupInfo, Membership};
use chatbox_types::config::PaginationConfig;
use chatbox_types::error::RepositoryError;
use chatbox_types::pagination::{Item, OrderingKey};

use super::message::MessageRow;
use super::pool::DatabasePool;
use super::range::push_range_query;
use super::{format_datetime, parse_datetime, parse_uuid, write_error};

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: String,
    chat_type: String,
    created_at: String,
    group_name: Option<String>,
    creator_id: Option<String>,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_type: row.try_get("chat_type")?,
            created_at: row.try_get("created_at")?,
            group_name: row.try_get("group_name")?,
            creator_id: row.try_get("creator_id")?,
        })
    }

    fn into_chat(self) -> Result<Chat, RepositoryError> {
        let chat_type = self
            .chat_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let group = match self.group_name {
            Some(group_name) => Some(GroupInfo {
                group_name,
                creator_id: self
                    .creator_id
                    .as_deref()
                    .map(|c| parse_uuid(c, "creator_id"))
                    .transpose()?,
            }),
            None => None,
        };

        Ok(Chat {
            id: parse_uuid(&self.id, "chat id")?,
            chat_type,
            created_at: parse_datetime(&self.created_at)?,
            group,
        })
    }
}

struct MembershipRow {
    chat_id: String,
    user_id: String,
    joined_at: String,
    last_seen_message_at: String,
    last_seen_message_id: String,
}

impl MembershipRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            user_id: row.try_get("user_id")?,
            joined_at: row.try_get("joined_at")?,
            last_seen_message_at: row.try_get("last_seen_message_at")?,
            last_seen_message_id: row.try_get("last_seen_message_id")?,
        })
    }

    fn into_membership(self) -> Result<Membership, RepositoryError> {
        Ok(Membership {
            chat_id: parse_uuid(&self.chat_id, "chat_id")?,
            user_id: parse_uuid(&self.user_id, "user_id")?,
            joined_at: parse_datetime(&self.joined_at)?,
            last_seen: OrderingKey::new(
                parse_datetime(&self.last_seen_message_at)?,
                parse_uuid(&self.last_seen_message_id, "last_seen_message_id")?,
            ),
        })
    }
}

const CHAT_COLUMNS: &str = "c.id, c.chat_type, c.created_at, g.group_name, g.creator_id";

// ---------------------------------------------------------------------------
// Chat feed
// ---------------------------------------------------------------------------

/// The chats of one user, each joined with its most recent message.
///
/// `activity_at`/`activity_id` are the last message's key, or the chat's own
/// `(created_at, id)` when it has no messages yet.
pub struct SqliteChatFeed {
    pool: DatabasePool,
    user_id: Uuid,
    feed: FeedSpec,
}

impl SqliteChatFeed {
    fn push_base(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(format!(
            "SELECT {CHAT_COLUMNS},
                    lm.id AS lm_id, lm.user_id AS lm_user_id,
                    lm.sent_at AS lm_sent_at, lm.text AS lm_text,
                    COALESCE(lm.sent_at, c.created_at) AS activity_at,
                    COALESCE(lm.id, c.id) AS activity_id
             FROM chats c
             JOIN memberships ms ON ms.chat_id = c.id AND ms.user_id = "
        ));
        qb.push_bind(self.user_id.to_string());
        qb.push(
            " LEFT JOIN group_chat_info g ON g.chat_id = c.id
             LEFT JOIN messages lm ON lm.id = (
                 SELECT m.id FROM messages m WHERE m.chat_id = c.id
                 ORDER BY m.sent_at DESC, m.id DESC LIMIT 1)",
        );
    }
}

impl OrderedCollectionProvider for SqliteChatFeed {
    type Item = ChatSummary;

    async fn fetch(&self, query: &RangeQuery) -> Result<Vec<Item<ChatSummary>>, RepositoryError> {
        let mut qb = QueryBuilder::new("");
        push_range_query(&mut qb, &self.feed, query, &|qb| self.push_base(qb));

        let rows = qb
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row = ChatRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            let last_message = MessageRow::from_last_message(row, &chat_row.id)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .map(MessageRow::into_message)
                .transpose()?;
            let summary = ChatSummary {
                chat: chat_row.into_chat()?,
                last_message,
            };
            items.push(Item::new(summary.ordering_key(), summary));
        }
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    type Feed = SqliteChatFeed;

    fn chat_feed(&self, user_id: &Uuid) -> SqliteChatFeed {
        SqliteChatFeed {
            pool: self.pool.clone(),
            user_id: *user_id,
            feed: FeedSpec::chats(&PaginationConfig::default()),
        }
    }

    async fn create_chat(&self, chat: &Chat, members: &[Uuid]) -> Result<(), RepositoryError> {
        let created_at = format_datetime(&chat.created_at);
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query("INSERT INTO chats (id, chat_type, created_at) VALUES (?, ?, ?)")
            .bind(chat.id.to_string())
            .bind(chat.chat_type.to_string())
            .bind(&created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, || format!("chat {} already exists", chat.id)))?;

        if let Some(group) = &chat.group {
            sqlx::query("INSERT INTO group_chat_info (chat_id, group_name, creator_id) VALUES (?, ?, ?)")
                .bind(chat.id.to_string())
                .bind(&group.group_name)
                .bind(group.creator_id.map(|c| c.to_string()))
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        for member in members {
            sqlx::query(
                "INSERT INTO memberships (chat_id, user_id, joined_at, last_seen_message_at)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(chat.id.to_string())
            .bind(member.to_string())
            .bind(&created_at)
            .bind(&created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, || format!("duplicate member {member}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_chat_for_member(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats c
             JOIN memberships ms ON ms.chat_id = c.id AND ms.user_id = ?
             LEFT JOIN group_chat_info g ON g.chat_id = c.id
             WHERE c.id = ?"
        ))
        .bind(user_id.to_string())
        .bind(chat_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let chat_row =
                    ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(chat_row.into_chat()?))
            }
            None => Ok(None),
        }
    }

    async fn rename_group(&self, chat_id: &Uuid, group_name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE group_chat_info SET group_name = ? WHERE chat_id = ?")
            .bind(group_name)
            .bind(chat_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_chat(&self, chat_id: &Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(chat_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_membership(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<Membership>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM memberships WHERE chat_id = ? AND user_id = ?")
            .bind(chat_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let membership_row = MembershipRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(membership_row.into_membership()?))
            }
            None => Ok(None),
        }
    }

    async fn add_member(&self, membership: &Membership) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO memberships (chat_id, user_id, joined_at, last_seen_message_at, last_seen_message_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(membership.chat_id.to_string())
        .bind(membership.user_id.to_string())
        .bind(format_datetime(&membership.joined_at))
        .bind(format_datetime(&membership.last_seen.timestamp))
        .bind(membership.last_seen.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            write_error(e, || {
                format!(
                    "user {} is already a member of chat {}",
                    membership.user_id, membership.chat_id
                )
            })
        })?;

        Ok(())
    }

    async fn remove_member(&self, chat_id: &Uuid, user_id: &Uuid) -> Result<u64, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query("DELETE FROM memberships WHERE chat_id = ? AND user_id = ?")
            .bind(chat_id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let (remaining,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM memberships WHERE chat_id = ?")
                .bind(chat_id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(remaining as u64)
    }

    async fn advance_last_seen(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
        seen: &OrderingKey,
    ) -> Result<OrderingKey, RepositoryError> {
        let seen_at = format_datetime(&seen.timestamp);
        let seen_id = seen.id.to_string();

        sqlx::query(
            "UPDATE memberships SET last_seen_message_at = ?, last_seen_message_id = ?
             WHERE chat_id = ? AND user_id = ?
               AND (last_seen_message_at, last_seen_message_id) < (?, ?)",
        )
        .bind(&seen_at)
        .bind(&seen_id)
        .bind(chat_id.to_string())
        .bind(user_id.to_string())
        .bind(&seen_at)
        .bind(&seen_id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Read back on the writer so the result reflects the update above.
        let row = sqlx::query("SELECT * FROM memberships WHERE chat_id = ? AND user_id = ?")
            .bind(chat_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        let membership = MembershipRow::from_row(&row)
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .into_membership()?;
        Ok(membership.last_seen)
    }

    async fn get_admin_role(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<AdminRole>, RepositoryError> {
        let row = sqlx::query("SELECT privileges FROM admin_roles WHERE chat_id = ? AND user_id = ?")
            .bind(chat_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let privileges: String = row
            .try_get("privileges")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let privileges: Vec<AdminPrivilege> = serde_json::from_str(&privileges)
            .map_err(|e| RepositoryError::Query(format!("invalid privileges: {e}")))?;

        Ok(Some(AdminRole {
            chat_id: *chat_id,
            user_id: *user_id,
            privileges,
        }))
    }

    async fn set_admin_role(&self, role: &AdminRole) -> Result<(), RepositoryError> {
        let privileges = serde_json::to_string(&role.privileges)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO admin_roles (chat_id, user_id, privileges) VALUES (?, ?, ?)
             ON CONFLICT (chat_id, user_id) DO UPDATE SET privileges = excluded.privileges",
        )
        .bind(role.chat_id.to_string())
        .bind(role.user_id.to_string())
        .bind(privileges)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
