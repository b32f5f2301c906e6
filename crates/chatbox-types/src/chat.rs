//! Chat, membership, and admin role types.
//!
//! A chat is either *mutual* (exactly two peers) or a *group* with a name, a
//! creator, and optional admins holding a set of privileges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::message::Message;
use crate::pagination::OrderingKey;

/// Kind of chat.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (chat_type IN ('mutual', 'group'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Mutual,
    Group,
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatType::Mutual => write!(f, "mutual"),
            ChatType::Group => write!(f, "group"),
        }
    }
}

impl FromStr for ChatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mutual" => Ok(ChatType::Mutual),
            "group" => Ok(ChatType::Group),
            other => Err(format!("invalid chat type: '{other}'")),
        }
    }
}

/// Group-only chat attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub group_name: String,
    /// `None` once the creator's account has been deleted.
    pub creator_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub chat_type: ChatType,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupInfo>,
}

impl Chat {
    pub fn is_group(&self) -> bool {
        self.chat_type == ChatType::Group
    }

    /// Whether `user_id` created this (group) chat.
    pub fn is_creator(&self, user_id: &Uuid) -> bool {
        self.group
            .as_ref()
            .and_then(|g| g.creator_id.as_ref())
            .is_some_and(|c| c == user_id)
    }
}

/// A chat row annotated with its most recent message.
///
/// This is the payload of the chat-by-recency feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(flatten)]
    pub chat: Chat,
    pub last_message: Option<Message>,
}

impl ChatSummary {
    /// The chat feed ordering key.
    ///
    /// Falls back to `(created_at, chat id)` for a chat without messages.
    pub fn ordering_key(&self) -> OrderingKey {
        match &self.last_message {
            Some(message) => message.ordering_key(),
            None => OrderingKey::new(self.chat.created_at, self.chat.id),
        }
    }
}

/// A user's membership in a chat, including their read position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
    /// Key of the newest message this member has seen. Stored separately from
    /// the message itself so it survives message deletion.
    pub last_seen: OrderingKey,
}

/// Privileges a group admin may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPrivilege {
    AddMember,
    KickMember,
    DeleteMessage,
    ChangeGroupInfo,
}

impl fmt::Display for AdminPrivilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminPrivilege::AddMember => write!(f, "add_member"),
            AdminPrivilege::KickMember => write!(f, "kick_member"),
            AdminPrivilege::DeleteMessage => write!(f, "delete_message"),
            AdminPrivilege::ChangeGroupInfo => write!(f, "change_group_info"),
        }
    }
}

impl FromStr for AdminPrivilege {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add_member" => Ok(AdminPrivilege::AddMember),
            "kick_member" => Ok(AdminPrivilege::KickMember),
            "delete_message" => Ok(AdminPrivilege::DeleteMessage),
            "change_group_info" => Ok(AdminPrivilege::ChangeGroupInfo),
            other => Err(format!("invalid admin privilege: '{other}'")),
        }
    }
}

/// Admin role of a user within a group chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRole {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub privileges: Vec<AdminPrivilege>,
}

impl AdminRole {
    pub fn has(&self, privilege: AdminPrivilege) -> bool {
        self.privileges.contains(&privilege)
    }
}

/// Request body for creating a chat.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "chat_type", rename_all = "lowercase")]
pub enum CreateChatRequest {
    Mutual { peer_id: Uuid },
    Group { group_name: String },
}

/// Request body for updating a group chat.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateChatRequest {
    pub group_name: String,
}

/// Request body for adding a member to a group chat.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

/// Request body for granting a member admin privileges. An empty list
/// leaves the member without any.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SetAdminRoleRequest {
    pub privileges: Vec<AdminPrivilege>,
}

/// Request body for advancing a member's read position.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarkReadRequest {
    pub message_id: Uuid,
}
