//! Chat and message service.
//!
//! Every operation starts by looking the chat (or message) up through the
//! caller's memberships, so a chat the caller does not belong to is reported
//! as not found rather than forbidden. Mutations then consult the
//! [`access`](crate::access) decision table.

use chrono::{SubsecRound, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use chatbox_types::chat::{
    AdminPrivilege, AdminRole, Chat, ChatSummary, ChatType, GroupInfo, Membership,
};
use chatbox_types::config::{ChatboxConfig, LimitsConfig};
use chatbox_types::error::{ChatError, PaginationError, RepositoryError};
use chatbox_types::message::Message;
use chatbox_types::pagination::{OrderingKey, Page};
use chatbox_types::user::User;

use crate::access::{self, Action, Resource};
use crate::pagination::{FeedSpec, PaginationParams, Paginator, decode_cursor};
use crate::repository::chat::ChatRepository;
use crate::repository::message::{MessageRepository, MessageScope};
use crate::repository::user::UserRepository;

/// Service for chats, memberships, and messages.
///
/// Generic over the repository traits; chatbox-core never depends on
/// chatbox-infra.
pub struct ChatService<C: ChatRepository, M: MessageRepository, U: UserRepository> {
    chats: C,
    messages: M,
    users: U,
    chat_pages: Paginator,
    message_pages: Paginator,
    limits: LimitsConfig,
}

impl<C: ChatRepository, M: MessageRepository, U: UserRepository> ChatService<C, M, U> {
    pub fn new(chats: C, messages: M, users: U, config: &ChatboxConfig) -> Self {
        Self {
            chats,
            messages,
            users,
            chat_pages: Paginator::new(FeedSpec::chats(&config.pagination)),
            message_pages: Paginator::new(FeedSpec::messages(&config.pagination)),
            limits: config.limits.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Chats
    // -----------------------------------------------------------------------

    /// The caller's chats, most recently active first by default.
    pub async fn list_chats(
        &self,
        user: &User,
        params: &PaginationParams,
    ) -> Result<Page<ChatSummary>, ChatError> {
        let cursor =
            decode_cursor(params, self.chat_pages.feed()).map_err(PaginationError::from)?;
        let feed = self.chats.chat_feed(&user.id);
        Ok(self.chat_pages.fetch_page(&feed, &cursor).await?)
    }

    pub async fn get_chat(&self, user: &User, chat_id: &Uuid) -> Result<Chat, ChatError> {
        self.member_chat(user, chat_id).await
    }

    pub async fn create_mutual_chat(&self, creator: &User, peer_id: &Uuid) -> Result<Chat, ChatError> {
        if peer_id == &creator.id {
            return Err(ChatError::InvalidInput(
                "cannot start a mutual chat with yourself".to_string(),
            ));
        }
        self.users
            .get_user(peer_id)
            .await?
            .ok_or(ChatError::UserNotFound)?;

        let chat = Chat {
            id: Uuid::now_v7(),
            chat_type: ChatType::Mutual,
            created_at: now(),
            group: None,
        };
        self.chats.create_chat(&chat, &[creator.id, *peer_id]).await?;

        info!(chat_id = %chat.id, creator = %creator.id, peer = %peer_id, "Created mutual chat");
        Ok(chat)
    }

    pub async fn create_group_chat(&self, creator: &User, group_name: &str) -> Result<Chat, ChatError> {
        let group_name = self.validate_group_name(group_name)?;

        let chat = Chat {
            id: Uuid::now_v7(),
            chat_type: ChatType::Group,
            created_at: now(),
            group: Some(GroupInfo {
                group_name: group_name.to_string(),
                creator_id: Some(creator.id),
            }),
        };
        self.chats.create_chat(&chat, &[creator.id]).await?;

        info!(chat_id = %chat.id, creator = %creator.id, "Created group chat");
        Ok(chat)
    }

    pub async fn rename_group(
        &self,
        user: &User,
        chat_id: &Uuid,
        group_name: &str,
    ) -> Result<Chat, ChatError> {
        let mut chat = self.member_chat(user, chat_id).await?;
        if !chat.is_group() {
            return Err(ChatError::InvalidInput(
                "only group chats have a name".to_string(),
            ));
        }
        let group_name = self.validate_group_name(group_name)?;

        self.authorize_chat(&chat, user, Action::Update).await?;
        self.chats.rename_group(chat_id, group_name).await?;
        if let Some(group) = chat.group.as_mut() {
            group.group_name = group_name.to_string();
        }

        info!(chat_id = %chat_id, user_id = %user.id, "Renamed group chat");
        Ok(chat)
    }

    /// Leave a mutual chat (removing it once empty) or delete a group chat.
    pub async fn delete_chat(&self, user: &User, chat_id: &Uuid) -> Result<(), ChatError> {
        let chat = self.member_chat(user, chat_id).await?;
        self.authorize_chat(&chat, user, Action::Delete).await?;

        match chat.chat_type {
            ChatType::Mutual => {
                let remaining = self.chats.remove_member(chat_id, &user.id).await?;
                if remaining == 0 {
                    self.chats.delete_chat(chat_id).await?;
                    info!(chat_id = %chat_id, "Deleted empty mutual chat");
                } else {
                    info!(chat_id = %chat_id, user_id = %user.id, "Left mutual chat");
                }
            }
            ChatType::Group => {
                self.chats.delete_chat(chat_id).await?;
                info!(chat_id = %chat_id, user_id = %user.id, "Deleted group chat");
            }
        }
        Ok(())
    }

    pub async fn add_member(
        &self,
        user: &User,
        chat_id: &Uuid,
        new_member: &Uuid,
    ) -> Result<Membership, ChatError> {
        let chat = self.member_chat(user, chat_id).await?;
        if !chat.is_group() {
            return Err(ChatError::InvalidInput(
                "members can only be added to group chats".to_string(),
            ));
        }
        self.authorize_chat(&chat, user, Action::AddMember).await?;
        self.users
            .get_user(new_member)
            .await?
            .ok_or(ChatError::UserNotFound)?;

        let joined_at = now();
        let membership = Membership {
            chat_id: *chat_id,
            user_id: *new_member,
            joined_at,
            // History from before joining counts as read.
            last_seen: OrderingKey::new(joined_at, Uuid::nil()),
        };
        self.chats.add_member(&membership).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                ChatError::Conflict(format!("user {new_member} is already a member"))
            }
            other => ChatError::Storage(other),
        })?;

        info!(chat_id = %chat_id, user_id = %new_member, added_by = %user.id, "Added member");
        Ok(membership)
    }

    /// Replace the admin privileges of a group member. Only the group's
    /// creator may do this, and the creator cannot be made an admin.
    pub async fn set_admin_role(
        &self,
        user: &User,
        chat_id: &Uuid,
        member_id: &Uuid,
        privileges: &[AdminPrivilege],
    ) -> Result<AdminRole, ChatError> {
        let chat = self.member_chat(user, chat_id).await?;
        if !chat.is_group() {
            return Err(ChatError::InvalidInput(
                "admins exist only in group chats".to_string(),
            ));
        }
        self.authorize_chat(&chat, user, Action::ManageAdmins).await?;
        if chat.is_creator(member_id) {
            return Err(ChatError::InvalidInput(
                "the group creator cannot be given an admin role".to_string(),
            ));
        }
        self.chats
            .get_membership(chat_id, member_id)
            .await?
            .ok_or(ChatError::UserNotFound)?;

        let mut privileges = privileges.to_vec();
        privileges.sort();
        privileges.dedup();
        let role = AdminRole {
            chat_id: *chat_id,
            user_id: *member_id,
            privileges,
        };
        self.chats.set_admin_role(&role).await?;

        info!(
            chat_id = %chat_id,
            user_id = %member_id,
            granted_by = %user.id,
            privileges = ?role.privileges,
            "Set admin role"
        );
        Ok(role)
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    /// Messages of a chat the caller belongs to, newest first by default.
    ///
    /// With `unread` only messages after the caller's read position are listed.
    /// Malformed parameters are reported before the chat is looked up.
    pub async fn list_messages(
        &self,
        user: &User,
        chat_id: &Uuid,
        params: &PaginationParams,
        unread: bool,
    ) -> Result<Page<Message>, ChatError> {
        let cursor =
            decode_cursor(params, self.message_pages.feed()).map_err(PaginationError::from)?;
        self.member_chat(user, chat_id).await?;
        let scope = if unread {
            MessageScope::UnreadBy(user.id)
        } else {
            MessageScope::All
        };
        let feed = self.messages.message_feed(chat_id, scope);
        Ok(self.message_pages.fetch_page(&feed, &cursor).await?)
    }

    pub async fn send_message(&self, user: &User, chat_id: &Uuid, text: &str) -> Result<Message, ChatError> {
        self.member_chat(user, chat_id).await?;
        let text = self.validate_text(text)?;

        let message = Message {
            id: Uuid::now_v7(),
            chat_id: *chat_id,
            user_id: Some(user.id),
            sent_at: now(),
            text: text.to_string(),
        };
        self.messages.save_message(&message).await?;

        debug!(message_id = %message.id, chat_id = %chat_id, user_id = %user.id, "Sent message");
        Ok(message)
    }

    pub async fn get_message(&self, user: &User, message_id: &Uuid) -> Result<Message, ChatError> {
        self.messages
            .get_message_for_member(message_id, &user.id)
            .await?
            .ok_or(ChatError::MessageNotFound)
    }

    pub async fn edit_message(
        &self,
        user: &User,
        message_id: &Uuid,
        text: &str,
    ) -> Result<Message, ChatError> {
        let mut message = self.get_message(user, message_id).await?;
        let text = self.validate_text(text)?;
        self.authorize_message(&message, user, Action::Update).await?;

        self.messages.update_text(message_id, text).await?;
        message.text = text.to_string();

        info!(message_id = %message_id, user_id = %user.id, "Edited message");
        Ok(message)
    }

    pub async fn delete_message(&self, user: &User, message_id: &Uuid) -> Result<(), ChatError> {
        let message = self.get_message(user, message_id).await?;
        self.authorize_message(&message, user, Action::Delete).await?;

        self.messages.delete_message(message_id).await?;

        info!(message_id = %message_id, chat_id = %message.chat_id, user_id = %user.id, "Deleted message");
        Ok(())
    }

    /// Advance the caller's read position in a chat to `message_id`.
    ///
    /// The position never moves backwards; the returned key is the position
    /// after the call.
    pub async fn mark_read(
        &self,
        user: &User,
        chat_id: &Uuid,
        message_id: &Uuid,
    ) -> Result<OrderingKey, ChatError> {
        self.member_chat(user, chat_id).await?;
        let message = self.get_message(user, message_id).await?;
        if &message.chat_id != chat_id {
            return Err(ChatError::MessageNotFound);
        }

        let seen = self
            .chats
            .advance_last_seen(chat_id, &user.id, &message.ordering_key())
            .await?;

        debug!(chat_id = %chat_id, user_id = %user.id, "Marked messages read");
        Ok(seen)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn member_chat(&self, user: &User, chat_id: &Uuid) -> Result<Chat, ChatError> {
        self.chats
            .get_chat_for_member(chat_id, &user.id)
            .await?
            .ok_or(ChatError::NotFound)
    }

    async fn authorize_chat(&self, chat: &Chat, user: &User, action: Action) -> Result<(), ChatError> {
        let admin = self.admin_role_of(chat, &user.id).await?;
        let role = access::chat_role(chat, &user.id, admin.as_ref());

        if access::decide(role, Resource::Chat, action).is_allowed() {
            Ok(())
        } else {
            debug!(chat_id = %chat.id, user_id = %user.id, ?action, "Denied chat action");
            Err(ChatError::Forbidden(format!(
                "you may not {} this chat",
                action_verb(action)
            )))
        }
    }

    async fn authorize_message(
        &self,
        message: &Message,
        user: &User,
        action: Action,
    ) -> Result<(), ChatError> {
        let chat = self
            .chats
            .get_chat_for_member(&message.chat_id, &user.id)
            .await?
            .ok_or(ChatError::MessageNotFound)?;

        let actor_admin = self.admin_role_of(&chat, &user.id).await?;
        let author_admin = match message.user_id {
            Some(author) if author != user.id => self.admin_role_of(&chat, &author).await?,
            _ => None,
        };

        let role = access::chat_role(&chat, &user.id, actor_admin.as_ref());
        let resource = access::message_resource(&chat, message, &user.id, author_admin.as_ref());

        if access::decide(role, resource, action).is_allowed() {
            Ok(())
        } else {
            debug!(message_id = %message.id, user_id = %user.id, ?action, "Denied message action");
            Err(ChatError::Forbidden(format!(
                "you may not {} this message",
                action_verb(action)
            )))
        }
    }

    async fn admin_role_of(
        &self,
        chat: &Chat,
        user_id: &Uuid,
    ) -> Result<Option<AdminRole>, ChatError> {
        if !chat.is_group() {
            return Ok(None);
        }
        Ok(self.chats.get_admin_role(&chat.id, user_id).await?)
    }

    fn validate_group_name<'a>(&self, raw: &'a str) -> Result<&'a str, ChatError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ChatError::InvalidInput("group name cannot be empty".to_string()));
        }
        let max = self.limits.group_name_max_length;
        if name.chars().count() > max {
            return Err(ChatError::InvalidInput(format!(
                "group name must be at most {max} characters"
            )));
        }
        Ok(name)
    }

    fn validate_text<'a>(&self, text: &'a str) -> Result<&'a str, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::InvalidInput("message text cannot be empty".to_string()));
        }
        let max = self.limits.message_text_max_length;
        if text.chars().count() > max {
            return Err(ChatError::InvalidInput(format!(
                "message text must be at most {max} characters"
            )));
        }
        Ok(text)
    }
}

/// Current time at the precision stored for ordering keys.
fn now() -> chrono::DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn action_verb(action: Action) -> &'static str {
    match action {
        Action::Read => "read",
        Action::Update => "update",
        Action::Delete => "delete",
        Action::AddMember => "add members to",
        Action::ManageAdmins => "manage admins of",
    }
}
