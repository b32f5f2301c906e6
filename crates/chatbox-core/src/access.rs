//! Authorization rules for chats and messages.
//!
//! Rules are a pure decision table: the service resolves the caller's
//! [`ActorRole`] and the target [`Resource`] from stored facts, then asks
//! [`decide`]. Membership is checked earlier, when the chat or message is
//! looked up through the caller's own chats, so every role here belongs to a
//! member.

use uuid::Uuid;

use chatbox_types::chat::{AdminPrivilege, AdminRole, Chat, ChatType};
use chatbox_types::message::Message;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
    AddMember,
    /// Grant, change, or revoke admin privileges. Creator only.
    ManageAdmins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// Compact set of [`AdminPrivilege`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrivilegeSet(u8);

impl PrivilegeSet {
    fn bit(privilege: AdminPrivilege) -> u8 {
        match privilege {
            AdminPrivilege::AddMember => 1,
            AdminPrivilege::KickMember => 1 << 1,
            AdminPrivilege::DeleteMessage => 1 << 2,
            AdminPrivilege::ChangeGroupInfo => 1 << 3,
        }
    }

    pub fn contains(self, privilege: AdminPrivilege) -> bool {
        self.0 & Self::bit(privilege) != 0
    }

    pub fn with(self, privilege: AdminPrivilege) -> Self {
        Self(self.0 | Self::bit(privilege))
    }
}

impl FromIterator<AdminPrivilege> for PrivilegeSet {
    fn from_iter<I: IntoIterator<Item = AdminPrivilege>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::with)
    }
}

impl From<&AdminRole> for PrivilegeSet {
    fn from(role: &AdminRole) -> Self {
        role.privileges.iter().copied().collect()
    }
}

/// What the caller is within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    MutualPeer,
    GroupCreator,
    GroupAdmin(PrivilegeSet),
    GroupMember,
}

/// How the author of a message stands in its chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorStanding {
    /// The group's creator.
    Creator,
    /// An admin who may delete messages themselves.
    DeletingAdmin,
    /// Anyone else, including a deleted account.
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Chat,
    Message {
        own: bool,
        author: AuthorStanding,
    },
}

// ---------------------------------------------------------------------------
// Decision table
// ---------------------------------------------------------------------------

pub fn decide(role: ActorRole, resource: Resource, action: Action) -> Decision {
    use Decision::{Allow, Deny};

    if action == Action::Read {
        return Allow;
    }

    match resource {
        Resource::Chat => match (role, action) {
            (ActorRole::MutualPeer, Action::Update | Action::Delete) => Allow,
            (ActorRole::GroupCreator, _) => Allow,
            (ActorRole::GroupAdmin(p), Action::Update)
                if p.contains(AdminPrivilege::ChangeGroupInfo) =>
            {
                Allow
            }
            (ActorRole::GroupAdmin(p), Action::AddMember)
                if p.contains(AdminPrivilege::AddMember) =>
            {
                Allow
            }
            _ => Deny,
        },
        Resource::Message { own: true, .. } => match action {
            Action::Update | Action::Delete => Allow,
            _ => Deny,
        },
        Resource::Message { own: false, author } => match (action, author, role) {
            (Action::Delete, AuthorStanding::Creator, _) => Deny,
            (Action::Delete, _, ActorRole::GroupCreator) => Allow,
            (Action::Delete, AuthorStanding::Regular, ActorRole::GroupAdmin(p))
                if p.contains(AdminPrivilege::DeleteMessage) =>
            {
                Allow
            }
            _ => Deny,
        },
    }
}

// ---------------------------------------------------------------------------
// Role resolution
// ---------------------------------------------------------------------------

/// Resolve the caller's role. `admin` is the caller's admin role in `chat`, if any.
pub fn chat_role(chat: &Chat, user_id: &Uuid, admin: Option<&AdminRole>) -> ActorRole {
    match chat.chat_type {
        ChatType::Mutual => ActorRole::MutualPeer,
        ChatType::Group if chat.is_creator(user_id) => ActorRole::GroupCreator,
        ChatType::Group => match admin {
            Some(role) => ActorRole::GroupAdmin(role.into()),
            None => ActorRole::GroupMember,
        },
    }
}

/// Resolve a message author's standing. `author_admin` is the author's admin
/// role in `chat`, if any.
pub fn author_standing(
    chat: &Chat,
    author: Option<&Uuid>,
    author_admin: Option<&AdminRole>,
) -> AuthorStanding {
    let Some(author) = author else {
        return AuthorStanding::Regular;
    };
    if chat.is_creator(author) {
        AuthorStanding::Creator
    } else if author_admin.is_some_and(|role| role.has(AdminPrivilege::DeleteMessage)) {
        AuthorStanding::DeletingAdmin
    } else {
        AuthorStanding::Regular
    }
}

pub fn message_resource(
    chat: &Chat,
    message: &Message,
    actor: &Uuid,
    author_admin: Option<&AdminRole>,
) -> Resource {
    Resource::Message {
        own: message.user_id.as_ref() == Some(actor),
        author: author_standing(chat, message.user_id.as_ref(), author_admin),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
