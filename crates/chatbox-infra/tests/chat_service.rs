//! End-to-end tests of `ChatService` over the SQLite adapters.

use chatbox_core::pagination::{PaginationParams, build_links};
use chatbox_core::service::chat::ChatService;
use chatbox_core::service::user::UserService;
use chatbox_infra::crypto::hash::Sha256KeyHasher;
use chatbox_infra::sqlite::chat::SqliteChatRepository;
use chatbox_infra::sqlite::message::SqliteMessageRepository;
use chatbox_infra::sqlite::pool::DatabasePool;
use chatbox_infra::sqlite::user::SqliteUserRepository;
use chatbox_types::chat::AdminPrivilege;
use chatbox_types::config::ChatboxConfig;
use chatbox_types::error::{ChatError, PaginationError, ValidationError};
use chatbox_types::user::User;
use url::Url;
use uuid::Uuid;

type Service = ChatService<SqliteChatRepository, SqliteMessageRepository, SqliteUserRepository>;

struct Harness {
    pool: DatabasePool,
    chats: Service,
    users: UserService<SqliteUserRepository, Sha256KeyHasher>,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    // Leak tempdir so it lives for the test
    std::mem::forget(dir);
    let pool = DatabasePool::new(&url).await.unwrap();

    Harness {
        chats: ChatService::new(
            SqliteChatRepository::new(pool.clone()),
            SqliteMessageRepository::new(pool.clone()),
            SqliteUserRepository::new(pool.clone()),
            &ChatboxConfig::default(),
        ),
        users: UserService::new(SqliteUserRepository::new(pool.clone()), Sha256KeyHasher),
        pool,
    }
}

impl Harness {
    async fn user(&self, name: &str) -> User {
        self.users.create_user(name).await.unwrap().user
    }

    async fn grant(
        &self,
        creator: &User,
        chat_id: Uuid,
        user: &User,
        privileges: &[AdminPrivilege],
    ) {
        self.chats
            .set_admin_role(creator, &chat_id, &user.id, privileges)
            .await
            .unwrap();
    }
}

fn params(pairs: &[(&str, &str)]) -> PaginationParams {
    let mut params = PaginationParams::default();
    for (name, value) in pairs {
        let value = Some(value.to_string());
        match *name {
            "reverse" => params.reverse = value,
            "offset_datetime" => params.offset_datetime = value,
            "offset_id" => params.offset_id = value,
            "limit" => params.limit = value,
            other => panic!("unknown param {other}"),
        }
    }
    params
}

/// Pagination parameters carried by a link.
fn follow(link: &str) -> PaginationParams {
    let url = Url::parse(link).unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let borrowed: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    params(&borrowed)
}

#[tokio::test]
async fn test_message_feed_walks_both_directions_through_links() {
    let h = harness().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let chat = h.chats.create_mutual_chat(&alice, &bob.id).await.unwrap();

    for i in 0..7 {
        let author = if i % 2 == 0 { &alice } else { &bob };
        h.chats.send_message(author, &chat.id, &format!("m{i}")).await.unwrap();
    }

    let base = Url::parse(&format!("http://localhost/api/v1/chats/{}/messages?limit=3", chat.id)).unwrap();

    // Older pages: newest first, every message exactly once.
    let mut seen = Vec::new();
    let mut page_params = params(&[("limit", "3")]);
    let mut last_newer = None;
    loop {
        let page = h.chats.list_messages(&bob, &chat.id, &page_params, false).await.unwrap();
        if page.is_empty() {
            break;
        }
        seen.extend(page.items.iter().map(|m| m.text.clone()));
        let links = build_links(&base, &page);
        assert!(links.newer.as_ref().unwrap().contains("limit=3"));
        last_newer = links.newer;
        page_params = follow(&links.older.unwrap());
    }
    let expected: Vec<String> = (0..7).rev().map(|i| format!("m{i}")).collect();
    assert_eq!(seen, expected);

    // Newer pages from the oldest page: ascending, skipping the cursor row.
    let mut seen = Vec::new();
    let mut page_params = follow(&last_newer.unwrap());
    loop {
        let page = h.chats.list_messages(&bob, &chat.id, &page_params, false).await.unwrap();
        if page.is_empty() {
            break;
        }
        seen.extend(page.items.iter().map(|m| m.text.clone()));
        page_params = follow(&build_links(&base, &page).newer.unwrap());
    }
    let expected: Vec<String> = (1..7).map(|i| format!("m{i}")).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_chat_feed_orders_by_recent_activity() {
    let h = harness().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;

    let first = h.chats.create_group_chat(&alice, "first").await.unwrap();
    let second = h.chats.create_group_chat(&alice, "second").await.unwrap();
    let mutual = h.chats.create_mutual_chat(&alice, &bob.id).await.unwrap();

    h.chats.send_message(&alice, &first.id, "bump").await.unwrap();

    let page = h.chats.list_chats(&alice, &PaginationParams::default()).await.unwrap();
    let ids: Vec<Uuid> = page.items.iter().map(|s| s.chat.id).collect();
    assert_eq!(ids, vec![first.id, mutual.id, second.id]);
    assert_eq!(page.items[0].last_message.as_ref().unwrap().text, "bump");
    assert!(page.items[1].last_message.is_none());

    let bobs = h.chats.list_chats(&bob, &PaginationParams::default()).await.unwrap();
    assert_eq!(bobs.items.len(), 1);
}

#[tokio::test]
async fn test_invalid_pagination_is_rejected() {
    let h = harness().await;
    let alice = h.user("alice").await;
    let chat = h.chats.create_group_chat(&alice, "g").await.unwrap();

    let err = h
        .chats
        .list_messages(&alice, &chat.id, &params(&[("limit", "201")]), false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChatError::Pagination(PaginationError::Validation(ValidationError::LimitOutOfRange { .. }))
    ));

    let err = h
        .chats
        .list_chats(&alice, &params(&[("offset_datetime", "1700000000")]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChatError::Pagination(PaginationError::Validation(ValidationError::IncompleteCursor))
    ));
}

#[tokio::test]
async fn test_invalid_pagination_is_rejected_before_membership() {
    let h = harness().await;
    let alice = h.user("alice").await;
    let eve = h.user("eve").await;
    let chat = h.chats.create_group_chat(&alice, "private").await.unwrap();

    let err = h
        .chats
        .list_messages(&eve, &chat.id, &params(&[("limit", "0")]), false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChatError::Pagination(PaginationError::Validation(ValidationError::LimitOutOfRange { .. }))
    ));

    let err = h
        .chats
        .list_messages(&eve, &Uuid::now_v7(), &params(&[("offset_id", "x")]), false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChatError::Pagination(PaginationError::Validation(ValidationError::IncompleteCursor))
    ));
}

#[tokio::test]
async fn test_non_members_see_not_found() {
    let h = harness().await;
    let alice = h.user("alice").await;
    let eve = h.user("eve").await;
    let chat = h.chats.create_group_chat(&alice, "private").await.unwrap();
    let msg = h.chats.send_message(&alice, &chat.id, "secret").await.unwrap();

    assert!(matches!(h.chats.get_chat(&eve, &chat.id).await, Err(ChatError::NotFound)));
    assert!(matches!(
        h.chats.list_messages(&eve, &chat.id, &PaginationParams::default(), false).await,
        Err(ChatError::NotFound)
    ));
    assert!(matches!(
        h.chats.get_message(&eve, &msg.id).await,
        Err(ChatError::MessageNotFound)
    ));
    assert!(matches!(
        h.chats.delete_message(&eve, &msg.id).await,
        Err(ChatError::MessageNotFound)
    ));
}

#[tokio::test]
async fn test_group_permissions() {
    let h = harness().await;
    let owner = h.user("owner").await;
    let admin = h.user("admin").await;
    let member = h.user("member").await;
    let late = h.user("late").await;

    let chat = h.chats.create_group_chat(&owner, "team").await.unwrap();
    h.chats.add_member(&owner, &chat.id, &admin.id).await.unwrap();
    h.chats.add_member(&owner, &chat.id, &member.id).await.unwrap();
    h.grant(
        &owner,
        chat.id,
        &admin,
        &[AdminPrivilege::ChangeGroupInfo, AdminPrivilege::DeleteMessage],
    )
    .await;

    // Renaming: creator and info admins only.
    assert!(matches!(
        h.chats.rename_group(&member, &chat.id, "mine").await,
        Err(ChatError::Forbidden(_))
    ));
    let renamed = h.chats.rename_group(&admin, &chat.id, "renamed").await.unwrap();
    assert_eq!(renamed.group.unwrap().group_name, "renamed");

    // Adding members needs the add_member privilege.
    assert!(matches!(
        h.chats.add_member(&admin, &chat.id, &late.id).await,
        Err(ChatError::Forbidden(_))
    ));
    assert!(matches!(
        h.chats.add_member(&owner, &chat.id, &admin.id).await,
        Err(ChatError::Conflict(_))
    ));

    // Message moderation.
    let by_member = h.chats.send_message(&member, &chat.id, "hi").await.unwrap();
    let by_owner = h.chats.send_message(&owner, &chat.id, "welcome").await.unwrap();
    let by_admin = h.chats.send_message(&admin, &chat.id, "rules").await.unwrap();

    assert!(matches!(
        h.chats.edit_message(&admin, &by_member.id, "edited").await,
        Err(ChatError::Forbidden(_))
    ));
    assert!(matches!(
        h.chats.delete_message(&admin, &by_owner.id).await,
        Err(ChatError::Forbidden(_))
    ));
    assert!(matches!(
        h.chats.delete_message(&member, &by_admin.id).await,
        Err(ChatError::Forbidden(_))
    ));
    h.chats.delete_message(&admin, &by_member.id).await.unwrap();
    h.chats.delete_message(&owner, &by_admin.id).await.unwrap();

    let edited = h.chats.edit_message(&owner, &by_owner.id, "hello all").await.unwrap();
    assert_eq!(edited.text, "hello all");

    // Only the creator deletes the group.
    assert!(matches!(
        h.chats.delete_chat(&admin, &chat.id).await,
        Err(ChatError::Forbidden(_))
    ));
    h.chats.delete_chat(&owner, &chat.id).await.unwrap();
    assert!(matches!(h.chats.get_chat(&owner, &chat.id).await, Err(ChatError::NotFound)));
}

#[tokio::test]
async fn test_creator_grants_admin_roles() {
    let h = harness().await;
    let owner = h.user("owner").await;
    let moderator = h.user("moderator").await;
    let member = h.user("member").await;
    let outsider = h.user("outsider").await;

    let chat = h.chats.create_group_chat(&owner, "team").await.unwrap();
    h.chats.add_member(&owner, &chat.id, &moderator.id).await.unwrap();
    h.chats.add_member(&owner, &chat.id, &member.id).await.unwrap();
    let by_member = h.chats.send_message(&member, &chat.id, "spam").await.unwrap();

    // Without a role the moderator cannot delete, and cannot grant one to themselves.
    assert!(matches!(
        h.chats.delete_message(&moderator, &by_member.id).await,
        Err(ChatError::Forbidden(_))
    ));
    assert!(matches!(
        h.chats
            .set_admin_role(&moderator, &chat.id, &moderator.id, &[AdminPrivilege::DeleteMessage])
            .await,
        Err(ChatError::Forbidden(_))
    ));

    let role = h
        .chats
        .set_admin_role(
            &owner,
            &chat.id,
            &moderator.id,
            &[
                AdminPrivilege::DeleteMessage,
                AdminPrivilege::AddMember,
                AdminPrivilege::DeleteMessage,
            ],
        )
        .await
        .unwrap();
    assert_eq!(role.user_id, moderator.id);
    assert_eq!(role.privileges, vec![AdminPrivilege::AddMember, AdminPrivilege::DeleteMessage]);

    // An admin still cannot hand out roles.
    assert!(matches!(
        h.chats
            .set_admin_role(&moderator, &chat.id, &member.id, &[AdminPrivilege::DeleteMessage])
            .await,
        Err(ChatError::Forbidden(_))
    ));

    h.chats.delete_message(&moderator, &by_member.id).await.unwrap();
    assert!(matches!(
        h.chats.get_message(&member, &by_member.id).await,
        Err(ChatError::MessageNotFound)
    ));

    // Targets must be members other than the creator, in a group chat.
    assert!(matches!(
        h.chats
            .set_admin_role(&owner, &chat.id, &outsider.id, &[AdminPrivilege::AddMember])
            .await,
        Err(ChatError::UserNotFound)
    ));
    assert!(matches!(
        h.chats.set_admin_role(&owner, &chat.id, &owner.id, &[]).await,
        Err(ChatError::InvalidInput(_))
    ));
    let mutual = h.chats.create_mutual_chat(&owner, &member.id).await.unwrap();
    assert!(matches!(
        h.chats.set_admin_role(&owner, &mutual.id, &member.id, &[]).await,
        Err(ChatError::InvalidInput(_))
    ));

    // Replacing the role with an empty one revokes it.
    h.grant(&owner, chat.id, &moderator, &[]).await;
    let again = h.chats.send_message(&member, &chat.id, "more spam").await.unwrap();
    assert!(matches!(
        h.chats.delete_message(&moderator, &again.id).await,
        Err(ChatError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_mutual_chat_is_removed_after_both_peers_leave() {
    let h = harness().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let chat = h.chats.create_mutual_chat(&alice, &bob.id).await.unwrap();
    let msg = h.chats.send_message(&alice, &chat.id, "hey").await.unwrap();

    // Peers cannot touch each other's messages.
    assert!(matches!(
        h.chats.delete_message(&bob, &msg.id).await,
        Err(ChatError::Forbidden(_))
    ));
    assert!(matches!(
        h.chats.add_member(&alice, &chat.id, &bob.id).await,
        Err(ChatError::InvalidInput(_))
    ));

    h.chats.delete_chat(&alice, &chat.id).await.unwrap();
    assert!(matches!(h.chats.get_chat(&alice, &chat.id).await, Err(ChatError::NotFound)));
    assert!(h.chats.get_chat(&bob, &chat.id).await.is_ok());

    h.chats.delete_chat(&bob, &chat.id).await.unwrap();
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chats")
        .fetch_one(&h.pool.reader)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_unread_feed_follows_read_position() {
    let h = harness().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let chat = h.chats.create_mutual_chat(&alice, &bob.id).await.unwrap();

    let mut sent = Vec::new();
    for i in 0..4 {
        sent.push(h.chats.send_message(&alice, &chat.id, &format!("m{i}")).await.unwrap());
    }

    let unread = |user: User| {
        let chats = &h.chats;
        let chat_id = chat.id;
        async move {
            chats
                .list_messages(&user, &chat_id, &PaginationParams::default(), true)
                .await
                .unwrap()
                .items
                .len()
        }
    };

    assert_eq!(unread(bob.clone()).await, 4);

    let seen = h.chats.mark_read(&bob, &chat.id, &sent[1].id).await.unwrap();
    assert_eq!(seen, sent[1].ordering_key());
    assert_eq!(unread(bob.clone()).await, 2);

    // Marking an older message read does not move the position back.
    let seen = h.chats.mark_read(&bob, &chat.id, &sent[0].id).await.unwrap();
    assert_eq!(seen, sent[1].ordering_key());
    assert_eq!(unread(bob.clone()).await, 2);

    // A deleted message's key still bounds the unread feed.
    h.chats.delete_message(&alice, &sent[1].id).await.unwrap();
    assert_eq!(unread(bob).await, 2);
}

#[tokio::test]
async fn test_input_validation() {
    let h = harness().await;
    let alice = h.user("alice").await;

    assert!(matches!(
        h.chats.create_group_chat(&alice, "   ").await,
        Err(ChatError::InvalidInput(_))
    ));
    assert!(matches!(
        h.chats.create_group_chat(&alice, &"x".repeat(101)).await,
        Err(ChatError::InvalidInput(_))
    ));
    assert!(matches!(
        h.chats.create_mutual_chat(&alice, &alice.id).await,
        Err(ChatError::InvalidInput(_))
    ));
    assert!(matches!(
        h.chats.create_mutual_chat(&alice, &Uuid::now_v7()).await,
        Err(ChatError::UserNotFound)
    ));

    let chat = h.chats.create_group_chat(&alice, "g").await.unwrap();
    assert!(matches!(
        h.chats.send_message(&alice, &chat.id, "").await,
        Err(ChatError::InvalidInput(_))
    ));
    assert!(matches!(
        h.chats.send_message(&alice, &chat.id, &"y".repeat(5001)).await,
        Err(ChatError::InvalidInput(_))
    ));
    assert!(h.chats.send_message(&alice, &chat.id, &"y".repeat(5000)).await.is_ok());
}
