//! Chat handlers for the REST API.
//!
//! Chat listing is a keyset-paginated feed ordered by each chat's last
//! message; the remaining endpoints act on one chat the caller belongs to.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use chatbox_core::pagination::PaginationParams;
use chatbox_core::pagination::timestamp::format_unix_seconds;
use chatbox_types::chat::{
    AddMemberRequest, AdminRole, Chat, ChatSummary, CreateChatRequest, MarkReadRequest,
    Membership, SetAdminRoleRequest, UpdateChatRequest,
};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::ApiQuery;
use crate::http::extractors::request_url::RequestUrl;
use crate::http::response::{ApiResponse, PaginatedResponse};
use crate::state::AppState;

/// Read position returned by `POST /chats/{chat_id}/read`.
#[derive(Debug, Serialize)]
pub struct ReadPosition {
    pub chat_id: Uuid,
    pub last_seen_message_at: String,
    pub last_seen_message_id: Uuid,
}

/// GET /api/v1/chats - The caller's chats, most recently active first.
pub async fn list_chats(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    RequestUrl(url): RequestUrl,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<PaginatedResponse<ChatSummary>>, AppError> {
    let page = state.chat_service.list_chats(&user, &params).await?;
    Ok(Json(PaginatedResponse::new(page, &url)))
}

/// POST /api/v1/chats - Start a mutual chat or create a group.
pub async fn create_chat(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(body): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Chat>>), AppError> {
    let start = Instant::now();

    let chat = match body {
        CreateChatRequest::Mutual { peer_id } => {
            state.chat_service.create_mutual_chat(&user, &peer_id).await?
        }
        CreateChatRequest::Group { group_name } => {
            state.chat_service.create_group_chat(&user, &group_name).await?
        }
    };

    Ok((StatusCode::CREATED, Json(ApiResponse::success(chat, start))))
}

/// GET /api/v1/chats/{chat_id}
pub async fn get_chat(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Chat>>, AppError> {
    let start = Instant::now();
    let chat = state.chat_service.get_chat(&user, &chat_id).await?;
    Ok(Json(ApiResponse::success(chat, start)))
}

/// PATCH /api/v1/chats/{chat_id} - Rename a group.
pub async fn update_chat(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<UpdateChatRequest>,
) -> Result<Json<ApiResponse<Chat>>, AppError> {
    let start = Instant::now();
    let chat = state
        .chat_service
        .rename_group(&user, &chat_id, &body.group_name)
        .await?;
    Ok(Json(ApiResponse::success(chat, start)))
}

/// DELETE /api/v1/chats/{chat_id} - Leave a mutual chat or delete a group.
pub async fn delete_chat(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chat_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.chat_service.delete_chat(&user, &chat_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/chats/{chat_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Membership>>), AppError> {
    let start = Instant::now();
    let membership = state
        .chat_service
        .add_member(&user, &chat_id, &body.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(membership, start))))
}

/// PUT /api/v1/chats/{chat_id}/admins/{user_id} - Replace a member's admin
/// privileges. Creator only.
pub async fn set_admin_role(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path((chat_id, member_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<SetAdminRoleRequest>,
) -> Result<Json<ApiResponse<AdminRole>>, AppError> {
    let start = Instant::now();
    let role = state
        .chat_service
        .set_admin_role(&user, &chat_id, &member_id, &body.privileges)
        .await?;
    Ok(Json(ApiResponse::success(role, start)))
}

/// POST /api/v1/chats/{chat_id}/read - Mark messages up to `message_id` read.
pub async fn mark_read(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<MarkReadRequest>,
) -> Result<Json<ApiResponse<ReadPosition>>, AppError> {
    let start = Instant::now();
    let seen = state
        .chat_service
        .mark_read(&user, &chat_id, &body.message_id)
        .await?;

    let position = ReadPosition {
        chat_id,
        last_seen_message_at: format_unix_seconds(&seen.timestamp),
        last_seen_message_id: seen.id,
    };
    Ok(Json(ApiResponse::success(position, start)))
}
