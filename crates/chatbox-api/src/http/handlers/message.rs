//! Message handlers for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use chatbox_core::pagination::PaginationParams;
use chatbox_types::message::{EditMessageRequest, Message, SendMessageRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::{ApiQuery, UnreadQuery};
use crate::http::extractors::request_url::RequestUrl;
use crate::http::response::{ApiResponse, PaginatedResponse};
use crate::state::AppState;

/// GET /api/v1/chats/{chat_id}/messages - Newest first unless `reverse=true`.
pub async fn list_messages(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chat_id): Path<Uuid>,
    RequestUrl(url): RequestUrl,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(filter): ApiQuery<UnreadQuery>,
) -> Result<Json<PaginatedResponse<Message>>, AppError> {
    let unread = filter.unread()?;
    let page = state
        .chat_service
        .list_messages(&user, &chat_id, &params, unread)
        .await?;
    Ok(Json(PaginatedResponse::new(page, &url)))
}

/// POST /api/v1/chats/{chat_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>), AppError> {
    let start = Instant::now();
    let message = state
        .chat_service
        .send_message(&user, &chat_id, &body.text)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(message, start))))
}

/// GET /api/v1/messages/{message_id}
pub async fn get_message(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(message_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Message>>, AppError> {
    let start = Instant::now();
    let message = state.chat_service.get_message(&user, &message_id).await?;
    Ok(Json(ApiResponse::success(message, start)))
}

/// PATCH /api/v1/messages/{message_id}
pub async fn edit_message(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(message_id): Path<Uuid>,
    Json(body): Json<EditMessageRequest>,
) -> Result<Json<ApiResponse<Message>>, AppError> {
    let start = Instant::now();
    let message = state
        .chat_service
        .edit_message(&user, &message_id, &body.text)
        .await?;
    Ok(Json(ApiResponse::success(message, start)))
}

/// DELETE /api/v1/messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(message_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.chat_service.delete_message(&user, &message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
