//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chatbox_types::error::{ChatError, PaginationError, ValidationError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat, message, and pagination errors from the service layer.
    Chat(ChatError),
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::NotFound) => {
                (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND", "Chat not found".to_string())
            }
            AppError::Chat(ChatError::MessageNotFound) => {
                (StatusCode::NOT_FOUND, "MESSAGE_NOT_FOUND", "Message not found".to_string())
            }
            AppError::Chat(ChatError::UserNotFound) => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found".to_string())
            }
            AppError::Chat(ChatError::Forbidden(msg)) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
            }
            AppError::Chat(ChatError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Chat(ChatError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Chat(ChatError::Pagination(PaginationError::Validation(e))) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Chat(
                e @ (ChatError::Pagination(PaginationError::Store(_)) | ChatError::Storage(_)),
            ) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        }

        let body = json!({
            "data": null,
            "meta": {
                "request_id": uuid::Uuid::now_v7().to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbox_types::error::RepositoryError;

    fn status_of(err: AppError) -> (StatusCode, &'static str) {
        let (status, code, _) = err.parts();
        (status, code)
    }

    #[test]
    fn test_chat_errors_map_to_statuses() {
        assert_eq!(
            status_of(ChatError::NotFound.into()),
            (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND")
        );
        assert_eq!(
            status_of(ChatError::Forbidden("no".into()).into()),
            (StatusCode::FORBIDDEN, "FORBIDDEN")
        );
        assert_eq!(
            status_of(ChatError::Conflict("dup".into()).into()),
            (StatusCode::CONFLICT, "CONFLICT")
        );
        assert_eq!(
            status_of(ChatError::InvalidInput("empty".into()).into()),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );
    }

    #[test]
    fn test_pagination_errors_split_by_cause() {
        let invalid = ChatError::Pagination(ValidationError::IncompleteCursor.into());
        assert_eq!(status_of(invalid.into()), (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"));

        let store = ChatError::Pagination(RepositoryError::Query("disk".into()).into());
        assert_eq!(
            status_of(store.into()),
            (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
        );

        let storage = ChatError::Storage(RepositoryError::Connection);
        assert_eq!(
            status_of(storage.into()),
            (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
        );
    }
}
