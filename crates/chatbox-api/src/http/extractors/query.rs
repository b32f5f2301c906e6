//! Query parameter extractors for list endpoints.
//!
//! Cursor parameters are extracted as
//! [`PaginationParams`](chatbox_core::pagination::PaginationParams) through
//! [`ApiQuery`]; the types here carry the remaining per-endpoint flags.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use chatbox_core::pagination::parse_flag;
use chatbox_types::error::ValidationError;

use crate::http::error::AppError;

/// [`Query`] whose rejection is reported in the API error envelope.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection| AppError::Validation(rejection.body_text()))
    }
}

/// `?unread=` on the message list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct UnreadQuery {
    pub unread: Option<String>,
}

impl UnreadQuery {
    /// Parsed flag; absent or blank means `false`.
    pub fn unread(&self) -> Result<bool, ValidationError> {
        match self.unread.as_deref().map(str::trim) {
            None | Some("") => Ok(false),
            Some(raw) => parse_flag("unread", raw),
        }
    }
}
