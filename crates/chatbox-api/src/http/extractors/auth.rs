//! API key authentication extractor.
//!
//! Extracts the API key from:
//! - `Authorization: Bearer <key>` header
//! - `X-API-Key: <key>` header
//!
//! and resolves its owner through `UserService::authenticate`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use chatbox_types::user::User;

use crate::http::error::AppError;
use crate::state::AppState;

/// The user owning the request's API key.
pub struct Authenticated(pub User);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = extract_api_key(parts)?;

        match state.user_service.authenticate(&api_key).await? {
            Some(user) => Ok(Authenticated(user)),
            None => Err(AppError::Unauthorized(
                "Invalid API key. Provide a valid key via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
            )),
        }
    }
}

/// Extract the API key from request headers.
fn extract_api_key(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(key) = auth_str.strip_prefix("Bearer ") {
            return Ok(key.trim().to_string());
        }
    }

    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(key_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing API key. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: &str, value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .header(header, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_bearer_and_header_keys() {
        assert_eq!(
            extract_api_key(&parts_with("Authorization", "Bearer cbx_abc ")).unwrap(),
            "cbx_abc"
        );
        assert_eq!(
            extract_api_key(&parts_with("X-API-Key", "cbx_def")).unwrap(),
            "cbx_def"
        );
    }

    #[test]
    fn test_missing_key_is_unauthorized() {
        let (parts, ()) = Request::builder().body(()).unwrap().into_parts();
        assert!(matches!(extract_api_key(&parts), Err(AppError::Unauthorized(_))));

        // Basic auth is not an API key.
        assert!(matches!(
            extract_api_key(&parts_with("Authorization", "Basic dXNlcg==")),
            Err(AppError::Unauthorized(_))
        ));
    }
}
