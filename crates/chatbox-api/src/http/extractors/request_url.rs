//! Absolute URL of the current request, the base for pagination links.

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::header::HOST;
use axum::http::request::Parts;
use url::Url;

use crate::http::error::AppError;

/// Absolute request URL rebuilt from the `Host` header and the original URI
/// (the full path, even inside nested routers).
///
/// The scheme comes from `X-Forwarded-Proto` when a proxy sets it.
pub struct RequestUrl(pub Url);

impl<S: Send + Sync> FromRequestParts<S> for RequestUrl {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uri = match parts.extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri.clone(),
            None => parts.uri.clone(),
        };

        let host = parts
            .headers
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost");
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|h| h.to_str().ok())
            .filter(|s| *s == "http" || *s == "https")
            .unwrap_or("http");
        let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());

        Url::parse(&format!("{scheme}://{host}{path_and_query}"))
            .map(RequestUrl)
            .map_err(|e| AppError::Validation(format!("invalid request URL: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Url {
        let (mut parts, ()) = request.into_parts();
        RequestUrl::from_request_parts(&mut parts, &()).await.unwrap().0
    }

    #[tokio::test]
    async fn test_uses_host_header() {
        let url = extract(
            Request::builder()
                .uri("/api/v1/chats?limit=5")
                .header("Host", "chat.example.com:8080")
                .body(())
                .unwrap(),
        )
        .await;
        assert_eq!(url.as_str(), "http://chat.example.com:8080/api/v1/chats?limit=5");
    }

    #[tokio::test]
    async fn test_prefers_original_uri_and_forwarded_scheme() {
        let mut request = Request::builder()
            .uri("/chats")
            .header("Host", "chat.example.com")
            .header("X-Forwarded-Proto", "https")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(OriginalUri("/api/v1/chats?reverse=true".parse().unwrap()));

        let url = extract(request).await;
        assert_eq!(url.as_str(), "https://chat.example.com/api/v1/chats?reverse=true");
    }

    #[tokio::test]
    async fn test_defaults_to_localhost() {
        let url = extract(Request::builder().uri("/health").body(()).unwrap()).await;
        assert_eq!(url.as_str(), "http://localhost/health");
    }
}
