//! Response bodies.
//!
//! Single resources are wrapped in the envelope shared with error responses:
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 5 }
//! }
//! ```
//!
//! Feeds use the pagination envelope instead:
//! ```json
//! { "older": "http://...", "newer": "http://...", "results": [ ... ] }
//! ```

use std::time::Instant;

use serde::Serialize;
use url::Url;

use chatbox_core::pagination::build_links;
use chatbox_types::pagination::Page;

/// Envelope response wrapping a single resource.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ApiMeta,
}

/// Metadata included in every enveloped response.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Unique request identifier for tracing.
    pub request_id: String,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
    /// Response time in milliseconds.
    pub response_time_ms: u64,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response for a request that started at `start`.
    pub fn success(data: T, start: Instant) -> Self {
        Self {
            data,
            meta: ApiMeta {
                request_id: uuid::Uuid::now_v7().to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                response_time_ms: start.elapsed().as_millis() as u64,
            },
        }
    }
}

/// One page of a feed with absolute links to its neighbours.
///
/// Both links are `null` exactly when `results` is empty.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub older: Option<String>,
    pub newer: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(page: Page<T>, request_url: &Url) -> Self {
        let links = build_links(request_url, &page);
        Self {
            older: links.older,
            newer: links.newer,
            results: page.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbox_types::pagination::OrderingKey;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_empty_page_serializes_null_links() {
        let url = Url::parse("http://localhost/api/v1/chats").unwrap();
        let body = serde_json::to_value(PaginatedResponse::new(Page::<u32>::empty(), &url)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"older": null, "newer": null, "results": []})
        );
    }

    #[test]
    fn test_page_links_point_at_edges() {
        let url = Url::parse("http://localhost/api/v1/chats?limit=2").unwrap();
        let key = OrderingKey::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap(), Uuid::nil());
        let page = Page {
            items: vec![1, 2],
            older: Some(key),
            newer: Some(key),
        };

        let response = PaginatedResponse::new(page, &url);
        let older = response.older.unwrap();
        let newer = response.newer.unwrap();
        assert!(older.starts_with("http://localhost/api/v1/chats?limit=2&"));
        assert!(older.contains("offset_datetime=1700000000.000000"));
        assert!(!older.contains("reverse"));
        assert!(newer.contains("reverse=true"));
        assert_eq!(response.results, vec![1, 2]);
    }
}
