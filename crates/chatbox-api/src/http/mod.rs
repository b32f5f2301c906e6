//! HTTP/REST API layer for Chatbox.
//!
//! Axum-based REST API at `/api/v1/` with API key authentication, envelope
//! responses for single resources, and keyset-paginated feeds.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
