//! Shared domain types for Chatbox.
//!
//! This crate contains the types used across the Chatbox workspace: users,
//! chats, memberships, messages, the keyset pagination value types, the
//! global configuration, and the error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod message;
pub mod pagination;
pub mod user;
