//! Business logic and repository trait definitions for Chatbox.
//!
//! This crate defines the keyset pagination engine, the authorization decision
//! table, and the "ports" (repository traits) that the infrastructure layer
//! implements. It depends only on `chatbox-types` -- never on `chatbox-infra`
//! or any database/IO crate.

pub mod access;
pub mod pagination;
pub mod repository;
pub mod service;
