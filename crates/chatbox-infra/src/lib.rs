//! Infrastructure layer for Chatbox.
//!
//! Contains implementations of the repository traits defined in `chatbox-core`:
//! SQLite storage (including the keyset feed queries), the `config.toml`
//! loader, data directory resolution, and SHA-256 API key hashing.

pub mod config;
pub mod crypto;
pub mod sqlite;
