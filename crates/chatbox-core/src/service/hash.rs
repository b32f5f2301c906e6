//! KeyHasher trait for API key digests.
//!
//! The SHA-256 adapter lives in chatbox-infra; the service only ever sees the
//! hex digest.

pub trait KeyHasher: Send + Sync {
    /// Hex-encoded digest of an API key.
    fn hash_key(&self, key: &str) -> String;
}
