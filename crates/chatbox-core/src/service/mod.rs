//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, pagination, and the access rules.
//! They depend on traits (ports) -- never on concrete infrastructure
//! implementations.

pub mod chat;
pub mod hash;
pub mod user;
