//! Conversation session management.
//!
//! Each page load of a chat screen starts a session: a UUID-keyed
//! [`ConversationEngine`](crate::engine::ConversationEngine) bound to that
//! screen's backend and projection. Sessions live in memory only, are lost on
//! restart, and are dropped once idle for the configured timeout.
//!
//! # Architecture
//!
//! - [`Session`]: one conversation on one screen
//! - [`SessionStore`]: thread-safe store for all active sessions

mod registry;

pub use registry::{DEFAULT_SESSION_TIMEOUT, Session, SessionStore};
