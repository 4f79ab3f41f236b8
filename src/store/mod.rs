//! Message store boundary.
//!
//! # Data Flow
//! ```text
//! http/message.rs
//!     → MessageStore::create_message (ttl, message, pin) → key + expiry
//!     → MessageStore::retrieve_message (key, pin)        → message | StoreError
//!
//! memory.rs:  reference engine (DashMap, read-once, attempt counting)
//! pin.rs:     salted PIN digest + constant-time comparison
//! ```
//!
//! # Design Decisions
//! - The HTTP layer only sees the trait; engines are injected at startup
//! - `StoreError::BadPinAttempt` is the one outcome the API distinguishes;
//!   every other failure is collapsed into a generic client error upstream

pub mod memory;
pub mod pin;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::MemoryStore;

/// Result of a successful `create_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedMessage {
    pub key: String,
    pub exp: DateTime<Utc>,
}

/// Failures a store may report.
///
/// Display texts are returned verbatim to clients, so none of them may
/// contain message content or PIN material.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Key exists, PIN did not match, and an attempt was consumed.
    #[error("failed pin attempt")]
    BadPinAttempt,

    #[error("message not found")]
    NotFound,

    #[error("message expired")]
    Expired,

    /// Last allowed attempt failed; the message has been destroyed.
    #[error("too many failed pin attempts, message destroyed")]
    AttemptsExhausted,

    #[error("expiration must be between 1 and {max_secs} seconds")]
    InvalidExpiration { max_secs: u64 },

    #[error("store error: {0}")]
    Internal(String),
}

/// The storage/crypto engine the request pipeline delegates to.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store `message` behind `pin` for `ttl`, returning its key and expiry.
    async fn create_message(
        &self,
        ttl: Duration,
        message: &str,
        pin: &str,
    ) -> Result<CreatedMessage, StoreError>;

    /// Return the message stored under `key` if `pin` matches.
    async fn retrieve_message(&self, key: &str, pin: &str) -> Result<String, StoreError>;
}
