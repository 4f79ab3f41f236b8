//! Self-destructing, PIN-protected secret messages over HTTP.
//!
//! The request pipeline in front of the message store: per-client rate
//! limiting, PIN shape checks, fixed-latency retrieval and redacted audit
//! logging.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod store;

pub use config::SecretsConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{MemoryStore, MessageStore};
