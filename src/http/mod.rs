//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → client.rs (attach ClientIdentity)
//!     → middleware/audit.rs (start clock; log masked record on the way out)
//!     → security::rate_limit (per-client budget)
//!     → message.rs / params.rs (handlers)
//!     → error.rs (JSON error bodies)
//!     → Send to client
//! ```

pub mod client;
pub mod error;
pub mod message;
pub mod middleware;
pub mod params;
pub mod server;

pub use client::ClientIdentity;
pub use error::ApiError;
pub use server::{AppState, HttpServer};
