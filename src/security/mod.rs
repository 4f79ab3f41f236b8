//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-client budget, 429 on excess)
//!     → validation.rs (key/PIN shape, 400 before any store call)
//!     → timing.rs (fixed latency floor around the retrieval round trip)
//!     → response
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input
//! - Outcome classes of a retrieval are indistinguishable by latency

pub mod rate_limit;
pub mod timing;
pub mod validation;

pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use timing::LatencyFloor;
