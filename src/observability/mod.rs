//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, `audit` target for request records)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the request header into the audit record
//! - No layer logs raw request URIs; only the audit stage logs paths, masked
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
