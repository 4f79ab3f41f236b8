//! Request pipeline stages that are not handlers.

pub mod audit;

pub use audit::{audit_middleware, mask_path, AuditSummary, MASK};
