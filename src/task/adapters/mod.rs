//! Adapter implementations for field task ports.

pub mod memory;
pub mod postgres;

mod logging;

pub use logging::{TracingAuditSink, TracingLedgerPoster, TracingNotificationSink};
