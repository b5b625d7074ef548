//! Port contracts for field task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task and dispatch
//! services.

pub mod outbound;
pub mod repository;

pub use outbound::{
    AuditRecord, AuditSink, DispatchEvent, DispatchNotification, FIELD_TASK_TABLE,
    LaborFeePosting, LedgerPoster, NotificationSink, OutboundError, OutboundResult,
};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, WorkerDay};
