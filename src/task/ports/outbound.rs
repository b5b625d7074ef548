//! Outbound ports for audit records, ledger postings and dispatch
//! notifications.
//!
//! These calls happen after a task write has committed. Services log their
//! failures and never roll the task back.

use crate::task::domain::{
    FieldTask, Money, ScheduledVisit, TaskAction, TaskId, TenantId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for outbound port calls.
pub type OutboundResult<T> = Result<T, OutboundError>;

/// Table name used in audit records for field tasks.
pub const FIELD_TASK_TABLE: &str = "field_tasks";

/// One audit entry, written per task mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Audited table.
    pub table: String,
    /// Mutated row.
    pub record_id: TaskId,
    /// Action applied.
    pub action: TaskAction,
    /// Acting user.
    pub actor_id: UserId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Snapshot before the mutation, absent on creation.
    pub old_value: Option<serde_json::Value>,
    /// Snapshot after the mutation.
    pub new_value: serde_json::Value,
    /// Mutation time.
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Builds an audit record for a field task transition.
    ///
    /// Snapshots that fail to serialize are recorded as JSON `null`.
    #[must_use]
    pub fn for_task(
        action: TaskAction,
        actor_id: UserId,
        before: Option<&FieldTask>,
        after: &FieldTask,
    ) -> Self {
        Self {
            table: FIELD_TASK_TABLE.to_owned(),
            record_id: after.id(),
            action,
            actor_id,
            tenant_id: after.tenant_id(),
            old_value: before.map(snapshot),
            new_value: snapshot(after),
            timestamp: after.updated_at(),
        }
    }
}

fn snapshot(task: &FieldTask) -> serde_json::Value {
    serde_json::to_value(task).unwrap_or(serde_json::Value::Null)
}

/// Labor fee posted to the ledger when a task completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborFeePosting {
    /// Completed task.
    pub task_id: TaskId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Worker to be paid.
    pub worker_id: UserId,
    /// Final labor fee.
    pub labor_fee: Money,
    /// Completion time.
    pub completed_at: DateTime<Utc>,
}

/// What happened to a worker's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// A visit was committed to the worker.
    Assigned {
        /// Committed visit.
        visit: ScheduledVisit,
    },
    /// A visit was committed despite soft conflicts.
    SoftConflictOverridden {
        /// Committed visit.
        visit: ScheduledVisit,
        /// Warnings the dispatcher accepted.
        warnings: Vec<String>,
    },
    /// The worker declined the assignment.
    WorkerRejected {
        /// Stated reason.
        reason: String,
    },
}

/// Notification about a dispatch event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchNotification {
    /// Task concerned.
    pub task_id: TaskId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Recipient: the worker for assignments, the dispatcher for rejections.
    pub recipient: UserId,
    /// Event details.
    pub event: DispatchEvent,
}

/// Audit collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records one audit entry.
    async fn record(&self, record: AuditRecord) -> OutboundResult<()>;
}

/// Financial ledger collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerPoster: Send + Sync {
    /// Posts the labor fee of a completed task.
    async fn post(&self, posting: LaborFeePosting) -> OutboundResult<()>;
}

/// Notification delivery collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers a dispatch notification.
    async fn notify(&self, notification: DispatchNotification) -> OutboundResult<()>;
}

/// Failure reported by an outbound collaborator.
#[derive(Debug, Clone, Error)]
pub enum OutboundError {
    /// The collaborator refused the call.
    #[error("outbound collaborator rejected the call: {0}")]
    Rejected(String),

    /// Transport or runtime failure.
    #[error("outbound delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl OutboundError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
