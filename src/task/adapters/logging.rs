//! Outbound adapters that emit structured `tracing` events instead of
//! calling a remote collaborator.

use async_trait::async_trait;
use tracing::info;

use crate::task::ports::{
    AuditRecord, AuditSink, DispatchNotification, LaborFeePosting, LedgerPoster,
    NotificationSink, OutboundResult,
};

/// Audit sink writing each record as an `info` event on the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) -> OutboundResult<()> {
        info!(
            target: "audit",
            table = %record.table,
            record_id = %record.record_id,
            action = %record.action,
            actor_id = %record.actor_id,
            tenant_id = %record.tenant_id,
            new_value = %record.new_value,
            "audit record"
        );
        Ok(())
    }
}

/// Ledger poster writing each posting as an `info` event on the `ledger`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLedgerPoster;

#[async_trait]
impl LedgerPoster for TracingLedgerPoster {
    async fn post(&self, posting: LaborFeePosting) -> OutboundResult<()> {
        info!(
            target: "ledger",
            task_id = %posting.task_id,
            tenant_id = %posting.tenant_id,
            worker_id = %posting.worker_id,
            labor_fee = posting.labor_fee.minor_units(),
            completed_at = %posting.completed_at,
            "labor fee posted"
        );
        Ok(())
    }
}

/// Notification sink writing each notification as an `info` event on the
/// `notification` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, notification: DispatchNotification) -> OutboundResult<()> {
        info!(
            target: "notification",
            task_id = %notification.task_id,
            tenant_id = %notification.tenant_id,
            recipient = %notification.recipient,
            event = ?notification.event,
            "dispatch notification"
        );
        Ok(())
    }
}
