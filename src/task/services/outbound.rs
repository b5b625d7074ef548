//! Post-commit delivery to the audit, ledger and notification collaborators.

use crate::task::{
    adapters::{TracingAuditSink, TracingLedgerPoster, TracingNotificationSink},
    ports::{
        AuditRecord, AuditSink, DispatchNotification, LaborFeePosting, LedgerPoster,
        NotificationSink,
    },
};
use std::sync::Arc;
use tracing::warn;

/// Outbound collaborators shared by the task services.
///
/// Every call happens after the task write has committed. Failures are
/// logged and swallowed; they never roll a transition back.
#[derive(Clone)]
pub struct OutboundPorts {
    audit: Arc<dyn AuditSink>,
    ledger: Arc<dyn LedgerPoster>,
    notifications: Arc<dyn NotificationSink>,
}

impl OutboundPorts {
    /// Bundles the three collaborators.
    #[must_use]
    pub const fn new(
        audit: Arc<dyn AuditSink>,
        ledger: Arc<dyn LedgerPoster>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            audit,
            ledger,
            notifications,
        }
    }

    /// Collaborators that only emit `tracing` events.
    #[must_use]
    pub fn logging() -> Self {
        Self::new(
            Arc::new(TracingAuditSink),
            Arc::new(TracingLedgerPoster),
            Arc::new(TracingNotificationSink),
        )
    }

    pub(crate) async fn audit(&self, record: AuditRecord) {
        let task_id = record.record_id;
        let action = record.action;
        if let Err(err) = self.audit.record(record).await {
            warn!(%task_id, %action, error = %err, "audit record dropped");
        }
    }

    pub(crate) async fn post(&self, posting: LaborFeePosting) {
        let task_id = posting.task_id;
        if let Err(err) = self.ledger.post(posting).await {
            warn!(%task_id, error = %err, "ledger posting failed");
        }
    }

    pub(crate) async fn notify(&self, notification: DispatchNotification) {
        let task_id = notification.task_id;
        if let Err(err) = self.notifications.notify(notification).await {
            warn!(%task_id, error = %err, "dispatch notification failed");
        }
    }
}

impl std::fmt::Debug for OutboundPorts {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("OutboundPorts").finish_non_exhaustive()
    }
}
