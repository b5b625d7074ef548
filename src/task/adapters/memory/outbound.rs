//! Recording outbound adapters used by tests and local runs.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::ports::{
    AuditRecord, AuditSink, DispatchNotification, LaborFeePosting, LedgerPoster,
    NotificationSink, OutboundError, OutboundResult,
};

fn lock_poisoned(err: impl ToString) -> OutboundError {
    OutboundError::delivery(std::io::Error::other(err.to_string()))
}

macro_rules! recording_sink {
    ($(#[$meta:meta])* $name:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            entries: Arc<RwLock<Vec<$item>>>,
        }

        impl $name {
            /// Creates an empty sink.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Returns everything received so far, oldest first.
            ///
            /// A poisoned lock yields an empty list.
            #[must_use]
            pub fn entries(&self) -> Vec<$item> {
                self.entries
                    .read()
                    .map(|entries| entries.clone())
                    .unwrap_or_default()
            }

            fn push(&self, item: $item) -> OutboundResult<()> {
                self.entries.write().map_err(lock_poisoned)?.push(item);
                Ok(())
            }
        }
    };
}

recording_sink!(
    /// Audit sink that keeps every record in memory.
    RecordingAuditSink,
    AuditRecord
);

recording_sink!(
    /// Ledger poster that keeps every posting in memory.
    RecordingLedgerPoster,
    LaborFeePosting
);

recording_sink!(
    /// Notification sink that keeps every notification in memory.
    RecordingNotificationSink,
    DispatchNotification
);

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, record: AuditRecord) -> OutboundResult<()> {
        self.push(record)
    }
}

#[async_trait]
impl LedgerPoster for RecordingLedgerPoster {
    async fn post(&self, posting: LaborFeePosting) -> OutboundResult<()> {
        self.push(posting)
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn notify(&self, notification: DispatchNotification) -> OutboundResult<()> {
        self.push(notification)
    }
}
