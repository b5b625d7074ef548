//! In-memory adapters for task persistence and outbound collaborators.

mod outbound;
mod task;

pub use outbound::{RecordingAuditSink, RecordingLedgerPoster, RecordingNotificationSink};
pub use task::InMemoryTaskRepository;
