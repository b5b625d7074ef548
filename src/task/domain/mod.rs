//! Domain model for field task lifecycle management.
//!
//! The task domain models the field task aggregate, its status machine, the
//! scheduling values a visit is committed with, and the payloads attached as
//! the task moves from dispatch to completion. Infrastructure concerns stay
//! outside this boundary.

mod actor;
mod error;
mod ids;
mod payload;
mod schedule;
mod status;
mod task;

pub use actor::{Actor, ActorRole};
pub use error::{ParseTaskStatusError, ParseTimeSlotError, TaskDomainError, ValidationError};
pub use ids::{CommercialRecordId, TaskId, TenantId, UserId};
pub(crate) use payload::required_text;
pub use payload::{
    Assignment, AssignmentTerms, Cancellation, CheckInLocation, CheckInRecord, ChecklistItem,
    CompletionRating, CompletionRejection, CompletionReview, ExtraFee, ExtraFeeKind,
    FeeBreakdown, FeeCheckStatus, FeeNegotiation, InstallChecklist, InstallationEvidence,
    IssueReport, IssueSeverity, LogisticsCheck, MeasurementEntry, Money, OverrideAcknowledgement,
    TaskResult, WorkerRejection,
};
pub use schedule::{GeoPoint, ScheduledVisit, SiteAddress, SlotInterval, TimeSlot};
pub use status::{TaskAction, TaskStatus};
pub use task::{FieldTask, NewFieldTask, TaskKind};
