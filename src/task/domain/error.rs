//! Error types for field task validation, parsing and state transitions.

use super::{TaskAction, TaskId, TaskKind, TaskStatus, UserId};
use thiserror::Error;

/// Malformed input rejected before any business rule runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A free-text field that must carry content was blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Latitude or longitude outside the valid range.
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        /// Supplied latitude, formatted for display.
        latitude: String,
        /// Supplied longitude, formatted for display.
        longitude: String,
    },

    /// A monetary amount below zero.
    #[error("amount must not be negative, got {0} minor units")]
    NegativeAmount(i64),

    /// A time window whose end is not after its start.
    #[error("time window must end after it starts: {0}")]
    EmptyTimeWindow(String),

    /// A slot bound carrying seconds. Slots are stored to the minute.
    #[error("time slot bounds must be whole minutes, got {0}")]
    SubMinuteTime(String),

    /// A requested visit duration of zero minutes.
    #[error("visit duration must be positive")]
    ZeroDuration,

    /// A submission without any measurement entry or installation evidence.
    #[error("result payload must contain at least one entry")]
    EmptyResult,

    /// A rating outside the accepted range.
    #[error("rating must be between {min} and {max}, got {value}")]
    RatingOutOfRange {
        /// Rejected value, formatted for display.
        value: String,
        /// Lowest accepted value.
        min: u8,
        /// Highest accepted value.
        max: u8,
    },

    /// A fee waiver requested for a task kind that does not support it.
    #[error("fee waivers apply to measurement tasks only")]
    FeeWaiverNotApplicable,

    /// An extra fee line with a quantity of zero.
    #[error("extra fee quantity must be positive")]
    ZeroQuantity,

    /// A fee total past the representable range.
    #[error("fee total overflows")]
    AmountOverflow,

    /// A split without any part.
    #[error("a split needs at least one part")]
    EmptySplit,

    /// Two split parts for the same category.
    #[error("category {0} appears twice in the split")]
    DuplicateSplitCategory(String),

    /// One worker named for two split parts, which would share a slot.
    #[error("worker {0} is named for more than one split part")]
    DuplicateSplitWorker(UserId),

    /// A split part names a worker but no visit is known to commit.
    #[error("a split part names a worker but no visit was given")]
    SplitVisitMissing,
}

/// Errors raised by the field task aggregate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The action is not permitted from the task's current status.
    #[error("cannot {action} task {task_id} while it is {status}")]
    InvalidState {
        /// Task identifier.
        task_id: TaskId,
        /// Status at the time of the attempt.
        status: TaskStatus,
        /// Attempted action.
        action: TaskAction,
    },

    /// The actor is not allowed to perform the action on this task.
    #[error("user {actor_id} may not {action} task {task_id}")]
    Forbidden {
        /// Task identifier.
        task_id: TaskId,
        /// Acting user.
        actor_id: UserId,
        /// Attempted action.
        action: TaskAction,
    },

    /// Fee negotiation resolution attempted with nothing pending.
    #[error("task {0} has no pending fee negotiation")]
    NoPendingNegotiation(TaskId),

    /// The action only applies to the other kind of task.
    #[error("cannot {action} {kind} task {task_id}")]
    WrongKind {
        /// Task identifier.
        task_id: TaskId,
        /// Kind of the task.
        kind: TaskKind,
        /// Attempted action.
        action: TaskAction,
    },

    /// Installation submitted before any checklist was recorded.
    #[error("task {0} has no installation checklist")]
    ChecklistMissing(TaskId),

    /// Installation submitted with required checklist items unchecked.
    #[error("task {task_id} has unchecked checklist items: {}", outstanding.join(", "))]
    ChecklistIncomplete {
        /// Task identifier.
        task_id: TaskId,
        /// Labels of the unchecked required items.
        outstanding: Vec<String>,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing a time slot label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognised time slot: {0}")]
pub struct ParseTimeSlotError(pub String);
