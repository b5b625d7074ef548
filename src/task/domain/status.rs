//! Task lifecycle status and the actions that move a task between statuses.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a field task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Admitted and waiting for a dispatcher to pick a worker.
    PendingDispatch,
    /// Assigned; waiting for the worker to accept or reject.
    PendingAccept,
    /// Accepted; the worker has not arrived on site yet.
    PendingVisit,
    /// The worker checked in on site.
    InProgress,
    /// Results submitted; waiting for a confirming actor.
    PendingConfirm,
    /// Confirmed and posted to the ledger.
    Completed,
    /// Administratively cancelled.
    Cancelled,
}

impl TaskStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::PendingDispatch,
        Self::PendingAccept,
        Self::PendingVisit,
        Self::InProgress,
        Self::PendingConfirm,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingDispatch => "PENDING_DISPATCH",
            Self::PendingAccept => "PENDING_ACCEPT",
            Self::PendingVisit => "PENDING_VISIT",
            Self::InProgress => "IN_PROGRESS",
            Self::PendingConfirm => "PENDING_CONFIRM",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns whether the status is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns whether a task in this status occupies its worker's calendar.
    #[must_use]
    pub const fn holds_commitment(self) -> bool {
        matches!(
            self,
            Self::PendingAccept | Self::PendingVisit | Self::InProgress | Self::PendingConfirm
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

/// Mutations a task can undergo. Also used as the audit action label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// Task admitted and stored.
    Create,
    /// Dispatcher commits a worker and visit.
    Assign,
    /// Worker accepts the assignment.
    Accept,
    /// Worker declines the assignment.
    Reject,
    /// Worker arrives on site.
    CheckIn,
    /// Worker submits measurement data or installation evidence.
    Submit,
    /// Worker proposes a different labor fee.
    Negotiate,
    /// Approver settles a pending fee negotiation.
    ResolveNegotiation,
    /// Worker records a field discovery.
    ReportIssue,
    /// Confirming actor approves the completed work.
    Confirm,
    /// Confirming actor sends the work back for another visit.
    RejectCompletion,
    /// Administrative cancellation.
    Cancel,
    /// Worker saves the installation checklist.
    UpdateChecklist,
    /// Dispatcher replaces a measurement task with one task per category.
    Split,
}

impl TaskAction {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Assign => "assign",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::CheckIn => "check_in",
            Self::Submit => "submit",
            Self::Negotiate => "negotiate",
            Self::ResolveNegotiation => "resolve_negotiation",
            Self::ReportIssue => "report_issue",
            Self::Confirm => "confirm",
            Self::RejectCompletion => "reject_completion",
            Self::Cancel => "cancel",
            Self::UpdateChecklist => "update_checklist",
            Self::Split => "split",
        }
    }

    /// Returns whether the action may be applied to a task in `status`.
    ///
    /// `Create` never applies to an existing task.
    #[must_use]
    pub const fn permitted_from(self, status: TaskStatus) -> bool {
        match self {
            Self::Create => false,
            Self::Assign => matches!(status, TaskStatus::PendingDispatch),
            Self::Accept | Self::Reject => matches!(status, TaskStatus::PendingAccept),
            Self::CheckIn => matches!(status, TaskStatus::PendingVisit),
            Self::Submit => matches!(status, TaskStatus::InProgress),
            Self::Negotiate | Self::ReportIssue => {
                matches!(status, TaskStatus::InProgress | TaskStatus::PendingConfirm)
            }
            Self::ResolveNegotiation => matches!(
                status,
                TaskStatus::InProgress | TaskStatus::PendingConfirm | TaskStatus::Completed
            ),
            Self::Confirm | Self::RejectCompletion => {
                matches!(status, TaskStatus::PendingConfirm)
            }
            Self::UpdateChecklist => {
                matches!(status, TaskStatus::PendingVisit | TaskStatus::InProgress)
            }
            Self::Cancel | Self::Split => !status.is_terminal(),
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
