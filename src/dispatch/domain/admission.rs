//! Admission control: whether a task may enter the schedulable pool.
//!
//! The gate runs once, when the task is created. A later payment reversal
//! never blocks an already admitted task.

use crate::task::domain::{
    CommercialRecordId, Money, SiteAddress, TaskKind, TenantId, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deposit state of the originating commercial record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositState {
    /// No deposit is required.
    NotRequired,
    /// The required deposit is paid.
    Paid,
    /// The required deposit is outstanding.
    Unpaid,
}

/// Approval state of a measurement fee waiver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeWaiverState {
    /// No waiver was requested.
    #[default]
    NotRequested,
    /// Awaiting an approver.
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
}

/// Payment and approval state of the lead, quote or order a task comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommercialRecord {
    /// Record identifier.
    pub id: CommercialRecordId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Deposit state.
    pub deposit: DepositState,
    /// Fee waiver approval state.
    pub fee_waiver: FeeWaiverState,
}

/// Inbound task creation request from the commercial pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCreationRequest {
    /// Kind of work.
    pub kind: TaskKind,
    /// Product category.
    pub category: String,
    /// Visit site.
    pub site: SiteAddress,
    /// Originating commercial record.
    pub commercial_record: CommercialRecordId,
    /// Agreed labor fee.
    pub labor_fee: Money,
    /// Whether the measurement fee is waived.
    pub fee_waived: bool,
}

impl TaskCreationRequest {
    /// Creates a request without a fee waiver and with a zero labor fee.
    #[must_use]
    pub fn new(
        kind: TaskKind,
        category: impl Into<String>,
        site: SiteAddress,
        commercial_record: CommercialRecordId,
    ) -> Self {
        Self {
            kind,
            category: category.into(),
            site,
            commercial_record,
            labor_fee: Money::ZERO,
            fee_waived: false,
        }
    }

    /// Sets the labor fee.
    #[must_use]
    pub const fn with_labor_fee(mut self, labor_fee: Money) -> Self {
        self.labor_fee = labor_fee;
        self
    }

    /// Flags the measurement fee as waived.
    #[must_use]
    pub const fn with_fee_waived(mut self) -> Self {
        self.fee_waived = true;
        self
    }
}

/// Why admission was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionDenial {
    /// A required deposit is outstanding.
    DepositUnpaid,
    /// The fee waiver has not been approved yet.
    FeeWaiverAwaitingApproval,
    /// The fee waiver was rejected.
    FeeWaiverRejected,
}

impl AdmissionDenial {
    /// Returns the human-readable reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DepositUnpaid => "deposit unpaid",
            Self::FeeWaiverAwaitingApproval => "fee waiver awaiting approval",
            Self::FeeWaiverRejected => "fee waiver rejected",
        }
    }
}

impl fmt::Display for AdmissionDenial {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Result of the admission gate. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionDecision {
    /// Whether the task may be created.
    pub eligible: bool,
    /// Denial reason when not eligible.
    pub reason: Option<AdmissionDenial>,
    /// Whether an approver is involved in this admission.
    pub requires_approval: bool,
}

impl AdmissionDecision {
    const fn admitted(requires_approval: bool) -> Self {
        Self {
            eligible: true,
            reason: None,
            requires_approval,
        }
    }

    const fn denied(reason: AdmissionDenial, requires_approval: bool) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
            requires_approval,
        }
    }
}

/// Decides whether a task may be created against its commercial record.
///
/// A fee-waived measurement always requires approval and is admitted only
/// once the waiver is approved, whatever the deposit state. Any other task is
/// denied while a required deposit is unpaid.
///
/// # Errors
///
/// Returns [`ValidationError::FeeWaiverNotApplicable`] when an installation
/// request carries a fee waiver.
pub const fn check_admission(
    request: &TaskCreationRequest,
    record: &CommercialRecord,
) -> Result<AdmissionDecision, ValidationError> {
    if request.fee_waived {
        if matches!(request.kind, TaskKind::Installation) {
            return Err(ValidationError::FeeWaiverNotApplicable);
        }
        return Ok(match record.fee_waiver {
            FeeWaiverState::Approved => AdmissionDecision::admitted(true),
            FeeWaiverState::Rejected => {
                AdmissionDecision::denied(AdmissionDenial::FeeWaiverRejected, true)
            }
            FeeWaiverState::NotRequested | FeeWaiverState::Pending => {
                AdmissionDecision::denied(AdmissionDenial::FeeWaiverAwaitingApproval, true)
            }
        });
    }

    Ok(match record.deposit {
        DepositState::Unpaid => AdmissionDecision::denied(AdmissionDenial::DepositUnpaid, false),
        DepositState::Paid | DepositState::NotRequired => AdmissionDecision::admitted(false),
    })
}
