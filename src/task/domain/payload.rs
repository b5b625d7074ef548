//! Payloads attached to a task as it moves through its lifecycle.

use super::{GeoPoint, ScheduledVisit, UserId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Non-negative monetary amount in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeAmount`] for negative values.
    pub const fn from_minor_units(value: i64) -> Result<Self, ValidationError> {
        if value < 0 {
            return Err(ValidationError::NegativeAmount(value));
        }
        Ok(Self(value))
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Sum of two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmountOverflow`] past `i64::MAX`.
    pub const fn checked_add(self, other: Self) -> Result<Self, ValidationError> {
        match self.0.checked_add(other.0) {
            Some(total) => Ok(Self(total)),
            None => Err(ValidationError::AmountOverflow),
        }
    }

    /// Amount multiplied by a count.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmountOverflow`] past `i64::MAX`.
    pub fn checked_times(self, count: u32) -> Result<Self, ValidationError> {
        match self.0.checked_mul(i64::from(count)) {
            Some(total) => Ok(Self(total)),
            None => Err(ValidationError::AmountOverflow),
        }
    }
}

/// Returns the trimmed text, or a validation error naming `field`.
pub(crate) fn required_text(
    value: impl Into<String>,
    field: &'static str,
) -> Result<String, ValidationError> {
    let raw = value.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

/// Dispatcher acknowledgement that a soft conflict was accepted knowingly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideAcknowledgement {
    /// Dispatcher who supplied the override flag.
    pub acknowledged_by: UserId,
    /// Human-readable warnings that were overridden.
    pub warnings: Vec<String>,
}

/// Surcharge categories a dispatcher can add on top of the base fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtraFeeKind {
    /// Work at height.
    HighAltitude,
    /// Remote site.
    LongDistance,
    /// Wall needing special fixings.
    SpecialWall,
    /// Anything else; describe it.
    Other,
}

/// One surcharge line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraFee {
    /// Surcharge category.
    pub kind: ExtraFeeKind,
    /// Amount per unit.
    pub unit_amount: Money,
    /// Number of units, at least one.
    pub quantity: u32,
    /// Free-form note.
    pub description: Option<String>,
}

impl ExtraFee {
    /// Creates a single-unit surcharge.
    #[must_use]
    pub const fn new(kind: ExtraFeeKind, unit_amount: Money) -> Self {
        Self {
            kind,
            unit_amount,
            quantity: 1,
            description: None,
        }
    }

    /// Sets the number of units.
    #[must_use]
    pub const fn times(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Attaches a note.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Line total.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroQuantity`] for an empty line and
    /// [`ValidationError::AmountOverflow`] when the product overflows.
    pub fn amount(&self) -> Result<Money, ValidationError> {
        if self.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        self.unit_amount.checked_times(self.quantity)
    }
}

/// Labor fee agreed at dispatch: a base fee plus surcharges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Base fee for the visit.
    pub base: Money,
    /// Surcharges, in entry order.
    pub extras: Vec<ExtraFee>,
}

impl FeeBreakdown {
    /// Creates a breakdown with no surcharges.
    #[must_use]
    pub const fn new(base: Money) -> Self {
        Self {
            base,
            extras: Vec::new(),
        }
    }

    /// Adds a surcharge line.
    #[must_use]
    pub fn with_extra(mut self, extra: ExtraFee) -> Self {
        self.extras.push(extra);
        self
    }

    /// Base fee plus every surcharge.
    ///
    /// # Errors
    ///
    /// Returns the first invalid line's error, or
    /// [`ValidationError::AmountOverflow`].
    pub fn total(&self) -> Result<Money, ValidationError> {
        self.extras
            .iter()
            .try_fold(self.base, |sum, extra| sum.checked_add(extra.amount()?))
    }
}

/// Supply readiness recorded when an installation was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticsCheck {
    /// Purchase orders not yet received at dispatch time.
    pub outstanding_orders: Vec<String>,
    /// Dispatcher who dispatched despite outstanding orders.
    pub forced_by: Option<UserId>,
}

impl LogisticsCheck {
    /// Returns whether every order had arrived.
    #[must_use]
    pub fn was_ready(&self) -> bool {
        self.outstanding_orders.is_empty()
    }
}

/// Worker and visit committed by a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned worker.
    pub worker_id: UserId,
    /// Committed visit.
    pub visit: ScheduledVisit,
    /// Dispatcher who committed the assignment.
    pub dispatched_by: UserId,
    /// Commit timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Present when a soft conflict was overridden.
    pub soft_conflict_override: Option<OverrideAcknowledgement>,
    /// Fee breakdown agreed at dispatch, when one was given.
    pub fee_breakdown: Option<FeeBreakdown>,
    /// Supply check, for installations.
    pub logistics: Option<LogisticsCheck>,
}

/// What a dispatcher commits to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTerms {
    /// Chosen worker.
    pub worker_id: UserId,
    /// Chosen date and slot.
    pub visit: ScheduledVisit,
    /// Present when a soft conflict is being overridden.
    pub soft_conflict_override: Option<OverrideAcknowledgement>,
    /// Replaces the labor fee with its total when present.
    pub fee_breakdown: Option<FeeBreakdown>,
    /// Supply check outcome, for installations.
    pub logistics: Option<LogisticsCheck>,
}

impl AssignmentTerms {
    /// Terms for a worker and visit with nothing else attached.
    #[must_use]
    pub const fn new(worker_id: UserId, visit: ScheduledVisit) -> Self {
        Self {
            worker_id,
            visit,
            soft_conflict_override: None,
            fee_breakdown: None,
            logistics: None,
        }
    }

    /// Records a soft-conflict override.
    #[must_use]
    pub fn with_soft_conflict_override(mut self, acknowledgement: OverrideAcknowledgement) -> Self {
        self.soft_conflict_override = Some(acknowledgement);
        self
    }

    /// Sets the fee breakdown.
    #[must_use]
    pub fn with_fee_breakdown(mut self, breakdown: FeeBreakdown) -> Self {
        self.fee_breakdown = Some(breakdown);
        self
    }

    /// Records the supply check.
    #[must_use]
    pub fn with_logistics(mut self, check: LogisticsCheck) -> Self {
        self.logistics = Some(check);
        self
    }
}

/// Location reported by the worker on arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInLocation {
    /// Device coordinate.
    pub coordinate: GeoPoint,
    /// Reverse-geocoded address, if the client supplied one.
    pub address: Option<String>,
}

impl CheckInLocation {
    /// Creates a check-in location from a coordinate.
    #[must_use]
    pub const fn new(coordinate: GeoPoint) -> Self {
        Self {
            coordinate,
            address: None,
        }
    }

    /// Attaches the reverse-geocoded address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Arrival record kept on the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRecord {
    /// Reported location.
    pub location: CheckInLocation,
    /// Arrival timestamp.
    pub checked_in_at: DateTime<Utc>,
    /// Minutes after the expected arrival; zero when on time.
    pub late_minutes: u32,
}

/// One measured opening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementEntry {
    /// Room or opening label.
    pub location: String,
    /// Width in millimetres.
    pub width_mm: u32,
    /// Height in millimetres.
    pub height_mm: u32,
    /// Free-form remarks.
    pub notes: Option<String>,
}

/// Evidence that an installation was carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationEvidence {
    /// Photo URLs of the finished work.
    pub photo_urls: Vec<String>,
    /// Customer signature image, when captured.
    pub customer_signature_url: Option<String>,
}

/// Structured result submitted at the end of a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskResult {
    /// Measurement data.
    Measurement {
        /// Measured openings.
        entries: Vec<MeasurementEntry>,
    },
    /// Installation completion evidence.
    Installation(InstallationEvidence),
}

impl TaskResult {
    /// Ensures the payload carries at least one entry.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyResult`] for an empty payload.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_content = match self {
            Self::Measurement { entries } => !entries.is_empty(),
            Self::Installation(evidence) => !evidence.photo_urls.is_empty(),
        };
        if has_content {
            Ok(())
        } else {
            Err(ValidationError::EmptyResult)
        }
    }
}

/// One step of the standard installation procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Stable item key.
    pub id: String,
    /// Text shown to the worker.
    pub label: String,
    /// Whether the worker ticked it.
    pub checked: bool,
    /// Whether submission waits on it.
    pub required: bool,
    /// Supporting photo, when taken.
    pub photo_url: Option<String>,
}

impl ChecklistItem {
    /// Creates a required, unticked item.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            checked: false,
            required: true,
            photo_url: None,
        }
    }

    /// Marks the item ticked.
    #[must_use]
    pub const fn ticked(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Marks the item optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Attaches a photo.
    #[must_use]
    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    pub(crate) fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            id: required_text(self.id, "checklist item id")?,
            label: required_text(self.label, "checklist item label")?,
            ..self
        })
    }
}

/// Latest state of an installation checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallChecklist {
    /// Items as last saved.
    pub items: Vec<ChecklistItem>,
    /// Worker who saved them.
    pub updated_by: UserId,
    /// Save timestamp.
    pub updated_at: DateTime<Utc>,
}

impl InstallChecklist {
    /// Labels of required items still unticked.
    #[must_use]
    pub fn outstanding(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| item.required && !item.checked)
            .map(|item| item.label.clone())
            .collect()
    }

    /// Returns whether every required item is ticked.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|item| item.checked || !item.required)
    }
}

/// Fee-check status, tracked independently of lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeCheckStatus {
    /// No adjustment requested.
    #[default]
    None,
    /// An adjustment awaits approval.
    Pending,
    /// The last adjustment was approved.
    Approved,
    /// The last adjustment was rejected.
    Rejected,
}

/// A worker's request to change the labor fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeNegotiation {
    /// Proposed labor fee.
    pub proposed_amount: Money,
    /// Justification.
    pub reason: String,
    /// Requesting worker.
    pub requested_by: UserId,
    /// Request timestamp.
    pub requested_at: DateTime<Utc>,
    /// Approver, once resolved.
    pub resolved_by: Option<UserId>,
}

/// How serious a field discovery is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    /// Informational.
    Low,
    /// Needs follow-up.
    Medium,
    /// Blocks part of the work.
    High,
    /// Blocks the whole visit.
    Critical,
}

/// Field discovery reported from site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReport {
    /// What was found.
    pub description: String,
    /// Severity.
    pub severity: IssueSeverity,
    /// Supporting photo URLs.
    pub photos: Vec<String>,
    /// Reporting worker.
    pub reported_by: UserId,
    /// Report timestamp.
    pub reported_at: DateTime<Utc>,
}

/// Customer satisfaction score recorded on confirmation, 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionRating(u8);

impl CompletionRating {
    const MIN: u8 = 1;
    const MAX: u8 = 5;

    /// Creates a validated rating.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RatingOutOfRange`] outside `1..=5`.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::RatingOutOfRange {
                value: value.to_string(),
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Rating value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Confirming actor's verdict on completed work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReview {
    /// Final labor fee when it differs from the agreed one.
    pub actual_labor_fee: Option<Money>,
    /// Reason for the fee adjustment.
    pub adjustment_reason: Option<String>,
    /// Customer rating.
    pub rating: Option<CompletionRating>,
}

/// A worker declining an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRejection {
    /// Declining worker.
    pub worker_id: UserId,
    /// Stated reason.
    pub reason: String,
    /// Rejection timestamp.
    pub rejected_at: DateTime<Utc>,
}

/// Record of an administrative cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    /// Cancelling actor.
    pub cancelled_by: UserId,
    /// Stated reason.
    pub reason: String,
    /// Cancellation timestamp.
    pub cancelled_at: DateTime<Utc>,
}

/// A confirming actor sending completed work back for another visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRejection {
    /// Rejecting actor.
    pub rejected_by: UserId,
    /// Stated reason.
    pub reason: String,
    /// Rejection timestamp.
    pub rejected_at: DateTime<Utc>,
}
