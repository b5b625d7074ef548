//! Field task aggregate root and its guarded lifecycle transitions.

use super::{
    Actor, Assignment, AssignmentTerms, Cancellation, CheckInLocation, CheckInRecord,
    ChecklistItem, CommercialRecordId, CompletionRejection, CompletionReview, FeeCheckStatus,
    FeeNegotiation, InstallChecklist, IssueReport, IssueSeverity, Money, ScheduledVisit,
    SiteAddress, TaskAction, TaskDomainError, TaskId, TaskResult, TaskStatus, TenantId, UserId,
    ValidationError, WorkerRejection, required_text,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Kind of on-site work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    /// Measuring openings before a quote or order.
    Measurement,
    /// Installing delivered products.
    Installation,
}

impl TaskKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Measurement => "MEASUREMENT",
            Self::Installation => "INSTALLATION",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Parameter object for a freshly admitted task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFieldTask {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Kind of work.
    pub kind: TaskKind,
    /// Product category, e.g. `CURTAIN_FABRIC`.
    pub category: String,
    /// Visit site.
    pub site: SiteAddress,
    /// Originating commercial record.
    pub commercial_record: CommercialRecordId,
    /// Agreed labor fee.
    pub labor_fee: Money,
}

/// Field task aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTask {
    id: TaskId,
    tenant_id: TenantId,
    kind: TaskKind,
    category: String,
    status: TaskStatus,
    assignment: Option<Assignment>,
    site: SiteAddress,
    commercial_record: CommercialRecordId,
    labor_fee: Money,
    fee_check: FeeCheckStatus,
    negotiation: Option<FeeNegotiation>,
    issues: Vec<IssueReport>,
    check_in: Option<CheckInRecord>,
    checklist: Option<InstallChecklist>,
    result: Option<TaskResult>,
    review: Option<CompletionReview>,
    last_rejection: Option<WorkerRejection>,
    completion_rejections: Vec<CompletionRejection>,
    cancellation: Option<Cancellation>,
    split_from: Option<TaskId>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl FieldTask {
    /// Creates a task in [`TaskStatus::PendingDispatch`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::Validation`] when the category is blank.
    pub fn new(data: NewFieldTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let category = required_text(data.category, "category")?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            tenant_id: data.tenant_id,
            kind: data.kind,
            category,
            status: TaskStatus::PendingDispatch,
            assignment: None,
            site: data.site,
            commercial_record: data.commercial_record,
            labor_fee: data.labor_fee,
            fee_check: FeeCheckStatus::None,
            negotiation: None,
            issues: Vec::new(),
            check_in: None,
            checklist: None,
            result: None,
            review: None,
            last_rejection: None,
            completion_rejections: Vec::new(),
            cancellation: None,
            split_from: None,
            version: 0,
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning tenant.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the task kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the product category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the current assignment, if any.
    #[must_use]
    pub const fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// Returns the assigned worker, if any.
    #[must_use]
    pub fn assigned_worker(&self) -> Option<UserId> {
        self.assignment.as_ref().map(|assignment| assignment.worker_id)
    }

    /// Returns the scheduled visit, if any.
    #[must_use]
    pub fn scheduled_visit(&self) -> Option<ScheduledVisit> {
        self.assignment.as_ref().map(|assignment| assignment.visit)
    }

    /// Returns the visit site.
    #[must_use]
    pub const fn site(&self) -> &SiteAddress {
        &self.site
    }

    /// Returns the originating commercial record.
    #[must_use]
    pub const fn commercial_record(&self) -> CommercialRecordId {
        self.commercial_record
    }

    /// Returns the current labor fee.
    #[must_use]
    pub const fn labor_fee(&self) -> Money {
        self.labor_fee
    }

    /// Returns the fee-check status.
    #[must_use]
    pub const fn fee_check(&self) -> FeeCheckStatus {
        self.fee_check
    }

    /// Returns the latest fee negotiation, if any.
    #[must_use]
    pub const fn negotiation(&self) -> Option<&FeeNegotiation> {
        self.negotiation.as_ref()
    }

    /// Returns reported field issues, oldest first.
    #[must_use]
    pub fn issues(&self) -> &[IssueReport] {
        &self.issues
    }

    /// Returns the arrival record, if the worker checked in.
    #[must_use]
    pub const fn check_in_record(&self) -> Option<&CheckInRecord> {
        self.check_in.as_ref()
    }

    /// Returns the installation checklist as last saved.
    #[must_use]
    pub const fn checklist(&self) -> Option<&InstallChecklist> {
        self.checklist.as_ref()
    }

    /// Returns the submitted result, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&TaskResult> {
        self.result.as_ref()
    }

    /// Returns the confirming actor's review, once confirmed.
    #[must_use]
    pub const fn review(&self) -> Option<&CompletionReview> {
        self.review.as_ref()
    }

    /// Returns the most recent worker rejection, if any.
    #[must_use]
    pub const fn last_rejection(&self) -> Option<&WorkerRejection> {
        self.last_rejection.as_ref()
    }

    /// Returns every time completed work was sent back.
    #[must_use]
    pub fn completion_rejections(&self) -> &[CompletionRejection] {
        &self.completion_rejections
    }

    /// Returns the cancellation record, if cancelled.
    #[must_use]
    pub const fn cancellation(&self) -> Option<&Cancellation> {
        self.cancellation.as_ref()
    }

    /// Returns the measurement task this one was split from.
    #[must_use]
    pub const fn split_from(&self) -> Option<TaskId> {
        self.split_from
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp, once completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Checks that the task awaits dispatch and that the actor may dispatch
    /// it, without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::PendingDispatch`] and [`TaskDomainError::Forbidden`] for
    /// actors without dispatch rights.
    pub fn check_assignable(&self, actor: &Actor) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::Assign)?;
        self.ensure_role(actor, actor.role.can_dispatch(), TaskAction::Assign)
    }

    /// Commits a worker and visit, moving the task to
    /// [`TaskStatus::PendingAccept`]. A fee breakdown in the terms replaces
    /// the labor fee with its total.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::PendingDispatch`], [`TaskDomainError::Forbidden`] for
    /// actors without dispatch rights, and a validation error for an invalid
    /// fee breakdown.
    pub fn assign(
        &mut self,
        actor: &Actor,
        terms: AssignmentTerms,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.check_assignable(actor)?;
        if let Some(breakdown) = &terms.fee_breakdown {
            self.labor_fee = breakdown.total()?;
        }
        self.assignment = Some(Assignment {
            worker_id: terms.worker_id,
            visit: terms.visit,
            dispatched_by: actor.id,
            assigned_at: clock.utc(),
            soft_conflict_override: terms.soft_conflict_override,
            fee_breakdown: terms.fee_breakdown,
            logistics: terms.logistics,
        });
        self.status = TaskStatus::PendingAccept;
        self.touch(clock);
        Ok(())
    }

    /// Assigned worker takes the job.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::PendingAccept`] and [`TaskDomainError::Forbidden`] for
    /// anyone but the assigned worker.
    pub fn accept(&mut self, actor: &Actor, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::Accept)?;
        self.ensure_assigned_worker(actor, TaskAction::Accept)?;
        self.status = TaskStatus::PendingVisit;
        self.touch(clock);
        Ok(())
    }

    /// Assigned worker declines; the task returns to the schedulable pool
    /// with its worker and visit cleared.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::PendingAccept`], [`TaskDomainError::Forbidden`] for
    /// anyone but the assigned worker, and a validation error for a blank
    /// reason.
    pub fn reject(
        &mut self,
        actor: &Actor,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::Reject)?;
        self.ensure_assigned_worker(actor, TaskAction::Reject)?;
        self.last_rejection = Some(WorkerRejection {
            worker_id: actor.id,
            reason: required_text(reason, "reason")?,
            rejected_at: clock.utc(),
        });
        self.assignment = None;
        self.status = TaskStatus::PendingDispatch;
        self.touch(clock);
        Ok(())
    }

    /// Assigned worker arrives on site. Lateness is measured against the
    /// visit's expected arrival.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::PendingVisit`] and [`TaskDomainError::Forbidden`] for
    /// anyone but the assigned worker.
    pub fn check_in(
        &mut self,
        actor: &Actor,
        location: CheckInLocation,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::CheckIn)?;
        self.ensure_assigned_worker(actor, TaskAction::CheckIn)?;
        let checked_in_at = clock.utc();
        let late_minutes = self
            .scheduled_visit()
            .map_or(0, |visit| late_minutes(visit.expected_arrival(), checked_in_at));
        self.check_in = Some(CheckInRecord {
            location,
            checked_in_at,
            late_minutes,
        });
        self.status = TaskStatus::InProgress;
        self.touch(clock);
        Ok(())
    }

    /// Assigned worker saves the installation checklist, replacing the
    /// previous one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::PendingVisit`] and [`TaskStatus::InProgress`],
    /// [`TaskDomainError::WrongKind`] for measurement tasks,
    /// [`TaskDomainError::Forbidden`] for anyone but the assigned worker, and
    /// a validation error for an empty list or a blank item.
    pub fn update_checklist(
        &mut self,
        actor: &Actor,
        items: Vec<ChecklistItem>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::UpdateChecklist)?;
        self.ensure_kind(TaskKind::Installation, TaskAction::UpdateChecklist)?;
        self.ensure_assigned_worker(actor, TaskAction::UpdateChecklist)?;
        if items.is_empty() {
            return Err(ValidationError::EmptyField { field: "checklist" }.into());
        }
        let validated = items
            .into_iter()
            .map(ChecklistItem::validated)
            .collect::<Result<Vec<_>, _>>()?;
        self.checklist = Some(InstallChecklist {
            items: validated,
            updated_by: actor.id,
            updated_at: clock.utc(),
        });
        self.touch(clock);
        Ok(())
    }

    /// Assigned worker submits measurement data or installation evidence.
    /// Installations need a complete checklist first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::InProgress`], [`TaskDomainError::Forbidden`] for anyone
    /// but the assigned worker, a validation error for an empty payload, and
    /// [`TaskDomainError::ChecklistMissing`] or
    /// [`TaskDomainError::ChecklistIncomplete`] for an installation whose
    /// checklist is not done.
    pub fn submit(
        &mut self,
        actor: &Actor,
        result: TaskResult,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::Submit)?;
        self.ensure_assigned_worker(actor, TaskAction::Submit)?;
        result.validate()?;
        if self.kind == TaskKind::Installation {
            self.ensure_checklist_complete()?;
        }
        self.result = Some(result);
        self.status = TaskStatus::PendingConfirm;
        self.touch(clock);
        Ok(())
    }

    /// Assigned worker proposes a different labor fee. The lifecycle status
    /// is unchanged; the fee check becomes [`FeeCheckStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::InProgress`] and [`TaskStatus::PendingConfirm`],
    /// [`TaskDomainError::Forbidden`] for anyone but the assigned worker, and
    /// a validation error for a blank reason.
    pub fn negotiate(
        &mut self,
        actor: &Actor,
        proposed_amount: Money,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::Negotiate)?;
        self.ensure_assigned_worker(actor, TaskAction::Negotiate)?;
        self.negotiation = Some(FeeNegotiation {
            proposed_amount,
            reason: required_text(reason, "reason")?,
            requested_by: actor.id,
            requested_at: clock.utc(),
            resolved_by: None,
        });
        self.fee_check = FeeCheckStatus::Pending;
        self.touch(clock);
        Ok(())
    }

    /// Approver settles the pending negotiation. An approved proposal
    /// replaces the labor fee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] before the visit starts or
    /// after cancellation, [`TaskDomainError::Forbidden`] for roles that
    /// cannot approve fees, and [`TaskDomainError::NoPendingNegotiation`]
    /// when nothing awaits a decision.
    pub fn resolve_negotiation(
        &mut self,
        actor: &Actor,
        approved: bool,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::ResolveNegotiation)?;
        self.ensure_role(
            actor,
            actor.role.can_approve_fees(),
            TaskAction::ResolveNegotiation,
        )?;
        let task_id = self.id;
        let pending = match self.negotiation.as_mut() {
            Some(negotiation) if self.fee_check == FeeCheckStatus::Pending => negotiation,
            _ => return Err(TaskDomainError::NoPendingNegotiation(task_id)),
        };
        pending.resolved_by = Some(actor.id);
        let proposed_amount = pending.proposed_amount;
        if approved {
            self.labor_fee = proposed_amount;
            self.fee_check = FeeCheckStatus::Approved;
        } else {
            self.fee_check = FeeCheckStatus::Rejected;
        }
        self.touch(clock);
        Ok(())
    }

    /// Assigned worker attaches a field discovery. The lifecycle status is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::InProgress`] and [`TaskStatus::PendingConfirm`],
    /// [`TaskDomainError::Forbidden`] for anyone but the assigned worker, and
    /// a validation error for a blank description.
    pub fn report_issue(
        &mut self,
        actor: &Actor,
        description: impl Into<String>,
        severity: IssueSeverity,
        photos: Vec<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::ReportIssue)?;
        self.ensure_assigned_worker(actor, TaskAction::ReportIssue)?;
        self.issues.push(IssueReport {
            description: required_text(description, "description")?,
            severity,
            photos,
            reported_by: actor.id,
            reported_at: clock.utc(),
        });
        self.touch(clock);
        Ok(())
    }

    /// Confirming actor approves the work and completes the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::PendingConfirm`] and [`TaskDomainError::Forbidden`] for
    /// roles that cannot confirm work.
    pub fn confirm(
        &mut self,
        actor: &Actor,
        review: CompletionReview,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::Confirm)?;
        self.ensure_role(actor, actor.role.can_confirm(), TaskAction::Confirm)?;
        if let Some(actual_fee) = review.actual_labor_fee {
            self.labor_fee = actual_fee;
        }
        let timestamp = clock.utc();
        self.review = Some(review);
        self.status = TaskStatus::Completed;
        self.completed_at = Some(timestamp);
        self.touch(clock);
        Ok(())
    }

    /// Confirming actor sends the work back; the worker must visit again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] outside
    /// [`TaskStatus::PendingConfirm`], [`TaskDomainError::Forbidden`] for
    /// roles that cannot confirm work, and a validation error for a blank
    /// reason.
    pub fn reject_completion(
        &mut self,
        actor: &Actor,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::RejectCompletion)?;
        self.ensure_role(actor, actor.role.can_confirm(), TaskAction::RejectCompletion)?;
        self.completion_rejections.push(CompletionRejection {
            rejected_by: actor.id,
            reason: required_text(reason, "reason")?,
            rejected_at: clock.utc(),
        });
        self.status = TaskStatus::PendingVisit;
        self.touch(clock);
        Ok(())
    }

    /// Cancels the task. Terminal and irreversible.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] for terminal tasks,
    /// [`TaskDomainError::Forbidden`] for roles without dispatch rights, and a
    /// validation error for a blank reason.
    pub fn cancel(
        &mut self,
        actor: &Actor,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_permitted(TaskAction::Cancel)?;
        self.ensure_role(actor, actor.role.can_dispatch(), TaskAction::Cancel)?;
        self.cancellation = Some(Cancellation {
            cancelled_by: actor.id,
            reason: required_text(reason, "reason")?,
            cancelled_at: clock.utc(),
        });
        self.status = TaskStatus::Cancelled;
        self.touch(clock);
        Ok(())
    }

    /// Dispatcher replaces this measurement task with one pending task per
    /// category. This task is cancelled, freeing its worker's slot; the
    /// children copy its site, record and fee and point back to it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidState`] for terminal tasks,
    /// [`TaskDomainError::WrongKind`] for installations,
    /// [`TaskDomainError::Forbidden`] for roles without dispatch rights, and
    /// validation errors for a blank reason, an empty split, a blank or
    /// repeated category.
    pub fn split(
        &mut self,
        actor: &Actor,
        categories: Vec<String>,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Vec<Self>, TaskDomainError> {
        self.ensure_permitted(TaskAction::Split)?;
        self.ensure_kind(TaskKind::Measurement, TaskAction::Split)?;
        self.ensure_role(actor, actor.role.can_dispatch(), TaskAction::Split)?;
        let stated_reason = required_text(reason, "reason")?;
        if categories.is_empty() {
            return Err(ValidationError::EmptySplit.into());
        }

        let mut seen = HashSet::new();
        let mut children = Vec::with_capacity(categories.len());
        for category in categories {
            let child = self.split_child(category, clock)?;
            if !seen.insert(child.category.clone()) {
                return Err(ValidationError::DuplicateSplitCategory(child.category).into());
            }
            children.push(child);
        }

        self.cancellation = Some(Cancellation {
            cancelled_by: actor.id,
            reason: stated_reason,
            cancelled_at: clock.utc(),
        });
        self.status = TaskStatus::Cancelled;
        self.touch(clock);
        Ok(children)
    }

    fn split_child(&self, category: String, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let mut child = Self::new(
            NewFieldTask {
                tenant_id: self.tenant_id,
                kind: self.kind,
                category,
                site: self.site.clone(),
                commercial_record: self.commercial_record,
                labor_fee: self.labor_fee,
            },
            clock,
        )?;
        child.split_from = Some(self.id);
        Ok(child)
    }

    fn ensure_checklist_complete(&self) -> Result<(), TaskDomainError> {
        let checklist = self
            .checklist
            .as_ref()
            .ok_or(TaskDomainError::ChecklistMissing(self.id))?;
        if checklist.is_complete() {
            return Ok(());
        }
        Err(TaskDomainError::ChecklistIncomplete {
            task_id: self.id,
            outstanding: checklist.outstanding(),
        })
    }

    fn ensure_kind(&self, expected: TaskKind, action: TaskAction) -> Result<(), TaskDomainError> {
        if self.kind == expected {
            return Ok(());
        }
        Err(TaskDomainError::WrongKind {
            task_id: self.id,
            kind: self.kind,
            action,
        })
    }

    const fn ensure_permitted(&self, action: TaskAction) -> Result<(), TaskDomainError> {
        if action.permitted_from(self.status) {
            return Ok(());
        }
        Err(TaskDomainError::InvalidState {
            task_id: self.id,
            status: self.status,
            action,
        })
    }

    fn ensure_assigned_worker(
        &self,
        actor: &Actor,
        action: TaskAction,
    ) -> Result<(), TaskDomainError> {
        let is_assignee = self.assigned_worker() == Some(actor.id);
        self.ensure_role(actor, is_assignee, action)
    }

    const fn ensure_role(
        &self,
        actor: &Actor,
        allowed: bool,
        action: TaskAction,
    ) -> Result<(), TaskDomainError> {
        if allowed {
            return Ok(());
        }
        Err(TaskDomainError::Forbidden {
            task_id: self.id,
            actor_id: actor.id,
            action,
        })
    }

    /// Stamps the mutation time and advances the version.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
        self.version = self.version.saturating_add(1);
    }
}

fn late_minutes(expected: DateTime<Utc>, actual: DateTime<Utc>) -> u32 {
    let minutes = actual.signed_duration_since(expected).num_minutes();
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}
