//! Dispatch orchestration: admission, candidate ranking, conflict-checked
//! assignment and measurement splits.

use crate::dispatch::{
    domain::{
        AdmissionDecision, AdmissionDenial, AvailabilityGrid, AvailabilityWindow, Commitment,
        ConflictAssessment, ConflictLevel, ProposedVisit, RankedCandidate, TaskCreationRequest,
        TaskRequirement, WorkerProfile, availability, check_admission, detect, gate_installation,
        rank_candidates, score,
    },
    ports::{
        CommercialRecordSource, ConflictPolicySource, DirectoryError, LogisticsSource,
        WorkerDirectory,
    },
};
use crate::task::{
    domain::{
        Actor, AssignmentTerms, CommercialRecordId, FeeBreakdown, FieldTask, LogisticsCheck,
        NewFieldTask, OverrideAcknowledgement, ScheduledVisit, TaskAction, TaskDomainError,
        TaskId, TaskKind, TenantId, UserId, ValidationError,
    },
    ports::{
        AuditRecord, DispatchEvent, DispatchNotification, TaskRepository, TaskRepositoryError,
        WorkerDay,
    },
    services::OutboundPorts,
};
use chrono::NaiveDate;
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for dispatch operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A task domain guard rejected the action.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The actor's role may not perform the action.
    #[error("user {actor_id} may not {action} tasks")]
    Forbidden {
        /// Acting user.
        actor_id: UserId,
        /// Attempted action.
        action: TaskAction,
    },

    /// The admission gate refused the task.
    #[error("admission denied: {reason}")]
    AdmissionDenied {
        /// Denial reason.
        reason: AdmissionDenial,
        /// Whether an approver is involved.
        requires_approval: bool,
    },

    /// The proposed visit double-books the worker. Not overridable.
    #[error("hard schedule conflict: {0}")]
    Conflict(ConflictAssessment),

    /// The proposed visit is risky; resubmit with an override to proceed.
    #[error("soft schedule conflict requires override: {0}")]
    SoftConflictRequiresOverride(ConflictAssessment),

    /// Purchase orders for the installation are not in hand; resubmit with a
    /// logistics override to dispatch anyway.
    #[error("task {task_id} has outstanding purchase orders: {}", outstanding.join(", "))]
    LogisticsNotReady {
        /// Installation concerned.
        task_id: TaskId,
        /// Order references not yet received.
        outstanding: Vec<String>,
    },

    /// The worker lacks the skill the task requires.
    #[error("worker {worker_id} is not qualified for task {task_id}")]
    UnqualifiedWorker {
        /// Rejected worker.
        worker_id: UserId,
        /// Task concerned.
        task_id: TaskId,
    },

    /// No such task in the actor's tenant.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// No such worker in the actor's tenant.
    #[error("worker not found: {0}")]
    WorkerNotFound(UserId),

    /// No such commercial record in the actor's tenant.
    #[error("commercial record not found: {0}")]
    CommercialRecordNotFound(CommercialRecordId),

    /// Another writer changed the task first; reload and retry.
    #[error("task {0} was modified concurrently")]
    StaleState(TaskId),

    /// Persistence or a collaborator failed.
    #[error("infrastructure failure: {0}")]
    Infrastructure(Arc<dyn std::error::Error + Send + Sync>),
}

impl From<TaskRepositoryError> for DispatchError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::TaskNotFound(task_id),
            TaskRepositoryError::StaleState { task_id, .. } => Self::StaleState(task_id),
            other @ (TaskRepositoryError::DuplicateTask(_)
            | TaskRepositoryError::Persistence(_)) => Self::Infrastructure(Arc::new(other)),
        }
    }
}

impl From<DirectoryError> for DispatchError {
    fn from(err: DirectoryError) -> Self {
        Self::Infrastructure(Arc::new(err))
    }
}

/// Result type for dispatch service operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// A task that passed admission, with the decision that let it in.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittedTask {
    /// Stored task, in `PENDING_DISPATCH`.
    pub task: FieldTask,
    /// Admission outcome.
    pub admission: AdmissionDecision,
}

/// Request to commit a worker and visit to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAssignmentRequest {
    /// Task to assign.
    pub task_id: TaskId,
    /// Chosen worker.
    pub worker_id: UserId,
    /// Chosen date and slot.
    pub visit: ScheduledVisit,
    /// Whether the dispatcher accepts soft conflicts.
    pub override_soft_conflict: bool,
    /// Whether an installation goes out before its orders are in hand.
    pub override_logistics: bool,
    /// Labor fee itemisation replacing the task's fee.
    pub fee_breakdown: Option<FeeBreakdown>,
}

impl CommitAssignmentRequest {
    /// Creates a request without overrides or fee breakdown.
    #[must_use]
    pub const fn new(task_id: TaskId, worker_id: UserId, visit: ScheduledVisit) -> Self {
        Self {
            task_id,
            worker_id,
            visit,
            override_soft_conflict: false,
            override_logistics: false,
            fee_breakdown: None,
        }
    }

    /// Accepts soft conflicts for this commit.
    #[must_use]
    pub const fn with_soft_conflict_override(mut self) -> Self {
        self.override_soft_conflict = true;
        self
    }

    /// Dispatches an installation despite outstanding purchase orders.
    #[must_use]
    pub const fn with_logistics_override(mut self) -> Self {
        self.override_logistics = true;
        self
    }

    /// Itemises the labor fee.
    #[must_use]
    pub fn with_fee_breakdown(mut self, breakdown: FeeBreakdown) -> Self {
        self.fee_breakdown = Some(breakdown);
        self
    }
}

/// One product category carved out of a measurement task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    /// Category of the new task.
    pub category: String,
    /// Worker to dispatch the new task to, if any.
    pub worker_id: Option<UserId>,
}

impl SplitPart {
    /// Creates a part left awaiting dispatch.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            worker_id: None,
        }
    }

    /// Dispatches the part to `worker_id`.
    #[must_use]
    pub const fn assigned_to(mut self, worker_id: UserId) -> Self {
        self.worker_id = Some(worker_id);
        self
    }
}

/// Request to replace a measurement task with one task per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRequest {
    /// Measurement task to split.
    pub task_id: TaskId,
    /// New tasks, in order.
    pub parts: Vec<SplitPart>,
    /// Visit for assigned parts. Defaults to the original task's visit.
    pub visit: Option<ScheduledVisit>,
    /// Recorded as the original task's cancellation reason.
    pub reason: String,
}

impl SplitRequest {
    /// Creates a request with no parts.
    #[must_use]
    pub fn new(task_id: TaskId, reason: impl Into<String>) -> Self {
        Self {
            task_id,
            parts: Vec::new(),
            visit: None,
            reason: reason.into(),
        }
    }

    /// Appends a part.
    #[must_use]
    pub fn with_part(mut self, part: SplitPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Sets the visit for assigned parts.
    #[must_use]
    pub const fn with_visit(mut self, visit: ScheduledVisit) -> Self {
        self.visit = Some(visit);
        self
    }
}

/// Result of a measurement split.
#[derive(Debug)]
pub struct SplitOutcome {
    /// The original task, now cancelled.
    pub original: FieldTask,
    /// New tasks as stored, in request order.
    pub children: Vec<FieldTask>,
    /// Parts whose dispatch failed; those tasks stay awaiting dispatch.
    pub unassigned: Vec<(TaskId, DispatchError)>,
}

/// Read-only collaborators the dispatch service consults.
#[derive(Clone)]
pub struct DispatchSources {
    /// Worker profiles.
    pub workers: Arc<dyn WorkerDirectory>,
    /// Commercial records.
    pub records: Arc<dyn CommercialRecordSource>,
    /// Tenant conflict policies.
    pub policies: Arc<dyn ConflictPolicySource>,
    /// Purchase orders gating installations.
    pub logistics: Arc<dyn LogisticsSource>,
}

impl std::fmt::Debug for DispatchSources {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("DispatchSources").finish_non_exhaustive()
    }
}

/// Dispatch orchestration service.
#[derive(Clone)]
pub struct DispatchService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    sources: DispatchSources,
    outbound: OutboundPorts,
    grid: AvailabilityGrid,
    clock: Arc<C>,
}

impl<R, C> DispatchService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a dispatch service with the default availability grid.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        sources: DispatchSources,
        outbound: OutboundPorts,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            sources,
            outbound,
            grid: AvailabilityGrid::default(),
            clock,
        }
    }

    /// Replaces the availability grid.
    #[must_use]
    pub const fn with_availability_grid(mut self, grid: AvailabilityGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Admits and stores a new task in `PENDING_DISPATCH`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::AdmissionDenied`] when the gate refuses the
    /// task, [`DispatchError::CommercialRecordNotFound`] for an unknown
    /// record, and validation, permission or infrastructure errors otherwise.
    pub async fn create_task(
        &self,
        actor: &Actor,
        request: TaskCreationRequest,
    ) -> DispatchResult<AdmittedTask> {
        ensure_role(actor, actor.role.can_create_tasks(), TaskAction::Create)?;

        let record = self
            .sources
            .records
            .find(actor.tenant_id, request.commercial_record)
            .await?
            .ok_or(DispatchError::CommercialRecordNotFound(
                request.commercial_record,
            ))?;

        let admission = check_admission(&request, &record)?;
        if let Some(reason) = admission.reason {
            warn!(
                tenant_id = %actor.tenant_id,
                commercial_record = %request.commercial_record,
                %reason,
                requires_approval = admission.requires_approval,
                "task admission denied"
            );
            return Err(DispatchError::AdmissionDenied {
                reason,
                requires_approval: admission.requires_approval,
            });
        }

        let task = FieldTask::new(
            NewFieldTask {
                tenant_id: actor.tenant_id,
                kind: request.kind,
                category: request.category,
                site: request.site,
                commercial_record: request.commercial_record,
                labor_fee: request.labor_fee,
            },
            &*self.clock,
        )?;
        self.repository.store(&task).await?;
        info!(
            task_id = %task.id(),
            tenant_id = %task.tenant_id(),
            kind = %task.kind(),
            requires_approval = admission.requires_approval,
            "task admitted"
        );

        self.outbound
            .audit(AuditRecord::for_task(TaskAction::Create, actor.id, None, &task))
            .await;
        Ok(AdmittedTask { task, admission })
    }

    /// Ranks the tenant's qualified workers for a task.
    ///
    /// When `visit` is given, workers with a hard conflict are left out and
    /// the rest carry their conflict level. A worker who rejected the task
    /// earlier is ranked like anyone else.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::TaskNotFound`], permission or infrastructure
    /// errors.
    pub async fn rank_candidates(
        &self,
        actor: &Actor,
        task_id: TaskId,
        visit: Option<ScheduledVisit>,
    ) -> DispatchResult<Vec<RankedCandidate>> {
        ensure_role(actor, actor.role.can_dispatch(), TaskAction::Assign)?;
        let task = self.load_task(actor, task_id).await?;
        let workers = self.sources.workers.list(actor.tenant_id).await?;
        let requirement = TaskRequirement::for_category(task.category());
        let ranked = rank_candidates(&workers, requirement, task.site().coordinate());

        let Some(proposed_visit) = visit else {
            debug!(%task_id, candidates = ranked.len(), "candidates ranked");
            return Ok(ranked);
        };

        let mut annotated = Vec::with_capacity(ranked.len());
        for mut candidate in ranked {
            let assessment = self
                .assess(actor.tenant_id, candidate.worker_id, &task, proposed_visit)
                .await?;
            if assessment.level() == ConflictLevel::Hard {
                continue;
            }
            candidate.conflict = Some(assessment.level());
            annotated.push(candidate);
        }
        debug!(
            %task_id,
            visit = %proposed_visit,
            candidates = annotated.len(),
            "candidates ranked for visit"
        );
        Ok(annotated)
    }

    /// Previews the conflict a commit would meet, without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::TaskNotFound`],
    /// [`DispatchError::WorkerNotFound`], permission or infrastructure errors.
    pub async fn assess_assignment(
        &self,
        actor: &Actor,
        task_id: TaskId,
        worker_id: UserId,
        visit: ScheduledVisit,
    ) -> DispatchResult<ConflictAssessment> {
        ensure_role(actor, actor.role.can_dispatch(), TaskAction::Assign)?;
        let task = self.load_task(actor, task_id).await?;
        self.load_worker(actor.tenant_id, worker_id).await?;
        self.assess(actor.tenant_id, worker_id, &task, visit).await
    }

    /// Commits a worker and visit to a task awaiting dispatch.
    ///
    /// The conflict check runs inside the repository's schedule-guarded
    /// write, so two commits for the same worker day never both see a free
    /// calendar. The write is version checked against the task as read.
    /// Installations must also pass the logistics gate.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Conflict`] on a hard conflict,
    /// [`DispatchError::SoftConflictRequiresOverride`] on a soft conflict
    /// without override, [`DispatchError::LogisticsNotReady`] for an
    /// installation with outstanding orders and no override,
    /// [`DispatchError::UnqualifiedWorker`] for a worker scoring zero,
    /// [`DispatchError::StaleState`] when the task changed concurrently, and
    /// domain, lookup or infrastructure errors otherwise.
    pub async fn commit_assignment(
        &self,
        actor: &Actor,
        request: CommitAssignmentRequest,
    ) -> DispatchResult<FieldTask> {
        let CommitAssignmentRequest {
            task_id,
            worker_id,
            visit,
            override_soft_conflict,
            override_logistics,
            fee_breakdown,
        } = request;

        let before = self.load_task(actor, task_id).await?;
        before.check_assignable(actor)?;

        let worker = self.load_worker(actor.tenant_id, worker_id).await?;
        let suitability = score(&worker, TaskRequirement::for_category(before.category()));
        if !suitability.is_qualified() {
            warn!(%task_id, %worker_id, "dispatch rejected: worker lacks the required skill");
            return Err(DispatchError::UnqualifiedWorker { worker_id, task_id });
        }

        let mut terms = AssignmentTerms::new(worker_id, visit);
        if let Some(check) = self.check_logistics(actor, &before, override_logistics).await? {
            terms = terms.with_logistics(check);
        }
        if let Some(breakdown) = fee_breakdown {
            terms = terms.with_fee_breakdown(breakdown);
        }

        let policy = self.sources.policies.policy_for(actor.tenant_id).await?;
        let proposed = ProposedVisit::new(visit, before.site().coordinate());
        let dispatcher = *actor;
        let clock = Arc::clone(&self.clock);
        let mut draft = before.clone();
        let outcome = self
            .repository
            .update_scheduled(
                WorkerDay::new(actor.tenant_id, worker_id, visit.date),
                before.version(),
                move |scheduled| {
                    let commitments: Vec<Commitment> =
                        scheduled.iter().filter_map(Commitment::from_task).collect();
                    let assessment = detect(&commitments, &proposed, &policy);
                    match assessment.level() {
                        ConflictLevel::Hard => return Err(DispatchError::Conflict(assessment)),
                        ConflictLevel::Soft if !override_soft_conflict => {
                            return Err(DispatchError::SoftConflictRequiresOverride(assessment));
                        }
                        ConflictLevel::Soft => {
                            terms = terms.with_soft_conflict_override(OverrideAcknowledgement {
                                acknowledged_by: dispatcher.id,
                                warnings: assessment.warnings(),
                            });
                        }
                        ConflictLevel::None => {}
                    }
                    draft.assign(&dispatcher, terms, &*clock)?;
                    Ok(draft)
                },
            )
            .await?;

        let task = match outcome {
            Ok(assigned) => assigned,
            Err(refusal) => {
                match &refusal {
                    DispatchError::Conflict(assessment) => {
                        warn!(
                            %task_id,
                            %worker_id,
                            %assessment,
                            "dispatch rejected: hard conflict"
                        );
                    }
                    DispatchError::SoftConflictRequiresOverride(assessment) => {
                        warn!(%task_id, %worker_id, %assessment, "dispatch held: soft conflict");
                    }
                    other => warn!(%task_id, %worker_id, error = %other, "dispatch rejected"),
                }
                return Err(refusal);
            }
        };

        let acknowledgement = task
            .assignment()
            .and_then(|assignment| assignment.soft_conflict_override.clone());
        info!(
            %task_id,
            tenant_id = %task.tenant_id(),
            %worker_id,
            %visit,
            score = suitability.value(),
            overridden = acknowledgement.is_some(),
            labor_fee = task.labor_fee().minor_units(),
            status = %task.status(),
            "assignment committed"
        );

        self.outbound
            .audit(AuditRecord::for_task(
                TaskAction::Assign,
                actor.id,
                Some(&before),
                &task,
            ))
            .await;
        let event = match acknowledgement {
            Some(acknowledgement) => DispatchEvent::SoftConflictOverridden {
                visit,
                warnings: acknowledgement.warnings,
            },
            None => DispatchEvent::Assigned { visit },
        };
        self.outbound
            .notify(DispatchNotification {
                task_id,
                tenant_id: task.tenant_id(),
                recipient: worker_id,
                event,
            })
            .await;
        Ok(task)
    }

    /// Replaces a measurement task with one task per category.
    ///
    /// The original is cancelled and the new tasks are stored awaiting
    /// dispatch. Parts naming a worker are then committed one by one at the
    /// request's visit, or the original's when the request has none; a
    /// failed commit leaves that task awaiting dispatch and is reported in
    /// [`SplitOutcome::unassigned`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::TaskNotFound`], a validation error for
    /// repeated categories or workers or a missing visit, a domain error for
    /// a task that cannot be split, [`DispatchError::StaleState`] when the
    /// original changed concurrently, and permission or infrastructure
    /// errors.
    pub async fn split_measurement(
        &self,
        actor: &Actor,
        request: SplitRequest,
    ) -> DispatchResult<SplitOutcome> {
        ensure_role(actor, actor.role.can_dispatch(), TaskAction::Split)?;
        let SplitRequest {
            task_id,
            parts,
            visit,
            reason,
        } = request;

        let mut workers = HashSet::new();
        for worker_id in parts.iter().filter_map(|part| part.worker_id) {
            if !workers.insert(worker_id) {
                return Err(ValidationError::DuplicateSplitWorker(worker_id).into());
            }
        }

        let before = self.load_task(actor, task_id).await?;
        let shared_visit = visit.or_else(|| before.scheduled_visit());
        if !workers.is_empty() && shared_visit.is_none() {
            return Err(ValidationError::SplitVisitMissing.into());
        }

        let mut original = before.clone();
        let categories = parts.iter().map(|part| part.category.clone()).collect();
        let children = original.split(actor, categories, reason, &*self.clock)?;
        self.repository.update(&original, before.version()).await?;
        for child in &children {
            self.repository.store(child).await?;
        }
        info!(
            %task_id,
            tenant_id = %original.tenant_id(),
            parts = children.len(),
            "measurement task split"
        );

        self.outbound
            .audit(AuditRecord::for_task(
                TaskAction::Split,
                actor.id,
                Some(&before),
                &original,
            ))
            .await;
        for child in &children {
            self.outbound
                .audit(AuditRecord::for_task(TaskAction::Create, actor.id, None, child))
                .await;
        }

        let mut settled = Vec::with_capacity(children.len());
        let mut unassigned = Vec::new();
        for (child, part) in children.into_iter().zip(parts) {
            let (Some(worker_id), Some(part_visit)) = (part.worker_id, shared_visit) else {
                settled.push(child);
                continue;
            };
            let commit = CommitAssignmentRequest::new(child.id(), worker_id, part_visit);
            match self.commit_assignment(actor, commit).await {
                Ok(assigned) => settled.push(assigned),
                Err(err) => {
                    warn!(
                        task_id = %child.id(),
                        %worker_id,
                        error = %err,
                        "split part left undispatched"
                    );
                    unassigned.push((child.id(), err));
                    settled.push(child);
                }
            }
        }

        Ok(SplitOutcome {
            original,
            children: settled,
            unassigned,
        })
    }

    /// Lists candidate windows on `date` and whether the worker is free for
    /// each. Dispatchers may query any worker; a worker may query themself.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::WorkerNotFound`], validation, permission or
    /// infrastructure errors.
    pub async fn worker_availability(
        &self,
        actor: &Actor,
        worker_id: UserId,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> DispatchResult<Vec<AvailabilityWindow>> {
        let allowed = actor.role.can_dispatch() || actor.id == worker_id;
        ensure_role(actor, allowed, TaskAction::Assign)?;
        self.load_worker(actor.tenant_id, worker_id).await?;
        let commitments = self.commitments(actor.tenant_id, worker_id, date).await?;
        Ok(availability(
            &commitments,
            date,
            duration_minutes,
            &self.grid,
        )?)
    }

    async fn check_logistics(
        &self,
        actor: &Actor,
        task: &FieldTask,
        override_logistics: bool,
    ) -> DispatchResult<Option<LogisticsCheck>> {
        if task.kind() != TaskKind::Installation {
            return Ok(None);
        }
        let orders = self
            .sources
            .logistics
            .purchase_orders(actor.tenant_id, task.commercial_record())
            .await?;
        let forced_by = override_logistics.then_some(actor.id);
        match gate_installation(&orders, forced_by) {
            Ok(check) => {
                if check.forced_by.is_some() {
                    warn!(
                        task_id = %task.id(),
                        outstanding = check.outstanding_orders.len(),
                        "installation forced out before supplies arrived"
                    );
                }
                Ok(Some(check))
            }
            Err(shortfall) => {
                warn!(
                    task_id = %task.id(),
                    outstanding = shortfall.outstanding.len(),
                    "dispatch held: purchase orders outstanding"
                );
                Err(DispatchError::LogisticsNotReady {
                    task_id: task.id(),
                    outstanding: shortfall.outstanding,
                })
            }
        }
    }

    async fn load_task(&self, actor: &Actor, task_id: TaskId) -> DispatchResult<FieldTask> {
        self.repository
            .find_by_id(actor.tenant_id, task_id)
            .await?
            .ok_or(DispatchError::TaskNotFound(task_id))
    }

    async fn load_worker(
        &self,
        tenant_id: TenantId,
        worker_id: UserId,
    ) -> DispatchResult<WorkerProfile> {
        self.sources
            .workers
            .find(tenant_id, worker_id)
            .await?
            .ok_or(DispatchError::WorkerNotFound(worker_id))
    }

    async fn commitments(
        &self,
        tenant_id: TenantId,
        worker_id: UserId,
        date: NaiveDate,
    ) -> DispatchResult<Vec<Commitment>> {
        let tasks = self
            .repository
            .find_commitments(tenant_id, worker_id, date)
            .await?;
        Ok(tasks.iter().filter_map(Commitment::from_task).collect())
    }

    async fn assess(
        &self,
        tenant_id: TenantId,
        worker_id: UserId,
        task: &FieldTask,
        visit: ScheduledVisit,
    ) -> DispatchResult<ConflictAssessment> {
        let commitments = self.commitments(tenant_id, worker_id, visit.date).await?;
        let policy = self.sources.policies.policy_for(tenant_id).await?;
        let proposed = ProposedVisit::new(visit, task.site().coordinate());
        let assessment = detect(&commitments, &proposed, &policy);
        debug!(
            task_id = %task.id(),
            %worker_id,
            %visit,
            commitments = commitments.len(),
            %assessment,
            "conflict assessed"
        );
        Ok(assessment)
    }
}

const fn ensure_role(actor: &Actor, allowed: bool, action: TaskAction) -> DispatchResult<()> {
    if allowed {
        return Ok(());
    }
    Err(DispatchError::Forbidden {
        actor_id: actor.id,
        action,
    })
}
