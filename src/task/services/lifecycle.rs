//! Service layer driving worker and confirmer actions on field tasks.

use super::OutboundPorts;
use crate::task::{
    domain::{
        Actor, CheckInLocation, ChecklistItem, CompletionReview, FieldTask, IssueSeverity, Money,
        TaskAction, TaskDomainError, TaskId, TaskResult,
    },
    ports::{
        AuditRecord, DispatchEvent, DispatchNotification, LaborFeePosting, TaskRepository,
        TaskRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// A domain guard rejected the action.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// No task with this identifier exists in the actor's tenant.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Another writer changed the task first; reload and retry.
    #[error("task {0} was modified concurrently")]
    StaleState(TaskId),

    /// Persistence failed.
    #[error(transparent)]
    Infrastructure(TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(task_id) => Self::NotFound(task_id),
            TaskRepositoryError::StaleState { task_id, .. } => Self::StaleState(task_id),
            other @ (TaskRepositoryError::DuplicateTask(_)
            | TaskRepositoryError::Persistence(_)) => Self::Infrastructure(other),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    outbound: OutboundPorts,
    clock: Arc<C>,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, outbound: OutboundPorts, clock: Arc<C>) -> Self {
        Self {
            repository,
            outbound,
            clock,
        }
    }

    /// Retrieves a task visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// in the actor's tenant.
    pub async fn find_by_id(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> TaskLifecycleResult<FieldTask> {
        self.repository
            .find_by_id(actor.tenant_id, task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Assigned worker accepts the job.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn accept(&self, actor: &Actor, task_id: TaskId) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::Accept, |task, clock| {
                task.accept(actor, clock)
            })
            .await?;
        Ok(task)
    }

    /// Assigned worker declines; the task returns to the dispatch pool and the
    /// dispatcher is notified.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn reject(
        &self,
        actor: &Actor,
        task_id: TaskId,
        reason: impl Into<String> + Send,
    ) -> TaskLifecycleResult<FieldTask> {
        let stated_reason = reason.into();
        let (before, task) = self
            .transition(actor, task_id, TaskAction::Reject, |task, clock| {
                task.reject(actor, stated_reason.clone(), clock)
            })
            .await?;

        if let Some(assignment) = before.assignment() {
            self.outbound
                .notify(DispatchNotification {
                    task_id,
                    tenant_id: task.tenant_id(),
                    recipient: assignment.dispatched_by,
                    event: DispatchEvent::WorkerRejected {
                        reason: stated_reason,
                    },
                })
                .await;
        }
        Ok(task)
    }

    /// Assigned worker arrives on site.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn check_in(
        &self,
        actor: &Actor,
        task_id: TaskId,
        location: CheckInLocation,
    ) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::CheckIn, |task, clock| {
                task.check_in(actor, location, clock)
            })
            .await?;
        if let Some(record) = task.check_in_record().filter(|record| record.late_minutes > 0) {
            info!(%task_id, late_minutes = record.late_minutes, "worker checked in late");
        }
        Ok(task)
    }

    /// Assigned installer records the installation checklist, replacing any
    /// earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn update_checklist(
        &self,
        actor: &Actor,
        task_id: TaskId,
        items: Vec<ChecklistItem>,
    ) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::UpdateChecklist, |task, clock| {
                task.update_checklist(actor, items, clock)
            })
            .await?;
        if let Some(checklist) = task.checklist() {
            info!(
                %task_id,
                outstanding = checklist.outstanding().len(),
                "installation checklist updated"
            );
        }
        Ok(task)
    }

    /// Assigned worker submits the visit result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn submit(
        &self,
        actor: &Actor,
        task_id: TaskId,
        result: TaskResult,
    ) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::Submit, |task, clock| {
                task.submit(actor, result, clock)
            })
            .await?;
        Ok(task)
    }

    /// Assigned worker proposes a different labor fee.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn negotiate(
        &self,
        actor: &Actor,
        task_id: TaskId,
        proposed_amount: Money,
        reason: impl Into<String> + Send,
    ) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::Negotiate, |task, clock| {
                task.negotiate(actor, proposed_amount, reason, clock)
            })
            .await?;
        Ok(task)
    }

    /// Approver settles the pending fee negotiation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn resolve_negotiation(
        &self,
        actor: &Actor,
        task_id: TaskId,
        approved: bool,
    ) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::ResolveNegotiation, |task, clock| {
                task.resolve_negotiation(actor, approved, clock)
            })
            .await?;
        Ok(task)
    }

    /// Assigned worker records a field discovery.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn report_issue(
        &self,
        actor: &Actor,
        task_id: TaskId,
        description: impl Into<String> + Send,
        severity: IssueSeverity,
        photos: Vec<String>,
    ) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::ReportIssue, |task, clock| {
                task.report_issue(actor, description, severity, photos, clock)
            })
            .await?;
        Ok(task)
    }

    /// Confirming actor completes the task and posts the labor fee to the
    /// ledger.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn confirm(
        &self,
        actor: &Actor,
        task_id: TaskId,
        review: CompletionReview,
    ) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::Confirm, |task, clock| {
                task.confirm(actor, review, clock)
            })
            .await?;

        match (task.assigned_worker(), task.completed_at()) {
            (Some(worker_id), Some(completed_at)) => {
                self.outbound
                    .post(LaborFeePosting {
                        task_id,
                        tenant_id: task.tenant_id(),
                        worker_id,
                        labor_fee: task.labor_fee(),
                        completed_at,
                    })
                    .await;
            }
            _ => warn!(%task_id, "completed task has no worker to pay"),
        }
        Ok(task)
    }

    /// Confirming actor sends the work back for another visit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn reject_completion(
        &self,
        actor: &Actor,
        task_id: TaskId,
        reason: impl Into<String> + Send,
    ) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::RejectCompletion, |task, clock| {
                task.reject_completion(actor, reason, clock)
            })
            .await?;
        Ok(task)
    }

    /// Cancels a non-terminal task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when the task is missing, a guard
    /// fails, or the write loses a concurrent race.
    pub async fn cancel(
        &self,
        actor: &Actor,
        task_id: TaskId,
        reason: impl Into<String> + Send,
    ) -> TaskLifecycleResult<FieldTask> {
        let (_, task) = self
            .transition(actor, task_id, TaskAction::Cancel, |task, clock| {
                task.cancel(actor, reason, clock)
            })
            .await?;
        Ok(task)
    }

    /// Loads, mutates and writes back one task under its version guard, then
    /// emits the audit record. Returns the task before and after.
    async fn transition<F>(
        &self,
        actor: &Actor,
        task_id: TaskId,
        action: TaskAction,
        mutate: F,
    ) -> TaskLifecycleResult<(FieldTask, FieldTask)>
    where
        F: FnOnce(&mut FieldTask, &C) -> Result<(), TaskDomainError> + Send,
    {
        let before = self.find_by_id(actor, task_id).await?;
        let expected_version = before.version();
        let mut task = before.clone();
        if let Err(err) = mutate(&mut task, &*self.clock) {
            warn!(%task_id, %action, actor_id = %actor.id, error = %err, "task action rejected");
            return Err(err.into());
        }

        self.repository.update(&task, expected_version).await?;
        info!(
            %task_id,
            tenant_id = %task.tenant_id(),
            %action,
            status = %task.status(),
            "task transition committed"
        );

        self.outbound
            .audit(AuditRecord::for_task(action, actor.id, Some(&before), &task))
            .await;
        Ok((before, task))
    }
}
