//! Repository port for field task persistence and commitment lookup.

use crate::task::domain::{FieldTask, TaskId, TenantId, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// One worker's calendar for one day within a tenant.
///
/// Schedule-guarded writes serialise on this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerDay {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Worker whose calendar is read.
    pub worker_id: UserId,
    /// Calendar date.
    pub date: NaiveDate,
}

impl WorkerDay {
    /// Creates a worker-day key.
    #[must_use]
    pub const fn new(tenant_id: TenantId, worker_id: UserId, date: NaiveDate) -> Self {
        Self {
            tenant_id,
            worker_id,
            date,
        }
    }
}

/// Task persistence contract.
///
/// Every lookup is tenant scoped: a task owned by another tenant is reported
/// as absent.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &FieldTask) -> TaskRepositoryResult<()>;

    /// Replaces a stored task, provided the stored version still equals
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::StaleState`] when another writer committed
    /// first.
    async fn update(&self, task: &FieldTask, expected_version: u64) -> TaskRepositoryResult<()>;

    /// Reads the worker's commitments for `worker_day`, lets `decide` build
    /// the task to write from them, and stores it version checked against
    /// `expected_version`.
    ///
    /// The read and the write are atomic with respect to every other call
    /// for the same worker day, across repository handles and processes
    /// sharing the store. When `decide` refuses, nothing is written and its
    /// error comes back in the inner result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::StaleState`] when another writer committed
    /// first.
    async fn update_scheduled<F, E>(
        &self,
        worker_day: WorkerDay,
        expected_version: u64,
        decide: F,
    ) -> TaskRepositoryResult<Result<FieldTask, E>>
    where
        F: FnOnce(&[FieldTask]) -> Result<FieldTask, E> + Send + 'static,
        E: Send + 'static;

    /// Finds a task by identifier within a tenant.
    ///
    /// Returns `None` when the task does not exist in that tenant.
    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<FieldTask>>;

    /// Returns the worker's tasks scheduled on `date` that still occupy the
    /// worker's calendar.
    async fn find_commitments(
        &self,
        tenant_id: TenantId,
        worker_id: UserId,
        date: NaiveDate,
    ) -> TaskRepositoryResult<Vec<FieldTask>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored version moved on since the task was read.
    #[error("task {task_id} was modified concurrently: expected version {expected}, found {found}")]
    StaleState {
        /// Task identifier.
        task_id: TaskId,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
