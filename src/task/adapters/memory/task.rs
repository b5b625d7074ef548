//! In-memory repository for field task tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{FieldTask, TaskId, TenantId, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, WorkerDay},
};

/// Thread-safe in-memory task repository.
///
/// Schedule-guarded writes hold the write lock from the commitment read to
/// the version-checked replace.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, FieldTask>,
    worker_index: HashMap<(TenantId, UserId), Vec<TaskId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn worker_key(task: &FieldTask) -> Option<(TenantId, UserId)> {
    task.assigned_worker()
        .map(|worker_id| (task.tenant_id(), worker_id))
}

fn index_worker(state: &mut InMemoryTaskState, task: &FieldTask) {
    if let Some(key) = worker_key(task) {
        let ids = state.worker_index.entry(key).or_default();
        if !ids.contains(&task.id()) {
            ids.push(task.id());
        }
    }
}

/// Removes a task ID from the worker index, cleaning up the entry if empty.
fn unindex_worker(state: &mut InMemoryTaskState, task: &FieldTask) {
    let Some(key) = worker_key(task) else {
        return;
    };
    if let Some(ids) = state.worker_index.get_mut(&key) {
        ids.retain(|id| *id != task.id());
        if ids.is_empty() {
            state.worker_index.remove(&key);
        }
    }
}

fn commitments_on(state: &InMemoryTaskState, worker_day: WorkerDay) -> Vec<FieldTask> {
    state
        .worker_index
        .get(&(worker_day.tenant_id, worker_day.worker_id))
        .map(|ids| {
            ids.iter()
                .filter_map(|id| state.tasks.get(id))
                .filter(|task| task.status().holds_commitment())
                .filter(|task| {
                    task.scheduled_visit()
                        .is_some_and(|visit| visit.date == worker_day.date)
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn replace_versioned(
    state: &mut InMemoryTaskState,
    task: &FieldTask,
    expected_version: u64,
) -> TaskRepositoryResult<()> {
    let old_task = state
        .tasks
        .get(&task.id())
        .filter(|stored| stored.tenant_id() == task.tenant_id())
        .ok_or(TaskRepositoryError::NotFound(task.id()))?
        .clone();
    if old_task.version() != expected_version {
        return Err(TaskRepositoryError::StaleState {
            task_id: task.id(),
            expected: expected_version,
            found: old_task.version(),
        });
    }

    unindex_worker(state, &old_task);
    index_worker(state, task);
    state.tasks.insert(task.id(), task.clone());
    Ok(())
}

fn lock_poisoned(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &FieldTask) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        index_worker(&mut state, task);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &FieldTask, expected_version: u64) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        replace_versioned(&mut state, task, expected_version)
    }

    async fn update_scheduled<F, E>(
        &self,
        worker_day: WorkerDay,
        expected_version: u64,
        decide: F,
    ) -> TaskRepositoryResult<Result<FieldTask, E>>
    where
        F: FnOnce(&[FieldTask]) -> Result<FieldTask, E> + Send + 'static,
        E: Send + 'static,
    {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let commitments = commitments_on(&state, worker_day);
        let task = match decide(&commitments) {
            Ok(task) => task,
            Err(refusal) => return Ok(Err(refusal)),
        };
        replace_versioned(&mut state, &task, expected_version)?;
        Ok(Ok(task))
    }

    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<FieldTask>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .tasks
            .get(&id)
            .filter(|task| task.tenant_id() == tenant_id)
            .cloned())
    }

    async fn find_commitments(
        &self,
        tenant_id: TenantId,
        worker_id: UserId,
        date: NaiveDate,
    ) -> TaskRepositoryResult<Vec<FieldTask>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(commitments_on(
            &state,
            WorkerDay::new(tenant_id, worker_id, date),
        ))
    }
}
