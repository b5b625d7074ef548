//! Racing writers against one worker's schedule and one task's version.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use fieldops::dispatch::services::{
    CommitAssignmentRequest, DispatchError, DispatchService, DispatchSources,
};
use fieldops::dispatch::{
    adapters::memory::{InMemoryLogisticsSource, InMemoryWorkerDirectory, StaticConflictPolicies},
    domain::{ConflictPolicy, SkillTag, WorkerProfile},
};
use fieldops::task::adapters::memory::InMemoryTaskRepository;
use fieldops::task::domain::{FieldTask, TaskDomainError, TaskId, TaskStatus, TenantId, UserId};
use fieldops::task::ports::{TaskRepository, TaskRepositoryResult, WorkerDay};
use fieldops::task::services::{OutboundPorts, TaskLifecycleError};
use rstest::rstest;

use super::helpers::{Fixture, fixture, lake_site, visit};

/// Repository handle whose reads stall, so concurrent commits all finish
/// their lookups before any of them writes.
#[derive(Debug, Clone)]
struct SlowReads {
    inner: InMemoryTaskRepository,
    delay: Duration,
}

impl SlowReads {
    fn over(inner: &InMemoryTaskRepository) -> Self {
        Self {
            inner: inner.clone(),
            delay: Duration::from_millis(100),
        }
    }
}

#[async_trait]
impl TaskRepository for SlowReads {
    async fn store(&self, task: &FieldTask) -> TaskRepositoryResult<()> {
        self.inner.store(task).await
    }

    async fn update(&self, task: &FieldTask, expected_version: u64) -> TaskRepositoryResult<()> {
        self.inner.update(task, expected_version).await
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
        self.inner
            .update_scheduled(worker_day, expected_version, decide)
            .await
    }

    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<FieldTask>> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_by_id(tenant_id, id).await
    }

    async fn find_commitments(
        &self,
        tenant_id: TenantId,
        worker_id: UserId,
        date: NaiveDate,
    ) -> TaskRepositoryResult<Vec<FieldTask>> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_commitments(tenant_id, worker_id, date).await
    }
}

fn is_lost_race(result: &Result<FieldTask, DispatchError>) -> bool {
    matches!(
        result,
        Err(DispatchError::StaleState(_)
            | DispatchError::Domain(TaskDomainError::InvalidState { .. }))
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_commits_for_one_worker_admit_exactly_one(fixture: Fixture) {
    let first = fixture.create_task(lake_site()).await;
    let second = fixture.create_task(lake_site()).await;
    let worker_id = fixture.worker.id;

    let first_handle = tokio::spawn({
        let dispatch = Arc::clone(&fixture.dispatch);
        let actor = fixture.dispatcher;
        let request = CommitAssignmentRequest::new(first.id(), worker_id, visit("09:00-12:00"));
        async move { dispatch.commit_assignment(&actor, request).await }
    });
    let second_handle = tokio::spawn({
        let dispatch = Arc::clone(&fixture.dispatch);
        let actor = fixture.second_dispatcher;
        let request = CommitAssignmentRequest::new(second.id(), worker_id, visit("10:00-11:00"))
            .with_soft_conflict_override();
        async move { dispatch.commit_assignment(&actor, request).await }
    });

    let outcomes = [
        first_handle.await.expect("first commit task"),
        second_handle.await.expect("second commit task"),
    ];

    let committed = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let refused = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(DispatchError::Conflict(_))))
        .count();
    assert_eq!((committed, refused), (1, 1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_service_instances_never_double_book(fixture: Fixture) {
    let workers = InMemoryWorkerDirectory::new();
    workers
        .upsert(WorkerProfile::new(
            fixture.worker.id,
            fixture.tenant,
            "Chen",
            [SkillTag::Curtain],
        ))
        .expect("upsert worker");
    let build = || {
        Arc::new(DispatchService::new(
            Arc::new(SlowReads::over(&fixture.repository)),
            DispatchSources {
                workers: Arc::new(workers.clone()),
                records: Arc::new(fixture.records.clone()),
                policies: Arc::new(StaticConflictPolicies::new(ConflictPolicy::default())),
                logistics: Arc::new(InMemoryLogisticsSource::new()),
            },
            OutboundPorts::logging(),
            Arc::clone(&fixture.clock),
        ))
    };
    let (east, west) = (build(), build());
    let first = fixture.create_task(lake_site()).await;
    let second = fixture.create_task(lake_site()).await;

    let east_handle = tokio::spawn({
        let actor = fixture.dispatcher;
        let request =
            CommitAssignmentRequest::new(first.id(), fixture.worker.id, visit("09:00-12:00"));
        async move { east.commit_assignment(&actor, request).await }
    });
    let west_handle = tokio::spawn({
        let actor = fixture.second_dispatcher;
        let request =
            CommitAssignmentRequest::new(second.id(), fixture.worker.id, visit("10:00-11:00"))
                .with_soft_conflict_override();
        async move { west.commit_assignment(&actor, request).await }
    });
    let outcomes = [
        east_handle.await.expect("east commit task"),
        west_handle.await.expect("west commit task"),
    ];

    let committed = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let refused = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(DispatchError::Conflict(_))))
        .count();
    assert_eq!((committed, refused), (1, 1));
    let booked = fixture
        .repository
        .find_commitments(fixture.tenant, fixture.worker.id, visit("MORNING").date)
        .await
        .expect("commitments");
    assert_eq!(booked.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_task_committed_to_two_workers_keeps_one_assignment(fixture: Fixture) {
    let task = fixture.create_task(lake_site()).await;

    let handles = [fixture.worker.id, fixture.backup_worker.id].map(|worker_id| {
        let dispatch = Arc::clone(&fixture.dispatch);
        let actor = fixture.dispatcher;
        let request = CommitAssignmentRequest::new(task.id(), worker_id, visit("MORNING"));
        tokio::spawn(async move { dispatch.commit_assignment(&actor, request).await })
    });
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.expect("commit task"));
    }

    let winners: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().ok())
        .collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(outcomes.iter().filter(|outcome| is_lost_race(outcome)).count(), 1);

    let stored = fixture
        .lifecycle
        .find_by_id(&fixture.admin, task.id())
        .await
        .expect("reload");
    assert_eq!(stored.version(), 1);
    assert_eq!(
        stored.assigned_worker(),
        winners.first().and_then(|winner| winner.assigned_worker())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_accept_and_reject_apply_once(fixture: Fixture) {
    let task = fixture.create_task(lake_site()).await;
    fixture
        .dispatch
        .commit_assignment(
            &fixture.dispatcher,
            CommitAssignmentRequest::new(task.id(), fixture.worker.id, visit("MORNING")),
        )
        .await
        .expect("assign");

    let accept = tokio::spawn({
        let lifecycle = Arc::clone(&fixture.lifecycle);
        let actor = fixture.worker;
        let task_id = task.id();
        async move { lifecycle.accept(&actor, task_id).await }
    });
    let reject = tokio::spawn({
        let lifecycle = Arc::clone(&fixture.lifecycle);
        let actor = fixture.worker;
        let task_id = task.id();
        async move { lifecycle.reject(&actor, task_id, "double booked elsewhere").await }
    });
    let outcomes = [
        accept.await.expect("accept task"),
        reject.await.expect("reject task"),
    ];

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|outcome| matches!(
        outcome,
        Err(TaskLifecycleError::StaleState(_)
            | TaskLifecycleError::Domain(TaskDomainError::InvalidState { .. }))
    )));

    let stored = fixture
        .lifecycle
        .find_by_id(&fixture.admin, task.id())
        .await
        .expect("reload");
    assert!(matches!(
        stored.status(),
        TaskStatus::PendingVisit | TaskStatus::PendingDispatch
    ));
    assert_eq!(stored.version(), 2);
}
