//! In-memory integration tests for admission and assignment.

use fieldops::dispatch::{
    domain::{
        AdmissionDenial, CommercialRecord, ConflictLevel, DepositState, FeeWaiverState,
        TaskCreationRequest,
    },
    services::{CommitAssignmentRequest, DispatchError},
};
use fieldops::task::domain::{CommercialRecordId, TaskAction, TaskKind, TaskStatus};
use rstest::rstest;

use super::helpers::{Fixture, fixture, lake_site, north_site, visit, visit_day};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approved_fee_waiver_admits_with_approval(fixture: Fixture) {
    let waived = CommercialRecord {
        id: CommercialRecordId::new(),
        tenant_id: fixture.tenant,
        deposit: DepositState::Unpaid,
        fee_waiver: FeeWaiverState::Approved,
    };
    fixture.records.upsert(waived).expect("upsert record");
    let request =
        TaskCreationRequest::new(TaskKind::Measurement, "CURTAIN_FABRIC", lake_site(), waived.id)
            .with_fee_waived();

    let admitted = fixture
        .dispatch
        .create_task(&fixture.dispatcher, request)
        .await
        .expect("waived measurement admitted");

    assert!(admitted.admission.eligible);
    assert!(admitted.admission.requires_approval);
    assert_eq!(admitted.task.status(), TaskStatus::PendingDispatch);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pending_fee_waiver_blocks_creation(fixture: Fixture) {
    let pending = CommercialRecord {
        id: CommercialRecordId::new(),
        tenant_id: fixture.tenant,
        deposit: DepositState::Paid,
        fee_waiver: FeeWaiverState::Pending,
    };
    fixture.records.upsert(pending).expect("upsert record");
    let request =
        TaskCreationRequest::new(TaskKind::Measurement, "CURTAIN_FABRIC", lake_site(), pending.id)
            .with_fee_waived();

    let result = fixture.dispatch.create_task(&fixture.sales, request).await;

    assert!(matches!(
        result,
        Err(DispatchError::AdmissionDenied {
            reason: AdmissionDenial::FeeWaiverAwaitingApproval,
            requires_approval: true,
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_task_is_requeued_and_reassigned(fixture: Fixture) {
    let task = fixture.create_task(lake_site()).await;
    fixture
        .dispatch
        .commit_assignment(
            &fixture.dispatcher,
            CommitAssignmentRequest::new(task.id(), fixture.worker.id, visit("MORNING")),
        )
        .await
        .expect("first assignment");

    let requeued = fixture
        .lifecycle
        .reject(&fixture.worker, task.id(), "vehicle in repair")
        .await
        .expect("worker rejects");
    assert_eq!(requeued.status(), TaskStatus::PendingDispatch);
    assert!(requeued.scheduled_visit().is_none());

    let availability = fixture
        .dispatch
        .worker_availability(&fixture.dispatcher, fixture.worker.id, visit_day(), 60)
        .await
        .expect("availability");
    assert!(availability.iter().all(|window| window.available));

    let candidates = fixture
        .dispatch
        .rank_candidates(&fixture.dispatcher, task.id(), Some(visit("MORNING")))
        .await
        .expect("ranking");
    let ranked: Vec<_> = candidates.iter().map(|candidate| candidate.worker_id).collect();
    assert_eq!(ranked, vec![fixture.worker.id, fixture.backup_worker.id]);

    let reassigned = fixture
        .dispatch
        .commit_assignment(
            &fixture.dispatcher,
            CommitAssignmentRequest::new(task.id(), fixture.backup_worker.id, visit("AFTERNOON")),
        )
        .await
        .expect("reassignment");
    assert_eq!(reassigned.assigned_worker(), Some(fixture.backup_worker.id));

    let actions: Vec<TaskAction> = fixture
        .audit
        .entries()
        .into_iter()
        .map(|record| record.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            TaskAction::Create,
            TaskAction::Assign,
            TaskAction::Reject,
            TaskAction::Assign,
        ]
    );
    let recipients: Vec<_> = fixture
        .notifications
        .entries()
        .into_iter()
        .map(|notification| notification.recipient)
        .collect();
    assert_eq!(
        recipients,
        vec![fixture.worker.id, fixture.dispatcher.id, fixture.backup_worker.id]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_tasks_free_the_worker(fixture: Fixture) {
    let first = fixture.create_task(lake_site()).await;
    fixture
        .dispatch
        .commit_assignment(
            &fixture.dispatcher,
            CommitAssignmentRequest::new(first.id(), fixture.worker.id, visit("FULL_DAY")),
        )
        .await
        .expect("full-day assignment");
    let second = fixture.create_task(lake_site()).await;

    let blocked = fixture
        .dispatch
        .assess_assignment(&fixture.dispatcher, second.id(), fixture.worker.id, visit("EVENING"))
        .await
        .expect("assessment");
    assert_eq!(blocked.level(), ConflictLevel::Hard);

    fixture
        .lifecycle
        .cancel(&fixture.admin, first.id(), "customer postponed")
        .await
        .expect("cancel");

    let cleared = fixture
        .dispatch
        .assess_assignment(&fixture.dispatcher, second.id(), fixture.worker.id, visit("EVENING"))
        .await
        .expect("assessment");
    assert_eq!(cleared.level(), ConflictLevel::None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn soft_conflict_override_is_recorded_on_the_task(fixture: Fixture) {
    let first = fixture.create_task(lake_site()).await;
    fixture
        .dispatch
        .commit_assignment(
            &fixture.dispatcher,
            CommitAssignmentRequest::new(first.id(), fixture.worker.id, visit("MORNING")),
        )
        .await
        .expect("morning assignment");
    let distant = fixture.create_task(north_site()).await;

    let assigned = fixture
        .dispatch
        .commit_assignment(
            &fixture.dispatcher,
            CommitAssignmentRequest::new(distant.id(), fixture.worker.id, visit("AFTERNOON"))
                .with_soft_conflict_override(),
        )
        .await
        .expect("override accepted");

    let stored = fixture
        .lifecycle
        .find_by_id(&fixture.worker, distant.id())
        .await
        .expect("reload");
    assert_eq!(stored, assigned);
    let acknowledgement = stored
        .assignment()
        .and_then(|assignment| assignment.soft_conflict_override.as_ref())
        .expect("override recorded");
    assert_eq!(acknowledgement.acknowledged_by, fixture.dispatcher.id);
    assert_eq!(acknowledgement.warnings.len(), 1);
}
