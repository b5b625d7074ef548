//! In-memory integration tests for the worker and confirmer walk.

use fieldops::dispatch::services::CommitAssignmentRequest;
use fieldops::task::ports::TaskRepository;
use fieldops::task::domain::{
    CheckInLocation, ChecklistItem, CompletionRating, CompletionReview, FeeCheckStatus, GeoPoint,
    InstallationEvidence, IssueSeverity, MeasurementEntry, Money, TaskAction, TaskDomainError,
    TaskKind, TaskResult, TaskStatus,
};
use fieldops::task::services::TaskLifecycleError;
use rstest::rstest;

use super::helpers::{Fixture, fixture, lake_site, on_visit_day, visit, visit_day};

fn site_coordinate() -> GeoPoint {
    GeoPoint::new(31.2305, 121.4736).expect("valid coordinate")
}

fn measurements() -> TaskResult {
    TaskResult::Measurement {
        entries: vec![
            MeasurementEntry {
                location: "Bedroom".to_owned(),
                width_mm: 1800,
                height_mm: 2500,
                notes: None,
            },
            MeasurementEntry {
                location: "Study".to_owned(),
                width_mm: 1200,
                height_mm: 1500,
                notes: Some("Bay window".to_owned()),
            },
        ],
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_walk_posts_the_negotiated_fee(fixture: Fixture) {
    let task = fixture.create_task(lake_site()).await;
    let task_id = task.id();
    fixture
        .dispatch
        .commit_assignment(
            &fixture.dispatcher,
            CommitAssignmentRequest::new(task_id, fixture.worker.id, visit("AFTERNOON")),
        )
        .await
        .expect("assign");
    let lifecycle = &fixture.lifecycle;
    let worker = &fixture.worker;

    lifecycle.accept(worker, task_id).await.expect("accept");
    fixture.clock.set(on_visit_day(13, 20));
    let arrived = lifecycle
        .check_in(worker, task_id, CheckInLocation::new(site_coordinate()))
        .await
        .expect("check in");
    assert_eq!(arrived.check_in_record().map(|record| record.late_minutes), Some(20));

    lifecycle
        .report_issue(
            worker,
            task_id,
            "Ceiling track needs extra anchors",
            IssueSeverity::Medium,
            vec!["https://files.example/track.jpg".to_owned()],
        )
        .await
        .expect("report issue");
    lifecycle
        .negotiate(
            worker,
            task_id,
            Money::from_minor_units(18_000).expect("valid amount"),
            "extra anchors",
        )
        .await
        .expect("negotiate");
    lifecycle
        .submit(worker, task_id, measurements())
        .await
        .expect("submit");
    let resolved = lifecycle
        .resolve_negotiation(&fixture.admin, task_id, true)
        .await
        .expect("approve fee");
    assert_eq!(resolved.fee_check(), FeeCheckStatus::Approved);
    assert_eq!(resolved.status(), TaskStatus::PendingConfirm);

    fixture.clock.set(on_visit_day(17, 0));
    let completed = lifecycle
        .confirm(
            &fixture.sales,
            task_id,
            CompletionReview {
                rating: Some(CompletionRating::new(5).expect("valid rating")),
                ..CompletionReview::default()
            },
        )
        .await
        .expect("confirm");

    assert_eq!(completed.status(), TaskStatus::Completed);
    assert_eq!(completed.completed_at(), Some(on_visit_day(17, 0)));
    let postings = fixture.ledger.entries();
    assert_eq!(postings.len(), 1);
    let posting = postings.first().expect("one posting");
    assert_eq!(posting.labor_fee.minor_units(), 18_000);
    assert_eq!(posting.worker_id, fixture.worker.id);

    let records = fixture.audit.entries();
    let actions: Vec<TaskAction> = records.iter().map(|record| record.action).collect();
    assert_eq!(
        actions,
        vec![
            TaskAction::Create,
            TaskAction::Assign,
            TaskAction::Accept,
            TaskAction::CheckIn,
            TaskAction::ReportIssue,
            TaskAction::Negotiate,
            TaskAction::Submit,
            TaskAction::ResolveNegotiation,
            TaskAction::Confirm,
        ]
    );
    assert!(records.iter().all(|record| record.record_id == task_id));
    assert!(records.iter().skip(1).all(|record| record.old_value.is_some()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_work_can_be_sent_back(fixture: Fixture) {
    let task = fixture.create_task(lake_site()).await;
    let task_id = task.id();
    fixture
        .dispatch
        .commit_assignment(
            &fixture.dispatcher,
            CommitAssignmentRequest::new(task_id, fixture.worker.id, visit("MORNING")),
        )
        .await
        .expect("assign");
    let lifecycle = &fixture.lifecycle;
    let worker = &fixture.worker;
    lifecycle.accept(worker, task_id).await.expect("accept");
    lifecycle
        .check_in(worker, task_id, CheckInLocation::new(site_coordinate()))
        .await
        .expect("check in");
    lifecycle
        .submit(worker, task_id, measurements())
        .await
        .expect("submit");

    let returned = lifecycle
        .reject_completion(&fixture.sales, task_id, "Living room missing")
        .await
        .expect("send back");

    assert_eq!(returned.status(), TaskStatus::PendingVisit);
    assert_eq!(returned.completion_rejections().len(), 1);
    assert!(fixture.ledger.entries().is_empty());

    let commitments = fixture
        .repository
        .find_commitments(fixture.tenant, fixture.worker.id, visit_day())
        .await
        .expect("commitments");
    assert_eq!(commitments.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn installers_tick_every_required_item_before_submitting(fixture: Fixture) {
    let task = fixture.create_task_of(TaskKind::Installation, lake_site()).await;
    let task_id = task.id();
    fixture
        .dispatch
        .commit_assignment(
            &fixture.dispatcher,
            CommitAssignmentRequest::new(task_id, fixture.worker.id, visit("MORNING")),
        )
        .await
        .expect("assign");
    let lifecycle = &fixture.lifecycle;
    let worker = &fixture.worker;
    lifecycle.accept(worker, task_id).await.expect("accept");
    fixture.clock.set(on_visit_day(8, 55));
    lifecycle
        .check_in(worker, task_id, CheckInLocation::new(site_coordinate()))
        .await
        .expect("check in");
    let evidence = || {
        TaskResult::Installation(InstallationEvidence {
            photo_urls: vec!["https://files.example/after.jpg".to_owned()],
            customer_signature_url: None,
        })
    };

    let unchecked = lifecycle.submit(worker, task_id, evidence()).await;
    assert!(matches!(
        unchecked,
        Err(TaskLifecycleError::Domain(TaskDomainError::ChecklistMissing(id))) if id == task_id
    ));

    let partial = lifecycle
        .update_checklist(
            worker,
            task_id,
            vec![
                ChecklistItem::new("track", "Track level and fixed").ticked(),
                ChecklistItem::new("motor", "Motor paired with remote"),
            ],
        )
        .await
        .expect("checklist saved");
    assert!(partial.checklist().is_some_and(|checklist| !checklist.is_complete()));
    let blocked = lifecycle.submit(worker, task_id, evidence()).await;
    assert!(matches!(
        blocked,
        Err(TaskLifecycleError::Domain(TaskDomainError::ChecklistIncomplete { .. }))
    ));

    lifecycle
        .update_checklist(
            worker,
            task_id,
            vec![
                ChecklistItem::new("track", "Track level and fixed").ticked(),
                ChecklistItem::new("motor", "Motor paired with remote")
                    .ticked()
                    .with_photo("https://files.example/remote.jpg"),
            ],
        )
        .await
        .expect("checklist saved");
    let submitted = lifecycle
        .submit(worker, task_id, evidence())
        .await
        .expect("submit");

    assert_eq!(submitted.status(), TaskStatus::PendingConfirm);
    let actions: Vec<TaskAction> = fixture
        .audit
        .entries()
        .into_iter()
        .map(|record| record.action)
        .filter(|action| *action == TaskAction::UpdateChecklist)
        .collect();
    assert_eq!(actions.len(), 2);
}
