//! Then steps for dispatch assignment BDD scenarios.

use super::helpers::visit_day;
use super::world::{DispatchWorld, run_async};
use eyre::WrapErr;
use fieldops::dispatch::{domain::ConflictLevel, services::DispatchError};
use fieldops::task::{
    domain::{TaskId, TaskStatus},
    ports::DispatchEvent,
};
use rstest_bdd_macros::then;

fn stored_status(world: &DispatchWorld, task_id: TaskId) -> Result<TaskStatus, eyre::Report> {
    let fixture = &world.fixture;
    let task = run_async(fixture.lifecycle.find_by_id(&fixture.admin, task_id))
        .wrap_err("reload scenario task")?;
    Ok(task.status())
}

fn expect_status(found: TaskStatus, expected: &str) -> Result<(), eyre::Report> {
    let wanted = TaskStatus::try_from(expected)
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    if found != wanted {
        return Err(eyre::eyre!("expected status {wanted}, found {found}"));
    }
    Ok(())
}

#[then("the commit fails with a hard conflict")]
fn commit_fails_hard(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_commit
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing commit result"))?;
    match result {
        Err(DispatchError::Conflict(assessment)) if assessment.level() == ConflictLevel::Hard => {
            Ok(())
        }
        other => Err(eyre::eyre!("expected a hard conflict, got {other:?}")),
    }
}

#[then("the commit is held for a soft conflict override")]
fn commit_held_soft(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_commit
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing commit result"))?;
    match result {
        Err(DispatchError::SoftConflictRequiresOverride(assessment))
            if !assessment.warnings().is_empty() =>
        {
            Ok(())
        }
        other => Err(eyre::eyre!("expected a soft conflict hold, got {other:?}")),
    }
}

#[then(r#"the other task is "{status}""#)]
fn other_task_status(world: &DispatchWorld, status: String) -> Result<(), eyre::Report> {
    let found = stored_status(world, world.other_task_id()?)?;
    expect_status(found, &status)
}

#[then(r#"the task is "{status}""#)]
fn task_status(world: &DispatchWorld, status: String) -> Result<(), eyre::Report> {
    let found = stored_status(world, world.task_id()?)?;
    expect_status(found, &status)
}

#[then("the worker is notified of an overridden soft conflict")]
fn worker_notified_of_override(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let fixture = &world.fixture;
    let other_task_id = world.other_task_id()?;
    let notified = fixture.notifications.entries().into_iter().any(|notification| {
        notification.task_id == other_task_id
            && notification.recipient == fixture.worker.id
            && matches!(notification.event, DispatchEvent::SoftConflictOverridden { .. })
    });
    if !notified {
        return Err(eyre::eyre!("no soft conflict override notification was sent"));
    }
    Ok(())
}

#[then("the worker was {minutes:u32} minutes late")]
fn worker_was_late(world: &DispatchWorld, minutes: u32) -> Result<(), eyre::Report> {
    let late_minutes = world
        .task
        .as_ref()
        .and_then(|task| task.check_in_record())
        .map(|record| record.late_minutes)
        .ok_or_else(|| eyre::eyre!("task has no check-in record"))?;
    if late_minutes != minutes {
        return Err(eyre::eyre!("expected {minutes} late minutes, found {late_minutes}"));
    }
    Ok(())
}

#[then(r#"the audit trail reads "{actions}""#)]
fn audit_trail_reads(world: &DispatchWorld, actions: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let recorded: Vec<&'static str> = world
        .fixture
        .audit
        .entries()
        .into_iter()
        .filter(|record| record.record_id == task_id)
        .map(|record| record.action.as_str())
        .collect();
    let expected: Vec<&str> = actions.split(',').map(str::trim).collect();
    if recorded != expected {
        return Err(eyre::eyre!("expected audit trail {expected:?}, found {recorded:?}"));
    }
    Ok(())
}

#[then("the ledger received a labor fee of {amount:i64}")]
fn ledger_received_fee(world: &DispatchWorld, amount: i64) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let postings = world.fixture.ledger.entries();
    match postings.as_slice() {
        [posting] if posting.task_id == task_id && posting.labor_fee.minor_units() == amount => {
            Ok(())
        }
        other => Err(eyre::eyre!("expected one posting of {amount}, found {other:?}")),
    }
}

#[then("the dispatcher is notified of the rejection")]
fn dispatcher_notified_of_rejection(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let fixture = &world.fixture;
    let notified = fixture.notifications.entries().into_iter().any(|notification| {
        notification.recipient == fixture.dispatcher.id
            && matches!(notification.event, DispatchEvent::WorkerRejected { .. })
    });
    if !notified {
        return Err(eyre::eyre!("dispatcher was not told about the rejection"));
    }
    Ok(())
}

#[then("the worker is free all day")]
fn worker_free_all_day(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let fixture = &world.fixture;
    let windows = run_async(fixture.dispatch.worker_availability(
        &fixture.dispatcher,
        fixture.worker.id,
        visit_day(),
        60,
    ))
    .wrap_err("query availability")?;
    if windows.is_empty() || windows.iter().any(|window| !window.available) {
        return Err(eyre::eyre!("worker still has busy windows: {windows:?}"));
    }
    Ok(())
}
