//! When steps for dispatch assignment BDD scenarios.

use super::helpers::{on_visit_day, visit};
use super::world::{DispatchWorld, run_async};
use chrono::{NaiveTime, Timelike};
use eyre::WrapErr;
use fieldops::dispatch::services::CommitAssignmentRequest;
use fieldops::task::domain::{
    CheckInLocation, CompletionReview, GeoPoint, MeasurementEntry, TaskResult,
};
use rstest_bdd_macros::when;

fn commit_other_task(
    world: &mut DispatchWorld,
    slot: &str,
    with_override: bool,
) -> Result<(), eyre::Report> {
    let fixture = &world.fixture;
    let plain =
        CommitAssignmentRequest::new(world.other_task_id()?, fixture.worker.id, visit(slot));
    let request = if with_override {
        plain.with_soft_conflict_override()
    } else {
        plain
    };
    let result = run_async(fixture.dispatch.commit_assignment(&fixture.dispatcher, request));
    world.last_commit = Some(result);
    Ok(())
}

#[when(r#"the dispatcher commits the other task to the worker for "{slot}""#)]
fn dispatcher_commits(world: &mut DispatchWorld, slot: String) -> Result<(), eyre::Report> {
    commit_other_task(world, &slot, false)
}

#[when(r#"the dispatcher overrides and commits the other task to the worker for "{slot}""#)]
fn dispatcher_overrides(world: &mut DispatchWorld, slot: String) -> Result<(), eyre::Report> {
    commit_other_task(world, &slot, true)
}

#[when("the worker accepts the task")]
fn worker_accepts(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let fixture = &world.fixture;
    let accepted = run_async(fixture.lifecycle.accept(&fixture.worker, task_id))
        .wrap_err("accept scenario task")?;
    world.task = Some(accepted);
    Ok(())
}

#[when(r#"the worker checks in at "{time}""#)]
fn worker_checks_in(world: &mut DispatchWorld, time: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let arrival = NaiveTime::parse_from_str(&time, "%H:%M").wrap_err("parse arrival time")?;
    let fixture = &world.fixture;
    fixture
        .clock
        .set(on_visit_day(arrival.hour(), arrival.minute()));
    let coordinate = GeoPoint::new(31.2304, 121.4737)?;
    let arrived = run_async(fixture.lifecycle.check_in(
        &fixture.worker,
        task_id,
        CheckInLocation::new(coordinate).with_address("1 Lake Road"),
    ))
    .wrap_err("check in to scenario task")?;
    world.task = Some(arrived);
    Ok(())
}

#[when("the worker submits measurements")]
fn worker_submits(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let fixture = &world.fixture;
    let result = TaskResult::Measurement {
        entries: vec![MeasurementEntry {
            location: "Living room".to_owned(),
            width_mm: 3200,
            height_mm: 2650,
            notes: None,
        }],
    };
    let submitted = run_async(fixture.lifecycle.submit(&fixture.worker, task_id, result))
        .wrap_err("submit scenario task")?;
    world.task = Some(submitted);
    Ok(())
}

#[when("the sales user confirms the task")]
fn sales_confirms(world: &mut DispatchWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let fixture = &world.fixture;
    let confirmed = run_async(fixture.lifecycle.confirm(
        &fixture.sales,
        task_id,
        CompletionReview::default(),
    ))
    .wrap_err("confirm scenario task")?;
    world.task = Some(confirmed);
    Ok(())
}

#[when(r#"the worker rejects the task because "{reason}""#)]
fn worker_rejects(world: &mut DispatchWorld, reason: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let fixture = &world.fixture;
    let rejected = run_async(fixture.lifecycle.reject(&fixture.worker, task_id, reason))
        .wrap_err("reject scenario task")?;
    world.task = Some(rejected);
    Ok(())
}
