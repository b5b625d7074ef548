//! Given steps for dispatch assignment BDD scenarios.

use super::helpers::visit;
use super::world::{DispatchWorld, run_async, site_named};
use eyre::WrapErr;
use fieldops::dispatch::services::CommitAssignmentRequest;
use rstest_bdd_macros::given;

#[given(r#"a task at the "{site}" site assigned to the worker for "{slot}""#)]
fn assigned_task(
    world: &mut DispatchWorld,
    site: String,
    slot: String,
) -> Result<(), eyre::Report> {
    let fixture = &world.fixture;
    let task = run_async(fixture.create_task(site_named(&site)?));
    let assigned = run_async(fixture.dispatch.commit_assignment(
        &fixture.dispatcher,
        CommitAssignmentRequest::new(task.id(), fixture.worker.id, visit(&slot)),
    ))
    .wrap_err("assign scenario task")?;
    world.task = Some(assigned);
    Ok(())
}

#[given(r#"another task at the "{site}" site"#)]
fn another_task(world: &mut DispatchWorld, site: String) -> Result<(), eyre::Report> {
    let task = run_async(world.fixture.create_task(site_named(&site)?));
    world.other_task = Some(task);
    Ok(())
}
