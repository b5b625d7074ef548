//! Shared world state for dispatch assignment BDD scenarios.

use chrono::{TimeZone, Utc};
use fieldops::dispatch::services::DispatchError;
use fieldops::task::domain::{FieldTask, SiteAddress, TaskId};
use rstest::fixture;

use super::helpers::{Fixture, lake_site, north_site};

/// Scenario world for dispatch behaviour tests.
pub struct DispatchWorld {
    pub fixture: Fixture,
    pub task: Option<FieldTask>,
    pub other_task: Option<FieldTask>,
    pub last_commit: Option<Result<FieldTask, DispatchError>>,
}

impl DispatchWorld {
    /// Creates a world two days ahead of the visit date.
    pub fn new() -> Self {
        let now = Utc
            .with_ymd_and_hms(2024, 5, 30, 9, 0, 0)
            .single()
            .expect("valid scenario start time");
        Self {
            fixture: Fixture::at(now),
            task: None,
            other_task: None,
            last_commit: None,
        }
    }

    /// Identifier of the scenario's main task.
    pub fn task_id(&self) -> eyre::Result<TaskId> {
        self.task
            .as_ref()
            .map(FieldTask::id)
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Identifier of the second task.
    pub fn other_task_id(&self) -> eyre::Result<TaskId> {
        self.other_task
            .as_ref()
            .map(FieldTask::id)
            .ok_or_else(|| eyre::eyre!("missing other task in scenario world"))
    }
}

/// Resolves a named scenario site.
pub fn site_named(name: &str) -> eyre::Result<SiteAddress> {
    match name {
        "lake" => Ok(lake_site()),
        "north" => Ok(north_site()),
        other => Err(eyre::eyre!("unknown scenario site {other:?}")),
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DispatchWorld {
    DispatchWorld::new()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
