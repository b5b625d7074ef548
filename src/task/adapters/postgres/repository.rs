//! `PostgreSQL` repository implementation for field task storage.

use super::{models::FieldTaskWrite, schema::field_tasks};
use crate::task::{
    domain::{FieldTask, TaskId, TaskStatus, TenantId, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, WorkerDay},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Text;
use serde_json::Value;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Transaction-scoped advisory lock on one worker day. Released on commit or
/// rollback.
const LOCK_WORKER_DAY_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &FieldTask) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_write_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(field_tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &FieldTask, expected_version: u64) -> TaskRepositoryResult<()> {
        let row = to_write_row(task)?;
        self.run_blocking(move |connection| write_versioned(connection, &row, expected_version))
            .await
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
        let lock_key = format!(
            "{}:{}:{}",
            worker_day.tenant_id, worker_day.worker_id, worker_day.date
        );

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|transaction| {
                diesel::sql_query(LOCK_WORKER_DAY_SQL)
                    .bind::<Text, _>(&lock_key)
                    .execute(transaction)?;
                let commitments = load_commitments(transaction, worker_day)?;
                let task = match decide(&commitments) {
                    Ok(task) => task,
                    Err(refusal) => return Ok(Err(refusal)),
                };
                let row = to_write_row(&task)?;
                write_versioned(transaction, &row, expected_version)?;
                Ok(Ok(task))
            })
        })
        .await
    }

    async fn find_by_id(
        &self,
        tenant_id: TenantId,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<FieldTask>> {
        self.run_blocking(move |connection| {
            let payload = field_tasks::table
                .filter(field_tasks::id.eq(id.into_inner()))
                .filter(field_tasks::tenant_id.eq(tenant_id.into_inner()))
                .select(field_tasks::payload)
                .first::<Value>(connection)
                .optional()?;
            payload.map(payload_to_task).transpose()
        })
        .await
    }

    async fn find_commitments(
        &self,
        tenant_id: TenantId,
        worker_id: UserId,
        date: NaiveDate,
    ) -> TaskRepositoryResult<Vec<FieldTask>> {
        let worker_day = WorkerDay::new(tenant_id, worker_id, date);
        self.run_blocking(move |connection| load_commitments(connection, worker_day))
            .await
    }
}

fn load_commitments(
    connection: &mut PgConnection,
    worker_day: WorkerDay,
) -> TaskRepositoryResult<Vec<FieldTask>> {
    let committed_statuses: Vec<&'static str> = TaskStatus::ALL
        .into_iter()
        .filter(|status| status.holds_commitment())
        .map(TaskStatus::as_str)
        .collect();

    field_tasks::table
        .filter(field_tasks::tenant_id.eq(worker_day.tenant_id.into_inner()))
        .filter(field_tasks::worker_id.eq(worker_day.worker_id.into_inner()))
        .filter(field_tasks::visit_date.eq(worker_day.date))
        .filter(field_tasks::status.eq_any(committed_statuses))
        .select(field_tasks::payload)
        .load::<Value>(connection)?
        .into_iter()
        .map(payload_to_task)
        .collect()
}

/// Replaces the row when its stored version still equals `expected_version`.
fn write_versioned(
    connection: &mut PgConnection,
    row: &FieldTaskWrite,
    expected_version: u64,
) -> TaskRepositoryResult<()> {
    let task_id = TaskId::from_uuid(row.id);
    let expected = to_db_version(expected_version)?;
    let updated = diesel::update(
        field_tasks::table
            .filter(field_tasks::id.eq(row.id))
            .filter(field_tasks::tenant_id.eq(row.tenant_id))
            .filter(field_tasks::version.eq(expected)),
    )
    .set(row)
    .execute(connection)?;

    if updated > 0 {
        return Ok(());
    }

    // Distinguish a missing row from a lost race.
    let found = field_tasks::table
        .filter(field_tasks::id.eq(row.id))
        .filter(field_tasks::tenant_id.eq(row.tenant_id))
        .select(field_tasks::version)
        .first::<i64>(connection)
        .optional()?;
    match found {
        None => Err(TaskRepositoryError::NotFound(task_id)),
        Some(version) => Err(TaskRepositoryError::StaleState {
            task_id,
            expected: expected_version,
            found: u64::try_from(version).map_err(TaskRepositoryError::persistence)?,
        }),
    }
}

fn to_db_version(version: u64) -> TaskRepositoryResult<i64> {
    i64::try_from(version).map_err(TaskRepositoryError::persistence)
}

fn to_write_row(task: &FieldTask) -> TaskRepositoryResult<FieldTaskWrite> {
    let payload = serde_json::to_value(task).map_err(TaskRepositoryError::persistence)?;

    Ok(FieldTaskWrite {
        id: task.id().into_inner(),
        tenant_id: task.tenant_id().into_inner(),
        status: task.status().as_str().to_owned(),
        worker_id: task.assigned_worker().map(UserId::into_inner),
        visit_date: task.scheduled_visit().map(|visit| visit.date),
        payload,
        version: to_db_version(task.version())?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn payload_to_task(payload: Value) -> TaskRepositoryResult<FieldTask> {
    serde_json::from_value::<FieldTask>(payload).map_err(TaskRepositoryError::persistence)
}
