//! Diesel write model for field task persistence.
//!
//! Reads decode the `payload` column alone; the other columns exist for
//! filtering and indexing.

use super::schema::field_tasks;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Insert and update model for field task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = field_tasks)]
#[diesel(treat_none_as_null = true)]
pub struct FieldTaskWrite {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning tenant.
    pub tenant_id: uuid::Uuid,
    /// Lifecycle status.
    pub status: String,
    /// Assigned worker.
    pub worker_id: Option<uuid::Uuid>,
    /// Scheduled visit date.
    pub visit_date: Option<NaiveDate>,
    /// Serialized aggregate.
    pub payload: Value,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
