//! Diesel schema for field task persistence.

diesel::table! {
    /// Field task records. Lookup columns are indexed; the full aggregate
    /// lives in `payload`.
    field_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning tenant.
        tenant_id -> Uuid,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Assigned worker, when assigned.
        worker_id -> Nullable<Uuid>,
        /// Scheduled visit date, when assigned.
        visit_date -> Nullable<Date>,
        /// Serialized task aggregate.
        payload -> Jsonb,
        /// Optimistic concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
