//! `PostgreSQL` adapters for field task persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskRepository, TaskPgPool};
