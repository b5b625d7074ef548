//! Fieldops: field-service dispatch and scheduling core.
//!
//! This crate assigns measurers and installers to time-bound site visits,
//! detects schedule conflicts before an assignment is committed, gates task
//! creation behind admission control, and drives each task through its
//! multi-actor lifecycle from dispatch to confirmed completion.
//!
//! # Architecture
//!
//! Fieldops follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, logging, etc.)
//!
//! # Modules
//!
//! - [`task`]: Field task aggregate, lifecycle transitions and persistence
//! - [`dispatch`]: Worker scoring, conflict detection, admission and assignment
//! - [`config`]: Environment-driven settings
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod dispatch;
pub mod task;
pub mod telemetry;
