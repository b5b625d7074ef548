//! Worker dispatch for field tasks.
//!
//! Scores workers against a task, detects schedule conflicts, gates task
//! creation behind admission control, and commits assignments under a
//! per-worker lock. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
