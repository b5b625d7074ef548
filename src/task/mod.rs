//! Field task lifecycle management.
//!
//! A field task is a measurement or installation visit owned by one tenant.
//! This module holds the task aggregate and its guarded status machine, the
//! persistence and outbound (audit, ledger, notification) ports, and the
//! lifecycle service driving worker and confirmer actions. The module follows
//! hexagonal architecture:
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
pub(crate) mod tests;
