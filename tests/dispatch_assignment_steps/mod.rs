//! Step definitions for dispatch assignment scenarios.

#[path = "../in_memory/helpers.rs"]
pub mod helpers;

pub mod world;

mod given;
mod then;
mod when;
