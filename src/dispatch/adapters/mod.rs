//! Adapter implementations for dispatch ports.

pub mod memory;
