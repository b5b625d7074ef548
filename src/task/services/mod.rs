//! Application services for field task lifecycle orchestration.

mod lifecycle;
mod outbound;

pub use lifecycle::{TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService};
pub use outbound::OutboundPorts;
