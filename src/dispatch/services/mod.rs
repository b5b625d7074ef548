//! Application services for worker dispatch.

mod dispatch;

pub use dispatch::{
    AdmittedTask, CommitAssignmentRequest, DispatchError, DispatchResult, DispatchService,
    DispatchSources, SplitOutcome, SplitPart, SplitRequest,
};
