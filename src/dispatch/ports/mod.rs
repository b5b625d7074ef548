//! Port contracts for worker dispatch.

pub mod directory;

pub use directory::{
    CommercialRecordSource, ConflictPolicySource, DirectoryError, DirectoryResult,
    LogisticsSource, WorkerDirectory,
};
