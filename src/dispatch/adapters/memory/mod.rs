//! In-memory directory adapters.

mod directory;

pub use directory::{
    InMemoryCommercialRecords, InMemoryLogisticsSource, InMemoryWorkerDirectory,
    StaticConflictPolicies,
};
