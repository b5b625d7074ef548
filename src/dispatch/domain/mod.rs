//! Domain model for worker dispatch.
//!
//! Worker profiles, the suitability scorer, the conflict detector, the
//! admission and logistics gates, and candidate ranking. Everything here is pure; the
//! dispatch service supplies live data.

mod admission;
mod conflict;
mod logistics;
mod ranking;
mod scoring;
mod worker;

pub use admission::{
    AdmissionDecision, AdmissionDenial, CommercialRecord, DepositState, FeeWaiverState,
    TaskCreationRequest, check_admission,
};
pub use conflict::{
    AvailabilityGrid, AvailabilityWindow, Commitment, ConflictAssessment, ConflictDetail,
    ConflictLevel, ConflictPolicy, ProposedVisit, availability, detect,
};
pub use logistics::{
    LogisticsShortfall, PurchaseOrder, PurchaseOrderState, gate_installation,
};
pub use ranking::{RankedCandidate, rank_candidates};
pub use scoring::{SuitabilityScore, TaskRequirement, score};
pub use worker::{SkillTag, WorkerProfile, WorkerRating};
