//! Candidate ranking for manual worker selection.

use super::{ConflictLevel, SuitabilityScore, TaskRequirement, WorkerProfile, score};
use crate::task::domain::{GeoPoint, UserId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// One qualified worker offered to the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Worker identifier.
    pub worker_id: UserId,
    /// Display name.
    pub display_name: String,
    /// Suitability score, never zero.
    pub score: SuitabilityScore,
    /// Tasks the worker currently carries.
    pub active_task_count: u32,
    /// Distance from the worker's home base to the site, when both are known.
    /// Informational only.
    pub distance_km: Option<f64>,
    /// Conflict level for the proposed visit, when one was given.
    pub conflict: Option<ConflictLevel>,
}

/// Scores every worker, drops unqualified ones, and orders the rest by score
/// descending, then active task count ascending, then worker identifier.
#[must_use]
pub fn rank_candidates(
    workers: &[WorkerProfile],
    requirement: TaskRequirement,
    site: Option<GeoPoint>,
) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = workers
        .iter()
        .filter_map(|worker| {
            let suitability = score(worker, requirement);
            suitability.is_qualified().then(|| RankedCandidate {
                worker_id: worker.id(),
                display_name: worker.display_name().to_owned(),
                score: suitability,
                active_task_count: worker.active_task_count(),
                distance_km: worker
                    .home_base()
                    .zip(site)
                    .map(|(home, target)| home.distance_km(target)),
                conflict: None,
            })
        })
        .collect();
    candidates.sort_by_key(|candidate| {
        (
            Reverse(candidate.score),
            candidate.active_task_count,
            candidate.worker_id,
        )
    });
    candidates
}
