//! Worker suitability scoring.
//!
//! Skill is a hard gate: a worker without the required tag (or the `ALL`
//! wildcard) scores zero whatever their load or rating. Load dominates the
//! remaining signal and rating breaks ties.

use super::{SkillTag, WorkerProfile};
use serde::{Deserialize, Serialize};
use std::fmt;

const EXACT_SKILL_POINTS: i32 = 50;
const WILDCARD_SKILL_POINTS: i32 = 40;
const UNRATED_QUALITY_POINTS: f64 = 10.0;
const QUALITY_WEIGHT: f64 = 20.0;

/// What a task asks of its worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskRequirement {
    /// Skill the task's category maps to.
    pub required_skill: SkillTag,
}

impl TaskRequirement {
    /// Derives the requirement from a product category.
    #[must_use]
    pub fn for_category(category: &str) -> Self {
        Self {
            required_skill: SkillTag::required_for(category),
        }
    }
}

/// Suitability score in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuitabilityScore(u8);

impl SuitabilityScore {
    /// Score of an unqualified worker.
    pub const ZERO: Self = Self(0);

    /// Score value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns whether the worker qualifies at all.
    #[must_use]
    pub const fn is_qualified(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for SuitabilityScore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Scores a worker for a task requirement. Pure and deterministic.
#[must_use]
pub fn score(worker: &WorkerProfile, requirement: TaskRequirement) -> SuitabilityScore {
    let Some(skill_points) = skill_points(worker, requirement.required_skill) else {
        return SuitabilityScore::ZERO;
    };
    let total = weighted_total(
        skill_points.saturating_add(load_points(worker.active_task_count())),
        worker.rating().map(super::WorkerRating::fraction),
    );
    SuitabilityScore(total)
}

fn skill_points(worker: &WorkerProfile, required: SkillTag) -> Option<i32> {
    if worker.has_skill(required) {
        Some(EXACT_SKILL_POINTS)
    } else if worker.has_skill(SkillTag::All) {
        Some(WILDCARD_SKILL_POINTS)
    } else {
        None
    }
}

const fn load_points(active_task_count: u32) -> i32 {
    match active_task_count {
        0 => 30,
        1..=2 => 20,
        3..=4 => 10,
        _ => -10,
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the quality factor is fractional; the total is clamped to 0..=100 before narrowing"
)]
fn weighted_total(integral_points: i32, rating_fraction: Option<f64>) -> u8 {
    let quality =
        rating_fraction.map_or(UNRATED_QUALITY_POINTS, |fraction| fraction * QUALITY_WEIGHT);
    let total = (f64::from(integral_points) + quality).round().clamp(0.0, 100.0);
    total as u8
}
