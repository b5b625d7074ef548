//! Read-only worker profile projection supplied by the HR collaborator.

use crate::task::domain::{GeoPoint, TenantId, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Category capability held by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillTag {
    /// Curtain measurement and installation.
    Curtain,
    /// Wall-cloth and wallpaper work.
    Wallcloth,
    /// Anything not covered by a specialist tag.
    General,
    /// Wildcard: qualifies for every category.
    All,
}

impl SkillTag {
    /// Maps a product category to the skill it requires.
    ///
    /// Matching is case-insensitive; `curtain` takes precedence over `wall`.
    #[must_use]
    pub fn required_for(category: &str) -> Self {
        let normalized = category.to_ascii_lowercase();
        if normalized.contains("curtain") {
            Self::Curtain
        } else if normalized.contains("wall") {
            Self::Wallcloth
        } else {
            Self::General
        }
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Curtain => "CURTAIN",
            Self::Wallcloth => "WALLCLOTH",
            Self::General => "GENERAL",
            Self::All => "ALL",
        }
    }
}

impl fmt::Display for SkillTag {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Rolling average customer rating between 0 and 5.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WorkerRating(f64);

impl WorkerRating {
    const MAX: f64 = 5.0;

    /// Creates a validated rating.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RatingOutOfRange`] for values outside
    /// `0..=5` or non-finite values.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=Self::MAX).contains(&value) {
            return Err(ValidationError::RatingOutOfRange {
                value: value.to_string(),
                min: 0,
                max: 5,
            });
        }
        Ok(Self(value))
    }

    /// Rating value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Rating as a fraction of the maximum, in `0..=1`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "ratings are averaged scores and inherently fractional"
    )]
    pub fn fraction(self) -> f64 {
        self.0 / Self::MAX
    }
}

impl TryFrom<f64> for WorkerRating {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WorkerRating> for f64 {
    fn from(rating: WorkerRating) -> Self {
        rating.0
    }
}

/// Worker as seen by the dispatch core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerProfile {
    id: UserId,
    tenant_id: TenantId,
    display_name: String,
    skills: BTreeSet<SkillTag>,
    active_task_count: u32,
    rating: Option<WorkerRating>,
    home_base: Option<GeoPoint>,
}

impl WorkerProfile {
    /// Creates an idle, unrated worker with the given skills.
    #[must_use]
    pub fn new(
        id: UserId,
        tenant_id: TenantId,
        display_name: impl Into<String>,
        skills: impl IntoIterator<Item = SkillTag>,
    ) -> Self {
        Self {
            id,
            tenant_id,
            display_name: display_name.into(),
            skills: skills.into_iter().collect(),
            active_task_count: 0,
            rating: None,
            home_base: None,
        }
    }

    /// Sets the number of tasks the worker is currently carrying.
    #[must_use]
    pub const fn with_active_task_count(mut self, count: u32) -> Self {
        self.active_task_count = count;
        self
    }

    /// Sets the average rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: WorkerRating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Sets the home base coordinate.
    #[must_use]
    pub const fn with_home_base(mut self, home_base: GeoPoint) -> Self {
        self.home_base = Some(home_base);
        self
    }

    /// Returns the worker identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the owning tenant.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the skill tags.
    #[must_use]
    pub const fn skills(&self) -> &BTreeSet<SkillTag> {
        &self.skills
    }

    /// Returns whether the worker holds `skill` exactly.
    #[must_use]
    pub fn has_skill(&self, skill: SkillTag) -> bool {
        self.skills.contains(&skill)
    }

    /// Returns the active task count.
    #[must_use]
    pub const fn active_task_count(&self) -> u32 {
        self.active_task_count
    }

    /// Returns the average rating, if rated.
    #[must_use]
    pub const fn rating(&self) -> Option<WorkerRating> {
        self.rating
    }

    /// Returns the home base coordinate, if known.
    #[must_use]
    pub const fn home_base(&self) -> Option<GeoPoint> {
        self.home_base
    }
}
