//! Schedule conflict detection and availability windows.
//!
//! Commitments are always derived from live task rows; nothing here caches
//! them.

use crate::task::domain::{
    FieldTask, GeoPoint, ScheduledVisit, SlotInterval, TaskId, ValidationError,
};
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A visit already occupying a worker's calendar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    /// Committed task.
    pub task_id: TaskId,
    /// Committed date and slot.
    pub visit: ScheduledVisit,
    /// Site coordinate, when known.
    pub site: Option<GeoPoint>,
}

impl Commitment {
    /// Derives the commitment a task imposes on its worker, if any.
    ///
    /// Tasks outside the committed statuses or without a visit impose none.
    #[must_use]
    pub fn from_task(task: &FieldTask) -> Option<Self> {
        if !task.status().holds_commitment() {
            return None;
        }
        task.scheduled_visit().map(|visit| Self {
            task_id: task.id(),
            visit,
            site: task.site().coordinate(),
        })
    }
}

/// A visit under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProposedVisit {
    /// Proposed date and slot.
    pub visit: ScheduledVisit,
    /// Site coordinate, when known.
    pub site: Option<GeoPoint>,
}

impl ProposedVisit {
    /// Creates a proposal.
    #[must_use]
    pub const fn new(visit: ScheduledVisit, site: Option<GeoPoint>) -> Self {
        Self { visit, site }
    }
}

/// Thresholds for soft conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConflictPolicy {
    /// Farthest acceptable distance to the nearest same-day site.
    pub max_site_distance_km: f64,
    /// Shortest acceptable gap between adjacent same-day visits.
    pub min_travel_buffer_minutes: u32,
    /// Same-day visit count at which a new visit becomes risky; `None`
    /// disables the check.
    pub max_daily_visits: Option<u32>,
}

impl ConflictPolicy {
    /// Default distance threshold in kilometres.
    pub const DEFAULT_MAX_SITE_DISTANCE_KM: f64 = 20.0;
    /// Default travel buffer in minutes.
    pub const DEFAULT_MIN_TRAVEL_BUFFER_MINUTES: u32 = 60;
    /// Default daily visit cap.
    pub const DEFAULT_MAX_DAILY_VISITS: u32 = 3;
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self {
            max_site_distance_km: Self::DEFAULT_MAX_SITE_DISTANCE_KM,
            min_travel_buffer_minutes: Self::DEFAULT_MIN_TRAVEL_BUFFER_MINUTES,
            max_daily_visits: Some(Self::DEFAULT_MAX_DAILY_VISITS),
        }
    }
}

/// Severity of a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictLevel {
    /// Schedulable.
    None,
    /// Schedulable but risky; needs an explicit override.
    Soft,
    /// Double-booking; never schedulable.
    Hard,
}

impl ConflictLevel {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Soft => "SOFT",
            Self::Hard => "HARD",
        }
    }
}

impl fmt::Display for ConflictLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One reason a proposal conflicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictDetail {
    /// The proposal overlaps a committed visit.
    Overlap {
        /// Overlapped task.
        task_id: TaskId,
        /// Overlapped visit.
        visit: ScheduledVisit,
    },
    /// The nearest same-day site is too far away.
    SiteTooFar {
        /// Nearest committed task.
        task_id: TaskId,
        /// Distance to it.
        distance_km: f64,
        /// Configured threshold.
        max_km: f64,
    },
    /// An adjacent visit leaves too little travel time.
    TravelBufferTooShort {
        /// Adjacent committed task.
        task_id: TaskId,
        /// Gap between the visits.
        gap_minutes: u32,
        /// Configured minimum.
        min_minutes: u32,
    },
    /// The worker already carries the daily maximum.
    DailyCapacityReached {
        /// Visits already committed that day.
        visits: u32,
        /// Configured cap.
        max_visits: u32,
    },
}

impl ConflictDetail {
    /// Level this detail implies.
    #[must_use]
    pub const fn level(&self) -> ConflictLevel {
        match self {
            Self::Overlap { .. } => ConflictLevel::Hard,
            Self::SiteTooFar { .. }
            | Self::TravelBufferTooShort { .. }
            | Self::DailyCapacityReached { .. } => ConflictLevel::Soft,
        }
    }
}

impl fmt::Display for ConflictDetail {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { task_id, visit } => {
                write!(formatter, "overlaps task {task_id} at {visit}")
            }
            Self::SiteTooFar {
                task_id,
                distance_km,
                max_km,
            } => write!(
                formatter,
                "nearest same-day site (task {task_id}) is {distance_km:.1} km away, \
                 limit {max_km:.1} km"
            ),
            Self::TravelBufferTooShort {
                task_id,
                gap_minutes,
                min_minutes,
            } => write!(
                formatter,
                "only {gap_minutes} min between this visit and task {task_id}, \
                 minimum {min_minutes} min"
            ),
            Self::DailyCapacityReached { visits, max_visits } => write!(
                formatter,
                "worker already has {visits} visits that day, limit {max_visits}"
            ),
        }
    }
}

/// Outcome of conflict detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictAssessment {
    level: ConflictLevel,
    details: Vec<ConflictDetail>,
}

impl ConflictAssessment {
    /// An assessment with nothing to report.
    #[must_use]
    pub const fn clear() -> Self {
        Self {
            level: ConflictLevel::None,
            details: Vec::new(),
        }
    }

    fn from_details(details: Vec<ConflictDetail>) -> Self {
        let level = details
            .iter()
            .map(ConflictDetail::level)
            .max()
            .unwrap_or(ConflictLevel::None);
        Self { level, details }
    }

    /// Overall level.
    #[must_use]
    pub const fn level(&self) -> ConflictLevel {
        self.level
    }

    /// Every reason found.
    #[must_use]
    pub fn details(&self) -> &[ConflictDetail] {
        &self.details
    }

    /// Human-readable warnings, one per detail.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.details.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ConflictAssessment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.level)?;
        if !self.details.is_empty() {
            write!(formatter, ": {}", self.warnings().join("; "))?;
        }
        Ok(())
    }
}

/// Classifies a proposed visit against a worker's commitments.
///
/// Commitments on other dates are ignored. Distance and travel-buffer checks
/// only consider pairs where both sites carry a coordinate.
#[must_use]
pub fn detect(
    commitments: &[Commitment],
    proposed: &ProposedVisit,
    policy: &ConflictPolicy,
) -> ConflictAssessment {
    let same_day: Vec<&Commitment> = commitments
        .iter()
        .filter(|commitment| commitment.visit.date == proposed.visit.date)
        .collect();
    if same_day.is_empty() {
        return ConflictAssessment::clear();
    }

    let proposed_interval = proposed.visit.interval();
    let overlaps: Vec<ConflictDetail> = same_day
        .iter()
        .filter(|commitment| commitment.visit.interval().overlaps(proposed_interval))
        .map(|commitment| ConflictDetail::Overlap {
            task_id: commitment.task_id,
            visit: commitment.visit,
        })
        .collect();
    if !overlaps.is_empty() {
        return ConflictAssessment::from_details(overlaps);
    }

    let mut details = Vec::new();
    if let Some(site) = proposed.site {
        details.extend(distance_warning(&same_day, site, policy));
        details.extend(buffer_warning(&same_day, proposed_interval, policy));
    }
    details.extend(capacity_warning(&same_day, policy));
    ConflictAssessment::from_details(details)
}

fn distance_warning(
    same_day: &[&Commitment],
    site: GeoPoint,
    policy: &ConflictPolicy,
) -> Option<ConflictDetail> {
    let (task_id, distance_km) = same_day
        .iter()
        .filter_map(|commitment| {
            commitment
                .site
                .map(|other| (commitment.task_id, site.distance_km(other)))
        })
        .min_by(|left, right| left.1.total_cmp(&right.1))?;
    (distance_km > policy.max_site_distance_km).then_some(ConflictDetail::SiteTooFar {
        task_id,
        distance_km,
        max_km: policy.max_site_distance_km,
    })
}

fn buffer_warning(
    same_day: &[&Commitment],
    proposed: SlotInterval,
    policy: &ConflictPolicy,
) -> Option<ConflictDetail> {
    let (task_id, gap_minutes) = same_day
        .iter()
        .filter(|commitment| commitment.site.is_some())
        .map(|commitment| (commitment.task_id, commitment.visit.interval().gap_to(proposed)))
        .min_by_key(|(_, gap)| *gap)?;
    (gap_minutes < policy.min_travel_buffer_minutes).then_some(
        ConflictDetail::TravelBufferTooShort {
            task_id,
            gap_minutes,
            min_minutes: policy.min_travel_buffer_minutes,
        },
    )
}

fn capacity_warning(same_day: &[&Commitment], policy: &ConflictPolicy) -> Option<ConflictDetail> {
    let max_visits = policy.max_daily_visits?;
    let visits = u32::try_from(same_day.len()).unwrap_or(u32::MAX);
    (visits >= max_visits).then_some(ConflictDetail::DailyCapacityReached { visits, max_visits })
}

/// Candidate windows offered when checking a worker's availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityGrid {
    /// First candidate start.
    pub opens: NaiveTime,
    /// No window may end after this time.
    pub closes: NaiveTime,
    /// Distance between candidate starts.
    pub step_minutes: u32,
}

impl Default for AvailabilityGrid {
    fn default() -> Self {
        Self {
            opens: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            closes: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            step_minutes: 30,
        }
    }
}

/// One candidate window and whether the worker is free for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// Window start.
    pub start: NaiveTime,
    /// Window end.
    pub end: NaiveTime,
    /// Whether no commitment overlaps the window.
    pub available: bool,
}

/// Lists candidate windows of `duration_minutes` on `date`, flagging those
/// that overlap a commitment.
///
/// # Errors
///
/// Returns [`ValidationError::ZeroDuration`] when the duration or the grid
/// step is zero.
pub fn availability(
    commitments: &[Commitment],
    date: NaiveDate,
    duration_minutes: u32,
    grid: &AvailabilityGrid,
) -> Result<Vec<AvailabilityWindow>, ValidationError> {
    if duration_minutes == 0 || grid.step_minutes == 0 {
        return Err(ValidationError::ZeroDuration);
    }
    let busy: Vec<SlotInterval> = commitments
        .iter()
        .filter(|commitment| commitment.visit.date == date)
        .map(|commitment| commitment.visit.interval())
        .collect();
    let closes = minute_of_day(grid.closes);

    let mut windows = Vec::new();
    let mut start = minute_of_day(grid.opens);
    while let Some(candidate) = SlotInterval::from_start(start, duration_minutes) {
        if candidate.end() > closes {
            break;
        }
        windows.push(AvailabilityWindow {
            start: candidate.start_time(),
            end: candidate.end_time(),
            available: !busy.iter().any(|interval| interval.overlaps(candidate)),
        });
        start = start.saturating_add(grid.step_minutes);
    }
    Ok(windows)
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
