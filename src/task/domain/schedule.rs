//! Visit scheduling values: time slots, scheduled visits and site locations.

use super::{ParseTimeSlotError, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MINUTES_PER_DAY: u32 = 24 * 60;
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Half-open `[start, end)` interval in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotInterval {
    start: u32,
    end: u32,
}

impl SlotInterval {
    const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Builds an interval from a start minute and a duration.
    ///
    /// Returns `None` when the interval would run past midnight or has no
    /// length.
    #[must_use]
    pub const fn from_start(start: u32, duration_minutes: u32) -> Option<Self> {
        let end = start.saturating_add(duration_minutes);
        if duration_minutes == 0 || end > MINUTES_PER_DAY {
            return None;
        }
        Some(Self::new(start, end))
    }

    /// Start minute, inclusive.
    #[must_use]
    pub const fn start(self) -> u32 {
        self.start
    }

    /// End minute, exclusive.
    #[must_use]
    pub const fn end(self) -> u32 {
        self.end
    }

    /// Returns whether the two intervals share at least one minute.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes between the end of one interval and the start of the other.
    ///
    /// Zero for overlapping or touching intervals.
    #[must_use]
    pub const fn gap_to(self, other: Self) -> u32 {
        if self.end <= other.start {
            other.start - self.end
        } else if other.end <= self.start {
            self.start - other.end
        } else {
            0
        }
    }

    /// Start as a wall-clock time.
    #[must_use]
    pub fn start_time(self) -> NaiveTime {
        minute_to_time(self.start)
    }

    /// End as a wall-clock time; midnight for intervals ending at 24:00.
    #[must_use]
    pub fn end_time(self) -> NaiveTime {
        minute_to_time(self.end)
    }
}

fn minute_to_time(minute: u32) -> NaiveTime {
    let clamped = minute % MINUTES_PER_DAY;
    NaiveTime::from_num_seconds_from_midnight_opt(clamped * 60, 0).unwrap_or(NaiveTime::MIN)
}

fn time_to_minute(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Time band of a visit. Named bands and explicit windows both resolve to a
/// concrete interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeSlot {
    /// 08:00–12:00.
    Morning,
    /// 13:00–18:00.
    Afternoon,
    /// 18:00–21:00.
    Evening,
    /// The whole calendar day; overlaps every other slot on that date.
    FullDay,
    /// An explicit `HH:MM-HH:MM` window.
    Window {
        /// Window start.
        start: NaiveTime,
        /// Window end, after `start`.
        end: NaiveTime,
    },
}

impl TimeSlot {
    /// Creates an explicit window.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SubMinuteTime`] when either bound carries
    /// seconds, and [`ValidationError::EmptyTimeWindow`] when `end` is not
    /// after `start`.
    pub fn window(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if let Some(bound) = [start, end]
            .into_iter()
            .find(|bound| bound.second() != 0 || bound.nanosecond() != 0)
        {
            return Err(ValidationError::SubMinuteTime(
                bound.format("%H:%M:%S%.f").to_string(),
            ));
        }
        if end <= start {
            return Err(ValidationError::EmptyTimeWindow(format!(
                "{}-{}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self::Window { start, end })
    }

    /// Resolves the slot to its minute interval.
    #[must_use]
    pub fn interval(self) -> SlotInterval {
        match self {
            Self::Morning => SlotInterval::new(8 * 60, 12 * 60),
            Self::Afternoon => SlotInterval::new(13 * 60, 18 * 60),
            Self::Evening => SlotInterval::new(18 * 60, 21 * 60),
            Self::FullDay => SlotInterval::new(0, MINUTES_PER_DAY),
            Self::Window { start, end } => {
                SlotInterval::new(time_to_minute(start), time_to_minute(end))
            }
        }
    }

    /// Time the worker is expected on site. Full-day visits start with the
    /// working day at 08:00.
    #[must_use]
    pub fn expected_arrival(self) -> NaiveTime {
        match self {
            Self::FullDay => minute_to_time(8 * 60),
            other => other.interval().start_time(),
        }
    }

    /// Returns the canonical storage label.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Morning => "MORNING".to_owned(),
            Self::Afternoon => "AFTERNOON".to_owned(),
            Self::Evening => "EVENING".to_owned(),
            Self::FullDay => "FULL_DAY".to_owned(),
            Self::Window { start, end } => {
                format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
            }
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.label())
    }
}

impl TryFrom<&str> for TimeSlot {
    type Error = ParseTimeSlotError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "MORNING" | "AM" | "上午" => return Ok(Self::Morning),
            "AFTERNOON" | "PM" | "下午" => return Ok(Self::Afternoon),
            "EVENING" | "晚上" => return Ok(Self::Evening),
            "FULL_DAY" | "ALL_DAY" | "全天" => return Ok(Self::FullDay),
            _ => {}
        }

        let parse_error = || ParseTimeSlotError(value.to_owned());
        let (raw_start, raw_end) = trimmed.split_once('-').ok_or_else(parse_error)?;
        let start =
            NaiveTime::parse_from_str(raw_start.trim(), "%H:%M").map_err(|_| parse_error())?;
        let end = NaiveTime::parse_from_str(raw_end.trim(), "%H:%M").map_err(|_| parse_error())?;
        Self::window(start, end).map_err(|_| parse_error())
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ParseTimeSlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.label()
    }
}

/// A calendar date plus time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledVisit {
    /// Visit date.
    pub date: NaiveDate,
    /// Visit time slot.
    pub slot: TimeSlot,
}

impl ScheduledVisit {
    /// Creates a scheduled visit.
    #[must_use]
    pub const fn new(date: NaiveDate, slot: TimeSlot) -> Self {
        Self { date, slot }
    }

    /// Resolved minute interval on the visit date.
    #[must_use]
    pub fn interval(&self) -> SlotInterval {
        self.slot.interval()
    }

    /// Expected arrival as a UTC instant.
    #[must_use]
    pub fn expected_arrival(&self) -> DateTime<Utc> {
        self.date.and_time(self.slot.expected_arrival()).and_utc()
    }
}

impl fmt::Display for ScheduledVisit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.date, self.slot)
    }
}

/// WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCoordinate`] for non-finite values or
    /// values outside ±90° latitude / ±180° longitude.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(ValidationError::InvalidCoordinate {
                latitude: latitude.to_string(),
                longitude: longitude.to_string(),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        self.longitude
    }

    /// Great-circle distance in kilometres (haversine).
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "great-circle distance is inherently floating point"
    )]
    pub fn distance_km(self, other: Self) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let half_chord = (delta_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
        let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());
        EARTH_RADIUS_KM * angle
    }
}

/// Where a visit takes place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAddress {
    address: String,
    coordinate: Option<GeoPoint>,
}

impl SiteAddress {
    /// Creates a site from its postal address.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyField`] when the address is blank.
    pub fn new(address: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = address.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField { field: "address" });
        }
        Ok(Self {
            address: trimmed.to_owned(),
            coordinate: None,
        })
    }

    /// Attaches a geocoordinate.
    #[must_use]
    pub const fn with_coordinate(mut self, coordinate: GeoPoint) -> Self {
        self.coordinate = Some(coordinate);
        self
    }

    /// Postal address text.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Geocoordinate, when known.
    #[must_use]
    pub const fn coordinate(&self) -> Option<GeoPoint> {
        self.coordinate
    }
}
