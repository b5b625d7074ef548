//! Environment-driven settings.
//!
//! Values come from the process environment, after loading a `.env` file
//! when one exists. Per-tenant conflict thresholds override these defaults
//! through [`StaticConflictPolicies::set_tenant_policy`].

use crate::dispatch::{adapters::memory::StaticConflictPolicies, domain::ConflictPolicy};
use thiserror::Error;

/// Log filter directive.
pub const LOG_FILTER_VAR: &str = "FIELDOPS_LOG";
/// Soft-conflict distance threshold in kilometres.
pub const MAX_SITE_DISTANCE_VAR: &str = "FIELDOPS_MAX_SITE_DISTANCE_KM";
/// Soft-conflict travel buffer in minutes.
pub const MIN_TRAVEL_BUFFER_VAR: &str = "FIELDOPS_MIN_TRAVEL_BUFFER_MINUTES";
/// Soft-conflict daily visit cap; `0` disables the check.
pub const MAX_DAILY_VISITS_VAR: &str = "FIELDOPS_MAX_DAILY_VISITS";

/// Every variable [`Settings::from_env`] reads.
pub const SETTINGS_VARS: [&str; 4] = [
    LOG_FILTER_VAR,
    MAX_SITE_DISTANCE_VAR,
    MIN_TRAVEL_BUFFER_VAR,
    MAX_DAILY_VISITS_VAR,
];

const DEFAULT_LOG_FILTER: &str = "info";

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Logging controls.
    pub telemetry: TelemetrySettings,
    /// Default soft-conflict thresholds.
    pub conflict_policy: ConflictPolicy,
}

/// Tracing controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl Settings {
    /// Loads `.env` if present, then reads settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `.env` is unreadable or a value does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            return Err(ConfigError::DotEnv(err.to_string()));
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup. Missing keys take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value does not parse or is out of
    /// range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ConflictPolicy::default();

        let log_filter = lookup(LOG_FILTER_VAR)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());

        let max_site_distance_km = lookup(MAX_SITE_DISTANCE_VAR)
            .map(|raw| parse_distance(&raw))
            .transpose()?
            .unwrap_or(defaults.max_site_distance_km);
        let min_travel_buffer_minutes = lookup(MIN_TRAVEL_BUFFER_VAR)
            .map(|raw| parse_count(MIN_TRAVEL_BUFFER_VAR, &raw))
            .transpose()?
            .unwrap_or(defaults.min_travel_buffer_minutes);
        let max_daily_visits = lookup(MAX_DAILY_VISITS_VAR)
            .map(|raw| parse_count(MAX_DAILY_VISITS_VAR, &raw))
            .transpose()?
            .map_or(defaults.max_daily_visits, |cap| Some(cap).filter(|limit| *limit > 0));

        Ok(Self {
            telemetry: TelemetrySettings { log_filter },
            conflict_policy: ConflictPolicy {
                max_site_distance_km,
                min_travel_buffer_minutes,
                max_daily_visits,
            },
        })
    }

    /// Policy source answering the configured defaults for every tenant.
    #[must_use]
    pub fn policy_source(&self) -> StaticConflictPolicies {
        StaticConflictPolicies::new(self.conflict_policy)
    }
}

fn parse_distance(raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(MAX_SITE_DISTANCE_VAR, raw, "expected a number of kilometres"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            MAX_SITE_DISTANCE_VAR,
            raw,
            "expected a non-negative distance",
        ));
    }
    Ok(value)
}

fn parse_count(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| invalid(key, raw, "expected a non-negative integer"))
}

fn invalid(key: &'static str, raw: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: raw.to_owned(),
        expected,
    }
}

/// Errors raised while loading settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A value failed to parse.
    #[error("{key}={value:?} is invalid: {expected}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// What was expected.
        expected: &'static str,
    },

    /// The `.env` file exists but could not be read.
    #[error("failed to load .env: {0}")]
    DotEnv(String),
}
