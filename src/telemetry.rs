//! Tracing subscriber initialisation.

use crate::config::TelemetrySettings;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive does not parse.
    #[error("invalid log filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        /// Rejected directive.
        value: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },

    /// A global subscriber is already installed.
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Installs a compact `fmt` subscriber. `RUST_LOG` wins over the configured
/// filter when set.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter does not parse or a subscriber
/// is already installed.
pub fn init(settings: &TelemetrySettings) -> Result<(), TelemetryError> {
    let env_filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), settings)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn build_filter(
    env_directive: Option<String>,
    settings: &TelemetrySettings,
) -> Result<EnvFilter, TelemetryError> {
    let directive = env_directive
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| settings.log_filter.clone());
    EnvFilter::try_new(&directive).map_err(|source| TelemetryError::EnvFilter {
        value: directive,
        source,
    })
}
