//! Error types for the SEP engine.
//!
//! Every variant is fatal for the call that produced it. Advisory conditions
//! (uncrossed thresholds, truncated windows, skipped bin exclusions) are not
//! errors; they are logged and attached to the report instead.

use crate::models::time::Timestamp;

/// Result type for engine operations
pub type SepResult<T> = Result<T, SepError>;

/// Error type for engine operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SepError {
    #[error("Invalid flux series: {0}")]
    InvalidSeries(String),

    #[error("Invalid energy bins: {0}")]
    InvalidBins(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// A channel has no valid sample that could anchor the repair of a gap.
    #[error(
        "Channel {channel} ({bin}) has no valid sample to anchor the gap at {date}; \
         extend the requested time window"
    )]
    NoValidAnchor {
        channel: usize,
        bin: String,
        date: Timestamp,
    },

    /// No energy bin contributed to the flux above a threshold at any sample.
    #[error(
        "No bin contributes to the flux above {threshold} anywhere from {date}; \
         extend the requested time window or review the bin exclusions"
    )]
    NoIntegralFlux { threshold: String, date: Timestamp },

    /// A stage that requires repaired data found a missing or invalid sample.
    #[error("Channel {channel} ({bin}) still holds an unrepaired sample at {date}")]
    UnrepairedSample {
        channel: usize,
        bin: String,
        date: Timestamp,
    },

    #[error(
        "Requested minimum energy {min_energy} MeV is outside the supported range \
         [{lowest}, {highest}) MeV"
    )]
    EnergyOutOfRange {
        min_energy: f64,
        lowest: f64,
        highest: f64,
    },

    #[error("No integral channel matches threshold {threshold}")]
    NoMatchingChannel { threshold: String },

    #[error("Fluence window for {bin} holds a missing or invalid sample at {date}")]
    BadFluenceSample { bin: String, date: Timestamp },

    #[error("Fluence window for {bin} has {samples} sample(s); at least two are required")]
    FluenceWindowTooShort { bin: String, samples: usize },

    #[error(
        "Threshold {threshold}: crossing time equals end time ({time}) after previous-event \
         detection; event duration is undefined"
    )]
    DegenerateEvent { threshold: String, time: Timestamp },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}
