//! Flux series validation with detailed error and warning reporting.
//!
//! This module checks assembled flux series for structural consistency before
//! any analysis runs. Errors describe series that cannot be analysed at all
//! (mismatched lengths, unordered dates); warnings describe data that can be
//! analysed but deserves a look (irregular cadence, mostly-bad channels).

use serde::{Deserialize, Serialize};

use crate::models::energy::EnergyBins;
use crate::models::flux::FluxSample;
use crate::models::time::Timestamp;

/// Fraction of bad samples above which a channel is reported as sparse.
const SPARSE_CHANNEL_FRACTION: f64 = 0.5;

/// Validation result with categorized issues and statistics.
///
/// Errors make `is_valid` false, while warnings are informational and don't
/// fail validation.
///
/// # Examples
///
/// ```
/// use sep_engine::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_warning("Channel 3 is mostly bad".to_string());
/// assert!(result.is_valid);
///
/// result.add_error("Dates are not increasing".to_string());
/// assert!(!result.is_valid);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Summary statistics computed during validation.
///
/// * `total_samples` - Number of time samples
/// * `channels` - Number of energy channels
/// * `missing_samples` - Samples with no measurement, over all channels
/// * `invalid_samples` - Samples flagged bad, over all channels
/// * `irregular_intervals` - Consecutive date pairs whose spacing differs
///   from the first interval
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_samples: usize,
    pub channels: usize,
    pub missing_samples: usize,
    pub invalid_samples: usize,
    pub irregular_intervals: usize,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds a critical error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Adds a non-critical warning without invalidating the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for assembled flux series.
pub struct SeriesValidator;

impl SeriesValidator {
    /// Validates the parts of a flux series.
    ///
    /// Errors:
    /// - no samples
    /// - channel count differs from bin count
    /// - a channel length differs from the number of dates
    /// - dates not strictly increasing
    ///
    /// Warnings:
    /// - sampling interval not uniform
    /// - more than half of a channel's samples missing or invalid
    pub fn validate_parts(
        dates: &[Timestamp],
        channels: &[Vec<FluxSample>],
        bins: &EnergyBins,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.stats.total_samples = dates.len();
        result.stats.channels = channels.len();

        if dates.is_empty() {
            result.add_error("Flux series has no samples".to_string());
        }

        if channels.len() != bins.len() {
            result.add_error(format!(
                "Flux series has {} channels but {} energy bins",
                channels.len(),
                bins.len()
            ));
        }

        for (c, channel) in channels.iter().enumerate() {
            if channel.len() != dates.len() {
                result.add_error(format!(
                    "Channel {} ({}) has {} samples but the series has {} dates",
                    c,
                    bins.label(c),
                    channel.len(),
                    dates.len()
                ));
            }
        }

        if let Some(i) = dates.windows(2).position(|pair| pair[1] <= pair[0]) {
            result.add_error(format!(
                "Dates are not strictly increasing at index {} ({} then {})",
                i + 1,
                dates[i],
                dates[i + 1]
            ));
        }

        if !result.is_valid {
            return result;
        }

        Self::check_cadence(dates, &mut result);
        Self::check_channels(channels, bins, &mut result);

        result
    }

    fn check_cadence(dates: &[Timestamp], result: &mut ValidationResult) {
        if dates.len() < 3 {
            return;
        }

        let interval = dates[1] - dates[0];
        let irregular = dates
            .windows(2)
            .filter(|pair| pair[1] - pair[0] != interval)
            .count();

        result.stats.irregular_intervals = irregular;
        if irregular > 0 {
            result.add_warning(format!(
                "Sampling interval is not uniform: {} of {} intervals differ from the first ({} s); \
                 fluence assumes a uniform cadence",
                irregular,
                dates.len() - 1,
                interval.num_seconds()
            ));
        }
    }

    fn check_channels(
        channels: &[Vec<FluxSample>],
        bins: &EnergyBins,
        result: &mut ValidationResult,
    ) {
        for (c, channel) in channels.iter().enumerate() {
            let missing = channel
                .iter()
                .filter(|s| matches!(s, FluxSample::Missing))
                .count();
            let invalid = channel
                .iter()
                .filter(|s| matches!(s, FluxSample::Invalid))
                .count();

            result.stats.missing_samples += missing;
            result.stats.invalid_samples += invalid;

            let bad = missing + invalid;
            if !channel.is_empty() && bad as f64 / channel.len() as f64 > SPARSE_CHANNEL_FRACTION {
                result.add_warning(format!(
                    "Channel {} ({}) has {} bad samples out of {}",
                    c,
                    bins.label(c),
                    bad,
                    channel.len()
                ));
            }
        }
    }
}
