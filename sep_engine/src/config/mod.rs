//! Analysis configuration.
//!
//! Everything the engine stages need to know beyond the data itself: the
//! escalation toggles, detector debounce and hysteresis, the conversion
//! epsilon and the instrument calibration metadata. A configuration object
//! is passed explicitly into each stage, so several analyses with different
//! settings can run side by side.
//!
//! Configuration files are TOML or JSON:
//!
//! ```toml
//! detect_previous_event = true
//! two_peaks = true
//! instrument = "GOES-13"
//!
//! [detection]
//! onset_samples = 3
//! end_samples = 3
//! end_fraction = 0.85
//! ```

pub mod instruments;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SepError, SepResult};
pub use instruments::{ExcludedBin, InstrumentProfile};

/// Debounce and hysteresis settings of the threshold-crossing detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Consecutive samples above the threshold needed to declare onset.
    #[serde(default = "default_debounce_samples")]
    pub onset_samples: usize,
    /// Consecutive samples at or below the end threshold needed to declare the end.
    #[serde(default = "default_debounce_samples")]
    pub end_samples: usize,
    /// End threshold as a fraction of the crossing threshold.
    #[serde(default = "default_end_fraction")]
    pub end_fraction: f64,
}

/// Settings of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Re-detect when the window opens inside an event already in progress.
    #[serde(default)]
    pub detect_previous_event: bool,
    /// Merge a short first excursion with a following one.
    #[serde(default)]
    pub two_peaks: bool,
    /// Events shorter than this are candidates for the two-peaks merge.
    #[serde(default = "default_two_peaks_max_duration_hours")]
    pub two_peaks_max_duration_hours: f64,
    /// Stand-in for zero flux before taking logarithms.
    #[serde(default = "default_zero_flux_epsilon")]
    pub zero_flux_epsilon: f64,
    /// Sentinel marking bad samples in raw reader output.
    #[serde(default = "default_badval")]
    pub badval: f64,
    /// Name of a built-in instrument profile.
    #[serde(default)]
    pub instrument: Option<String>,
    /// Additional bins to exclude from integral-flux sums.
    #[serde(default)]
    pub excluded_bins: Vec<ExcludedBin>,
    #[serde(default)]
    pub detection: DetectionConfig,
}

fn default_debounce_samples() -> usize {
    3
}

fn default_end_fraction() -> f64 {
    0.85
}

fn default_two_peaks_max_duration_hours() -> f64 {
    24.0
}

fn default_zero_flux_epsilon() -> f64 {
    1e-15
}

fn default_badval() -> f64 {
    -1.0
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            onset_samples: default_debounce_samples(),
            end_samples: default_debounce_samples(),
            end_fraction: default_end_fraction(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detect_previous_event: false,
            two_peaks: false,
            two_peaks_max_duration_hours: default_two_peaks_max_duration_hours(),
            zero_flux_epsilon: default_zero_flux_epsilon(),
            badval: default_badval(),
            instrument: None,
            excluded_bins: Vec::new(),
            detection: DetectionConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a configuration file.
    ///
    /// The format follows the extension: `.toml` or `.json`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SepResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SepError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let config: AnalysisConfig = match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| {
                SepError::ConfigurationError(format!("Failed to parse config file: {}", e))
            })?,
            "json" => serde_json::from_str(&content).map_err(|e| {
                SepError::ConfigurationError(format!("Failed to parse config file: {}", e))
            })?,
            other => {
                return Err(SepError::ConfigurationError(format!(
                    "Unsupported config format '{}' for {}; use .toml or .json",
                    other,
                    path.display()
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from the default location.
    ///
    /// Searches for `sep_engine.toml` in:
    /// 1. Current directory
    /// 2. `config/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> SepResult<Self> {
        let search_paths = [
            PathBuf::from("sep_engine.toml"),
            PathBuf::from("config/sep_engine.toml"),
            PathBuf::from("../sep_engine.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(SepError::ConfigurationError(
            "No sep_engine.toml found in standard locations".to_string(),
        ))
    }

    /// Check value ranges and the instrument name.
    pub fn validate(&self) -> SepResult<()> {
        if self.detection.onset_samples == 0 || self.detection.end_samples == 0 {
            return Err(SepError::ConfigurationError(
                "detection.onset_samples and detection.end_samples must be at least 1".to_string(),
            ));
        }

        let fraction = self.detection.end_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(SepError::ConfigurationError(format!(
                "detection.end_fraction must be in (0, 1], got {}",
                fraction
            )));
        }

        if !(self.zero_flux_epsilon > 0.0) {
            return Err(SepError::ConfigurationError(format!(
                "zero_flux_epsilon must be positive, got {}",
                self.zero_flux_epsilon
            )));
        }

        if !(self.two_peaks_max_duration_hours > 0.0) {
            return Err(SepError::ConfigurationError(format!(
                "two_peaks_max_duration_hours must be positive, got {}",
                self.two_peaks_max_duration_hours
            )));
        }

        if let Some(name) = &self.instrument {
            if instruments::lookup(name).is_none() {
                let known: Vec<&str> = instruments::known_instruments().collect();
                return Err(SepError::ConfigurationError(format!(
                    "Unknown instrument '{}'. Known instruments: {}",
                    name,
                    known.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Bins to exclude: the instrument profile's list followed by explicit ones.
    pub fn excluded_bins(&self) -> Vec<ExcludedBin> {
        let mut bins: Vec<ExcludedBin> = self
            .instrument
            .as_deref()
            .and_then(instruments::lookup)
            .map(|profile| profile.excluded_bins.clone())
            .unwrap_or_default();

        for bin in &self.excluded_bins {
            if !bins.contains(bin) {
                bins.push(*bin);
            }
        }
        bins
    }
}
