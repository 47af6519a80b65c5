//! # SEP Engine
//!
//! Solar Energetic Particle event detection over particle-flux time series.
//!
//! Given the flux of one instrument over a time window, the engine derives
//! per-threshold event statistics: onset (threshold crossing), peak, rise
//! time, end, duration and event-integrated fluence.
//!
//! ## Features
//!
//! - **Gap repair**: time-linear interpolation of missing and invalid samples
//! - **Spectral conversion**: integral flux above any energy from differential bins,
//!   with per-instrument bin exclusions
//! - **Detection**: debounced threshold crossing with end hysteresis
//! - **Escalations**: previous-event re-detection and two-peaks merging
//! - **Fluence**: per-bin fluence spectrum and per-threshold integral fluence
//!
//! ## Architecture
//!
//! - [`models`]: energy bins, flux samples and series, thresholds, event records
//! - [`config`]: analysis configuration and instrument calibration metadata
//! - [`preprocessing`]: series validation and gap repair
//! - [`algorithms`]: spectral conversion, crossing detection, fluence
//! - [`services`]: threshold aggregation and the end-to-end pipeline
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use sep_engine::models::{EnergyBins, FluxSeries, ThresholdSet, SWPC_10_MEV};
//! use sep_engine::services::SepAnalysis;
//!
//! let t0 = Utc.with_ymd_and_hms(2017, 9, 10, 16, 0, 0).unwrap();
//! let ten = vec![2.0, 3.0, 11.0, 12.0, 13.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0];
//! let hundred = vec![0.1; ten.len()];
//! let dates = (0..ten.len() as i64).map(|i| t0 + Duration::minutes(5 * i)).collect();
//!
//! let bins = EnergyBins::integral(&[10.0, 100.0])?;
//! let series = FluxSeries::from_raw(dates, vec![ten, hundred], bins, -1.0)?;
//!
//! let report = SepAnalysis::new().run(&series, &ThresholdSet::operational())?;
//! let event = report.get(&SWPC_10_MEV).and_then(|r| r.record.event()).unwrap();
//! assert_eq!(event.peak_flux, 13.0);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod services;

pub use config::AnalysisConfig;
pub use error::{SepError, SepResult};
pub use services::{AnalysisReport, SepAnalysis};
