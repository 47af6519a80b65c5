use anyhow::{Context, Result};
use serde::Serialize;

use crate::algorithms::fluence::FluenceIntegrator;
use crate::algorithms::spectral::SpectralIntegralConverter;
use crate::config::AnalysisConfig;
use crate::models::energy::FluxKind;
use crate::models::event::{EventRecord, EventWindow};
use crate::models::fluence::FluenceSpectrum;
use crate::models::flux::{FluxSample, FluxSeries};
use crate::models::threshold::{Threshold, ThresholdSet};
use crate::models::time::Timestamp;
use crate::preprocessing::gaps::GapInterpolator;
use crate::services::events::EventAggregator;

/// Result for one threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdReport {
    pub threshold: Threshold,
    pub record: EventRecord,
    /// Sample range of the event; `None` when uncrossed
    pub window: Option<EventWindow>,
    /// Fluence of the threshold's integral flux over the event, in cm⁻² sr⁻¹
    pub integral_fluence: Option<f64>,
    /// Fluence of every instrument channel over the event
    pub fluence_spectrum: Option<FluenceSpectrum>,
    pub previous_event_skipped: bool,
    pub second_peak_merged: bool,
    pub warnings: Vec<String>,
}

/// Result of a full analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub kind: FluxKind,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Advisory findings about the input series
    pub series_warnings: Vec<String>,
    pub thresholds: Vec<ThresholdReport>,
}

impl AnalysisReport {
    /// Report for a threshold, if it was evaluated
    pub fn get(&self, threshold: &Threshold) -> Option<&ThresholdReport> {
        self.thresholds.iter().find(|r| r.threshold == *threshold)
    }

    /// Reports of crossed thresholds only
    pub fn crossed(&self) -> impl Iterator<Item = &ThresholdReport> {
        self.thresholds.iter().filter(|r| r.record.is_crossed())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// End-to-end SEP analysis
///
/// Runs, in order: gap repair of every channel, integral flux per threshold
/// (with a second repair pass for samples no bin contributed to), event
/// detection with the configured escalations, and fluence over each event.
pub struct SepAnalysis {
    config: AnalysisConfig,
}

impl Default for SepAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl SepAnalysis {
    /// Create an analysis with default configuration
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    /// Create an analysis with custom configuration
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse a flux series against a threshold set
    ///
    /// # Arguments
    /// * `series` - Time-ordered flux of one instrument, possibly with gaps
    /// * `thresholds` - Operational thresholds plus an optional user threshold
    ///
    /// # Returns
    /// One `ThresholdReport` per threshold, in threshold order. Uncrossed
    /// thresholds are reported, not treated as errors.
    pub fn run(&self, series: &FluxSeries, thresholds: &ThresholdSet) -> Result<AnalysisReport> {
        self.config
            .validate()
            .context("Invalid analysis configuration")?;

        let validation = series.validate();
        for warning in &validation.warnings {
            log::warn!("{}", warning);
        }

        let cleaned =
            GapInterpolator::repair_series(series).context("Failed to repair flux gaps")?;
        let converter = SpectralIntegralConverter::new(&self.config);
        let aggregator = EventAggregator::new(&self.config);

        let mut reports = Vec::with_capacity(thresholds.len());
        for threshold in thresholds.iter() {
            let report = self
                .evaluate(&cleaned, &converter, &aggregator, threshold)
                .with_context(|| format!("Failed to evaluate threshold {}", threshold))?;
            reports.push(report);
        }

        let dates = cleaned.dates();
        Ok(AnalysisReport {
            kind: cleaned.kind(),
            start: dates[0],
            end: dates[dates.len() - 1],
            series_warnings: validation.warnings,
            thresholds: reports,
        })
    }

    fn evaluate(
        &self,
        cleaned: &FluxSeries,
        converter: &SpectralIntegralConverter,
        aggregator: &EventAggregator,
        threshold: &Threshold,
    ) -> Result<ThresholdReport> {
        let dates = cleaned.dates();

        let integral = converter
            .flux_above(cleaned, threshold)
            .with_context(|| format!("Failed to compute flux above {} MeV", threshold.energy))?;
        let flux = GapInterpolator::repair_integral(dates, &integral, threshold)
            .with_context(|| format!("Failed to repair flux above {} MeV", threshold.energy))?;

        let outcome = aggregator.aggregate(dates, &flux, threshold)?;

        let (integral_fluence, fluence_spectrum) = match outcome.record.window() {
            Some(window) => {
                let range = window.range();
                let samples: Vec<FluxSample> =
                    flux[range.clone()].iter().copied().map(FluxSample::Value).collect();
                let fluence =
                    FluenceIntegrator::fluence(&dates[range], &samples, &threshold.to_string())
                        .context("Failed to integrate threshold fluence")?;
                let spectrum = FluenceIntegrator::spectrum(cleaned, window)
                    .context("Failed to integrate fluence spectrum")?;
                (Some(fluence), Some(spectrum))
            }
            None => (None, None),
        };

        Ok(ThresholdReport {
            threshold: outcome.threshold,
            window: outcome.record.window(),
            record: outcome.record,
            integral_fluence,
            fluence_spectrum,
            previous_event_skipped: outcome.previous_event_skipped,
            second_peak_merged: outcome.second_peak_merged,
            warnings: outcome.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SepError;
    use crate::models::energy::EnergyBins;
    use crate::models::threshold::{SWPC_100_MEV, SWPC_10_MEV};
    use chrono::{Duration, TimeZone, Utc};

    fn dates(n: usize) -> Vec<Timestamp> {
        let start = Utc.with_ymd_and_hms(2017, 9, 10, 16, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::minutes(5 * i as i64)).collect()
    }

    fn integral_series(ten: Vec<f64>, hundred: Vec<f64>) -> FluxSeries {
        let n = ten.len();
        FluxSeries::from_raw(
            dates(n),
            vec![ten, hundred],
            EnergyBins::integral(&[10.0, 100.0]).unwrap(),
            -1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_run_integral_series() {
        let series = integral_series(
            vec![2.0, 3.0, 11.0, 12.0, 13.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0],
            vec![0.1; 12],
        );
        let report = SepAnalysis::new()
            .run(&series, &ThresholdSet::operational())
            .unwrap();

        assert_eq!(report.thresholds.len(), 2);
        let ten = report.get(&SWPC_10_MEV).unwrap();
        assert_eq!(ten.window, Some(EventWindow::new(2, 6)));
        assert_eq!(ten.integral_fluence, Some((11.0 + 12.0 + 13.0 + 9.0 + 8.0) * 300.0));
        let spectrum = ten.fluence_spectrum.as_ref().unwrap();
        assert_eq!(spectrum.energies, vec![10.0, 100.0]);
        assert!((spectrum.fluence[1] - 0.5 * 300.0).abs() < 1e-9);

        let hundred = report.get(&SWPC_100_MEV).unwrap();
        assert_eq!(hundred.record, EventRecord::Uncrossed);
        assert!(hundred.integral_fluence.is_none());
        assert!(hundred.fluence_spectrum.is_none());
        assert_eq!(report.crossed().count(), 1);
    }

    #[test]
    fn test_gaps_are_repaired_before_detection() {
        let series = integral_series(
            vec![2.0, 3.0, 11.0, -1.0, 13.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0],
            vec![0.1; 12],
        );
        let report = SepAnalysis::new()
            .run(&series, &ThresholdSet::operational())
            .unwrap();
        assert_eq!(
            report.get(&SWPC_10_MEV).unwrap().window,
            Some(EventWindow::new(2, 6))
        );
    }

    #[test]
    fn test_missing_integral_channel_is_fatal() {
        let series = FluxSeries::from_raw(
            dates(4),
            vec![vec![1.0; 4]],
            EnergyBins::integral(&[10.0]).unwrap(),
            -1.0,
        )
        .unwrap();

        let err = SepAnalysis::new()
            .run(&series, &ThresholdSet::operational())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SepError>(),
            Some(SepError::NoMatchingChannel { .. })
        ));
        assert!(format!("{:#}", err).contains(">100 MeV, 1 pfu"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let series = integral_series(vec![1.0; 4], vec![1.0; 4]);
        let mut config = AnalysisConfig::default();
        config.detection.end_fraction = 0.0;

        let result = SepAnalysis::with_config(config).run(&series, &ThresholdSet::operational());
        assert!(result.is_err());
    }

    #[test]
    fn test_report_serializes() {
        let series = integral_series(vec![20.0; 6], vec![0.1; 6]);
        let report = SepAnalysis::new()
            .run(&series, &ThresholdSet::operational())
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["kind"], "integral");
        assert_eq!(json["thresholds"][0]["record"]["status"], "crossed");
        assert_eq!(json["thresholds"][0]["record"]["truncated"], true);
        assert_eq!(json["thresholds"][1]["record"]["status"], "uncrossed");
        assert!(json["thresholds"][1]["fluence_spectrum"].is_null());
    }
}
