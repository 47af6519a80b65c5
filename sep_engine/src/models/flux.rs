//! Flux samples and multi-channel flux series.
//!
//! Instrument readers mark bad data with a single negative sentinel. On the
//! way in, every raw number is classified into a [`FluxSample`] so that later
//! stages never have to guess whether a negative value, a `NaN` or a
//! placeholder means "missing", "invalid" or "not computed".

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{SepError, SepResult};
use crate::models::energy::{EnergyBins, FluxKind};
use crate::models::time::Timestamp;
use crate::preprocessing::validator::{SeriesValidator, ValidationResult};

/// One flux measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "flux", rename_all = "lowercase")]
pub enum FluxSample {
    /// No measurement at this time (reader gap, `NaN`, or nothing to compute from).
    Missing,
    /// A measurement flagged as bad (negative, infinite or the reader sentinel).
    Invalid,
    Value(f64),
}

impl FluxSample {
    /// Classify a raw reader value.
    ///
    /// `NaN` is missing; the sentinel, negatives and infinities are invalid.
    pub fn classify(raw: f64, badval: f64) -> Self {
        if raw.is_nan() {
            FluxSample::Missing
        } else if raw == badval || raw < 0.0 || raw.is_infinite() {
            FluxSample::Invalid
        } else {
            FluxSample::Value(raw)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            FluxSample::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, FluxSample::Value(_))
    }
}

impl From<Option<f64>> for FluxSample {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => FluxSample::classify(v, f64::NEG_INFINITY),
            None => FluxSample::Missing,
        }
    }
}

/// Collapse a repaired channel into plain numbers.
///
/// Any remaining non-value sample is an internal-consistency failure: the
/// repair stage was skipped or the window was not the one that was repaired.
pub fn require_values(
    dates: &[Timestamp],
    samples: &[FluxSample],
    channel: usize,
    label: &str,
) -> SepResult<Vec<f64>> {
    samples
        .iter()
        .zip(dates)
        .map(|(sample, date)| {
            sample.value().ok_or_else(|| SepError::UnrepairedSample {
                channel,
                bin: label.to_string(),
                date: *date,
            })
        })
        .collect()
}

/// Time-ordered, multi-channel flux measurements of one instrument.
///
/// `channels[c][i]` is the flux of energy bin `c` at `dates[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluxSeries {
    dates: Vec<Timestamp>,
    channels: Vec<Vec<FluxSample>>,
    bins: EnergyBins,
}

impl FluxSeries {
    /// Build a series, rejecting it if any structural invariant fails.
    ///
    /// Advisory findings (irregular cadence, sparse channels) are only
    /// logged at debug level here; [`FluxSeries::validate`] returns them.
    pub fn new(
        dates: Vec<Timestamp>,
        channels: Vec<Vec<FluxSample>>,
        bins: EnergyBins,
    ) -> SepResult<Self> {
        let validation = SeriesValidator::validate_parts(&dates, &channels, &bins);
        if !validation.is_valid {
            return Err(SepError::InvalidSeries(validation.errors.join("; ")));
        }
        for warning in &validation.warnings {
            log::debug!("{}", warning);
        }

        Ok(Self {
            dates,
            channels,
            bins,
        })
    }

    /// Build a series from raw reader output where `badval` marks bad samples.
    pub fn from_raw(
        dates: Vec<Timestamp>,
        flux: Vec<Vec<f64>>,
        bins: EnergyBins,
        badval: f64,
    ) -> SepResult<Self> {
        let channels = flux
            .into_iter()
            .map(|channel| {
                channel
                    .into_iter()
                    .map(|raw| FluxSample::classify(raw, badval))
                    .collect()
            })
            .collect();
        Self::new(dates, channels, bins)
    }

    /// Build a series from raw reader output using the configured `badval`.
    pub fn from_raw_with(
        dates: Vec<Timestamp>,
        flux: Vec<Vec<f64>>,
        bins: EnergyBins,
        config: &AnalysisConfig,
    ) -> SepResult<Self> {
        Self::from_raw(dates, flux, bins, config.badval)
    }

    /// Same dates and bins with replacement channel data.
    pub fn with_channels(&self, channels: Vec<Vec<FluxSample>>) -> SepResult<Self> {
        Self::new(self.dates.clone(), channels, self.bins.clone())
    }

    pub fn dates(&self) -> &[Timestamp] {
        &self.dates
    }

    pub fn bins(&self) -> &EnergyBins {
        &self.bins
    }

    pub fn kind(&self) -> FluxKind {
        self.bins.kind()
    }

    pub fn channels(&self) -> &[Vec<FluxSample>] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&[FluxSample]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of time samples.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// True when every sample of every channel holds a value.
    pub fn is_clean(&self) -> bool {
        self.channels
            .iter()
            .all(|channel| channel.iter().all(FluxSample::is_value))
    }

    /// Plain values of one channel; fails on any unrepaired sample.
    pub fn values(&self, channel: usize) -> SepResult<Vec<f64>> {
        let samples = self.channel(channel).ok_or_else(|| {
            SepError::InvalidSeries(format!(
                "channel {} requested from a series with {} channels",
                channel,
                self.num_channels()
            ))
        })?;
        require_values(&self.dates, samples, channel, &self.bins.label(channel))
    }

    /// Index of the first sample at or after `time`.
    pub fn index_at_or_after(&self, time: Timestamp) -> Option<usize> {
        let index = self.dates.partition_point(|date| *date < time);
        (index < self.dates.len()).then_some(index)
    }

    /// Sub-series over a sample range.
    pub fn slice(&self, range: Range<usize>) -> SepResult<Self> {
        if range.start >= range.end || range.end > self.len() {
            return Err(SepError::InvalidSeries(format!(
                "slice {}..{} is outside a series of {} samples",
                range.start,
                range.end,
                self.len()
            )));
        }
        let channels = self
            .channels
            .iter()
            .map(|channel| channel[range.clone()].to_vec())
            .collect();
        Self::new(self.dates[range].to_vec(), channels, self.bins.clone())
    }

    /// Re-run structural and advisory validation.
    pub fn validate(&self) -> ValidationResult {
        SeriesValidator::validate_parts(&self.dates, &self.channels, &self.bins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn dates(n: usize) -> Vec<Timestamp> {
        let start = Utc.with_ymd_and_hms(2017, 9, 10, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::minutes(5 * i as i64)).collect()
    }

    fn integral_bins() -> EnergyBins {
        EnergyBins::integral(&[10.0, 100.0]).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(FluxSample::classify(3.5, -1.0), FluxSample::Value(3.5));
        assert_eq!(FluxSample::classify(0.0, -1.0), FluxSample::Value(0.0));
        assert_eq!(FluxSample::classify(-1.0, -1.0), FluxSample::Invalid);
        assert_eq!(FluxSample::classify(-99.0, -1.0), FluxSample::Invalid);
        assert_eq!(FluxSample::classify(f64::INFINITY, -1.0), FluxSample::Invalid);
        assert_eq!(FluxSample::classify(f64::NAN, -1.0), FluxSample::Missing);
    }

    #[test]
    fn test_from_raw_with_configured_sentinel() {
        let config = AnalysisConfig {
            badval: 9999.0,
            ..AnalysisConfig::default()
        };
        let series = FluxSeries::from_raw_with(
            dates(3),
            vec![vec![4.0, 9999.0, 6.0], vec![0.1, 0.2, -1.0]],
            integral_bins(),
            &config,
        )
        .unwrap();

        assert_eq!(
            series.channel(0).unwrap(),
            &[FluxSample::Value(4.0), FluxSample::Invalid, FluxSample::Value(6.0)]
        );
        assert_eq!(series.channel(1).unwrap()[2], FluxSample::Invalid);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(FluxSample::from(None), FluxSample::Missing);
        assert_eq!(FluxSample::from(Some(2.0)), FluxSample::Value(2.0));
    }

    #[test]
    fn test_from_raw_classifies_every_sample() {
        let series = FluxSeries::from_raw(
            dates(3),
            vec![vec![1.0, -1.0, 2.0], vec![0.1, 0.2, f64::NAN]],
            integral_bins(),
            -1.0,
        )
        .unwrap();

        assert_eq!(series.channel(0).unwrap()[1], FluxSample::Invalid);
        assert_eq!(series.channel(1).unwrap()[2], FluxSample::Missing);
        assert!(!series.is_clean());
    }

    #[test]
    fn test_rejects_channel_length_mismatch() {
        let result = FluxSeries::from_raw(
            dates(3),
            vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]],
            integral_bins(),
            -1.0,
        );
        assert!(matches!(result, Err(SepError::InvalidSeries(_))));
    }

    #[test]
    fn test_values_reports_unrepaired_sample() {
        let series = FluxSeries::from_raw(
            dates(3),
            vec![vec![1.0, -1.0, 2.0], vec![1.0, 1.0, 1.0]],
            integral_bins(),
            -1.0,
        )
        .unwrap();

        let err = series.values(0).unwrap_err();
        match err {
            SepError::UnrepairedSample { channel, bin, date } => {
                assert_eq!(channel, 0);
                assert_eq!(bin, ">10 MeV");
                assert_eq!(date, dates(3)[1]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(series.values(1).unwrap(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_index_at_or_after() {
        let series = FluxSeries::from_raw(
            dates(4),
            vec![vec![1.0; 4], vec![1.0; 4]],
            integral_bins(),
            -1.0,
        )
        .unwrap();
        let d = dates(4);

        assert_eq!(series.index_at_or_after(d[0]), Some(0));
        assert_eq!(series.index_at_or_after(d[1] + Duration::minutes(1)), Some(2));
        assert_eq!(series.index_at_or_after(d[3] + Duration::minutes(1)), None);
    }

    #[test]
    fn test_slice() {
        let series = FluxSeries::from_raw(
            dates(5),
            vec![vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![5.0, 4.0, 3.0, 2.0, 1.0]],
            integral_bins(),
            -1.0,
        )
        .unwrap();

        let sub = series.slice(1..4).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.dates()[0], dates(5)[1]);
        assert_eq!(sub.values(1).unwrap(), vec![4.0, 3.0, 2.0]);

        assert!(series.slice(3..3).is_err());
        assert!(series.slice(2..9).is_err());
    }
}
