//! Debounced threshold-crossing detection.
//!
//! The detector walks one integral-flux series through three states:
//!
//! - `Below` until `onset_samples` consecutive samples exceed the threshold.
//!   The crossing is the first sample of that run.
//! - `Above` until `end_samples` consecutive samples sit at or below
//!   `end_fraction × threshold`. Any sample above that level resets the run.
//!   The end is the first sample of the qualifying run.
//! - `Ended`.
//!
//! A series that closes while `Above` ends on its last sample and the event
//! is flagged as truncated. A series that closes while `Below` yields
//! [`EventRecord::Uncrossed`].

use crate::config::DetectionConfig;
use crate::error::{SepError, SepResult};
use crate::models::event::{EventRecord, EventWindow, ThresholdEvent};
use crate::models::threshold::Threshold;
use crate::models::time::Timestamp;

/// Detector state while scanning a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Waiting for an onset run.
    Below,
    /// Crossed; waiting for an end run.
    Above,
    /// End criterion met.
    Ended,
}

/// Threshold-crossing state machine with onset debounce and end hysteresis.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdCrossingDetector {
    onset_samples: usize,
    end_samples: usize,
    end_fraction: f64,
}

impl Default for ThresholdCrossingDetector {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

impl ThresholdCrossingDetector {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            onset_samples: config.onset_samples.max(1),
            end_samples: config.end_samples.max(1),
            end_fraction: config.end_fraction,
        }
    }

    /// Detect the first event in the whole series.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use sep_engine::algorithms::threshold::ThresholdCrossingDetector;
    /// use sep_engine::models::threshold::SWPC_10_MEV;
    ///
    /// let t0 = Utc.with_ymd_and_hms(2017, 9, 10, 16, 0, 0).unwrap();
    /// let flux = [2.0, 3.0, 11.0, 12.0, 13.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0];
    /// let dates: Vec<_> = (0..flux.len() as i64).map(|i| t0 + Duration::minutes(5 * i)).collect();
    ///
    /// let record = ThresholdCrossingDetector::default()
    ///     .detect(&dates, &flux, &SWPC_10_MEV)
    ///     .unwrap();
    /// assert_eq!(record.crossing_time(), Some(dates[2]));
    /// assert_eq!(record.end_time(), Some(dates[6]));
    /// ```
    pub fn detect(
        &self,
        dates: &[Timestamp],
        flux: &[f64],
        threshold: &Threshold,
    ) -> SepResult<EventRecord> {
        self.detect_from(dates, flux, 0, threshold)
    }

    /// Detect the first event starting the scan at sample `start`.
    ///
    /// Indices in the returned record refer to the full series.
    pub fn detect_from(
        &self,
        dates: &[Timestamp],
        flux: &[f64],
        start: usize,
        threshold: &Threshold,
    ) -> SepResult<EventRecord> {
        if dates.len() != flux.len() {
            return Err(SepError::InvalidSeries(format!(
                "{} flux values for {} dates while detecting {}",
                flux.len(),
                dates.len(),
                threshold
            )));
        }
        if start > flux.len() {
            return Err(SepError::InvalidSeries(format!(
                "detection start {} is past the end of a series of {} samples",
                start,
                flux.len()
            )));
        }

        let end_level = threshold.end_level(self.end_fraction);
        let mut state = DetectorState::Below;
        let mut run = 0usize;
        let mut crossing = None;
        let mut end = None;

        for (i, &value) in flux.iter().enumerate().skip(start) {
            match state {
                DetectorState::Below => {
                    run = if value > threshold.flux { run + 1 } else { 0 };
                    if run == self.onset_samples {
                        let index = i + 1 - self.onset_samples;
                        log::debug!("{}: crossed at {} (index {})", threshold, dates[index], index);
                        crossing = Some(index);
                        state = DetectorState::Above;
                        run = 0;
                    }
                }
                DetectorState::Above => {
                    run = if value <= end_level { run + 1 } else { 0 };
                    if run == self.end_samples {
                        let index = i + 1 - self.end_samples;
                        log::debug!("{}: ended at {} (index {})", threshold, dates[index], index);
                        end = Some(index);
                        state = DetectorState::Ended;
                    }
                }
                DetectorState::Ended => break,
            }
        }

        let Some(crossing) = crossing else {
            return Ok(EventRecord::Uncrossed);
        };

        let (end, truncated) = match end {
            Some(end) => (end, false),
            None => {
                let last = flux.len() - 1;
                log::warn!(
                    "{}: series ended at {} before the flux fell below {} pfu; \
                     extend the time window for a reliable end time",
                    threshold,
                    dates[last],
                    end_level
                );
                (last, true)
            }
        };

        Ok(EventRecord::Crossed(summarize(
            dates,
            flux,
            EventWindow::new(crossing, end),
            truncated,
        )?))
    }
}

/// Peak, rise time and duration of an event over `window`.
///
/// The peak is the earliest maximum within the inclusive window. The window
/// must be ordered and lie inside the series.
pub fn summarize(
    dates: &[Timestamp],
    flux: &[f64],
    window: EventWindow,
    truncated: bool,
) -> SepResult<ThresholdEvent> {
    if dates.len() != flux.len() || window.start > window.end || window.end >= flux.len() {
        return Err(SepError::InvalidSeries(format!(
            "event window {}..={} does not fit a series of {} samples and {} dates",
            window.start,
            window.end,
            flux.len(),
            dates.len()
        )));
    }

    let (peak_index, peak_flux) = peak(flux, window);
    let crossing_time = dates[window.start];
    let end_time = dates[window.end];
    let peak_time = dates[peak_index];

    Ok(ThresholdEvent {
        crossing_time,
        peak_flux,
        peak_time,
        rise_time: peak_time - crossing_time,
        end_time,
        duration: end_time - crossing_time,
        truncated,
        window,
        peak_index,
    })
}

fn peak(flux: &[f64], window: EventWindow) -> (usize, f64) {
    let mut best = (window.start, flux[window.start]);
    for i in window.range() {
        if flux[i] > best.1 {
            best = (i, flux[i]);
        }
    }
    best
}
