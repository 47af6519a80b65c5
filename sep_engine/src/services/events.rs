//! Per-threshold event detection with escalations.
//!
//! The aggregator runs the crossing detector once per threshold and then
//! applies two optional escalations, each switched on in [`AnalysisConfig`]:
//!
//! - **Previous-event detection.** A crossing on the very first sample means
//!   the window opened inside an event already in progress. Detection is
//!   re-run from the end of that event and the new result replaces the old
//!   one. This happens once; a chain of overlapping events is not followed.
//! - **Two-peaks extension.** An event shorter than
//!   `two_peaks_max_duration_hours` may have ended falsely between two
//!   excursions of one physical event. Detection is re-run from its end, and
//!   a second event found there is merged into the first.
//!
//! In a merged event the peak is the higher of the two segment peaks while
//! the rise time is still measured from the first crossing.

use chrono::Duration;
use serde::Serialize;

use crate::algorithms::threshold::{summarize, ThresholdCrossingDetector};
use crate::config::AnalysisConfig;
use crate::error::{SepError, SepResult};
use crate::models::event::{EventRecord, EventWindow, ThresholdEvent};
use crate::models::threshold::Threshold;
use crate::models::time::{hours_to_duration, Timestamp};

/// Result of evaluating one threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedEvent {
    pub threshold: Threshold,
    pub record: EventRecord,
    /// The first pass started inside an ongoing event and was re-run.
    pub previous_event_skipped: bool,
    /// A second excursion was merged into the event.
    pub second_peak_merged: bool,
    /// Advisory findings for this threshold.
    pub warnings: Vec<String>,
}

/// Drives the crossing detector across thresholds.
pub struct EventAggregator {
    detector: ThresholdCrossingDetector,
    detect_previous_event: bool,
    two_peaks: bool,
    two_peaks_max_duration: Duration,
}

impl Default for EventAggregator {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl EventAggregator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            detector: ThresholdCrossingDetector::new(&config.detection),
            detect_previous_event: config.detect_previous_event,
            two_peaks: config.two_peaks,
            two_peaks_max_duration: hours_to_duration(config.two_peaks_max_duration_hours),
        }
    }

    /// Evaluate every threshold against its own integral-flux series.
    ///
    /// Thresholds are independent and processed in order. An uncrossed
    /// threshold does not stop the others; a fatal error does.
    pub fn aggregate_all(
        &self,
        dates: &[Timestamp],
        series: &[(Threshold, Vec<f64>)],
    ) -> SepResult<Vec<AggregatedEvent>> {
        series
            .iter()
            .map(|(threshold, flux)| self.aggregate(dates, flux, threshold))
            .collect()
    }

    /// Evaluate one threshold.
    pub fn aggregate(
        &self,
        dates: &[Timestamp],
        flux: &[f64],
        threshold: &Threshold,
    ) -> SepResult<AggregatedEvent> {
        let mut outcome = AggregatedEvent {
            threshold: *threshold,
            record: self.detector.detect(dates, flux, threshold)?,
            previous_event_skipped: false,
            second_peak_merged: false,
            warnings: Vec::new(),
        };

        if self.detect_previous_event {
            self.skip_previous_event(dates, flux, &mut outcome)?;
        }
        if self.two_peaks {
            self.extend_two_peaks(dates, flux, &mut outcome)?;
        }

        match &outcome.record {
            EventRecord::Uncrossed => {
                log::info!("{}: threshold not crossed", threshold);
            }
            EventRecord::Crossed(event) => {
                if event.truncated {
                    outcome.warnings.push(format!(
                        "{}: flux still above the end level at {}; end time set to the last \
                         sample, extend the time window for a reliable end time",
                        threshold, event.end_time
                    ));
                }
                log::info!(
                    "{}: crossed {}, peak {} pfu at {}, ended {}",
                    threshold,
                    event.crossing_time,
                    event.peak_flux,
                    event.peak_time,
                    event.end_time
                );
            }
        }

        Ok(outcome)
    }

    fn skip_previous_event(
        &self,
        dates: &[Timestamp],
        flux: &[f64],
        outcome: &mut AggregatedEvent,
    ) -> SepResult<()> {
        let first = match &outcome.record {
            EventRecord::Crossed(event) if event.window.start == 0 => event.clone(),
            _ => return Ok(()),
        };
        let threshold = outcome.threshold;

        log::debug!(
            "{}: above threshold at window start; re-detecting after {}",
            threshold,
            first.end_time
        );
        let record = self
            .detector
            .detect_from(dates, flux, first.window.end, &threshold)?;

        // reachable only with single-sample onset runs
        if let Some(event) = record.event() {
            if event.crossing_time == event.end_time {
                return Err(SepError::DegenerateEvent {
                    threshold: threshold.to_string(),
                    time: event.crossing_time,
                });
            }
        }

        outcome.warnings.push(if first.truncated {
            format!(
                "{}: an event was already in progress at the window start and did not end \
                 before {}; extend the time window to capture a later event",
                threshold, first.end_time
            )
        } else {
            format!(
                "{}: an event was already in progress at the window start; it ended at {} and \
                 detection restarted there",
                threshold, first.end_time
            )
        });
        outcome.record = record;
        outcome.previous_event_skipped = true;
        Ok(())
    }

    fn extend_two_peaks(
        &self,
        dates: &[Timestamp],
        flux: &[f64],
        outcome: &mut AggregatedEvent,
    ) -> SepResult<()> {
        let first = match &outcome.record {
            EventRecord::Crossed(event)
                if !event.truncated && event.duration < self.two_peaks_max_duration =>
            {
                event.clone()
            }
            _ => return Ok(()),
        };
        let threshold = outcome.threshold;

        let rerun = self
            .detector
            .detect_from(dates, flux, first.window.end, &threshold)?;
        let EventRecord::Crossed(second) = rerun else {
            log::debug!("{}: no second excursion after {}", threshold, first.end_time);
            return Ok(());
        };

        log::debug!(
            "{}: merging second excursion {} - {} into the event",
            threshold,
            second.crossing_time,
            second.end_time
        );
        outcome.record = EventRecord::Crossed(merge(dates, flux, &first, &second)?);
        outcome.second_peak_merged = true;
        Ok(())
    }
}

/// Merge a second excursion into the first.
///
/// The peak comes from whichever segment peaks higher, ties going to the
/// first; the rise time is always measured from the first crossing.
pub fn merge(
    dates: &[Timestamp],
    flux: &[f64],
    first: &ThresholdEvent,
    second: &ThresholdEvent,
) -> SepResult<ThresholdEvent> {
    let mut merged = summarize(
        dates,
        flux,
        EventWindow::new(first.window.start, second.window.end),
        second.truncated,
    )?;

    let peak = if second.peak_flux > first.peak_flux {
        second
    } else {
        first
    };
    merged.peak_flux = peak.peak_flux;
    merged.peak_time = peak.peak_time;
    merged.peak_index = peak.peak_index;
    merged.rise_time = peak.peak_time - first.crossing_time;
    Ok(merged)
}
