//! Per-threshold event records.

use std::ops::RangeInclusive;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::models::time::{serde_seconds, Timestamp};

/// Sample indices `[start, end]`, inclusive, of an event in the analysed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    pub start: usize,
    pub end: usize,
}

impl EventWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Onset, peak and end of an above-threshold interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEvent {
    pub crossing_time: Timestamp,
    pub peak_flux: f64,
    pub peak_time: Timestamp,
    /// `peak_time - crossing_time`.
    #[serde(with = "serde_seconds")]
    pub rise_time: Duration,
    pub end_time: Timestamp,
    /// `end_time - crossing_time`.
    #[serde(with = "serde_seconds")]
    pub duration: Duration,
    /// The window closed before the end criterion was met; `end_time` is
    /// the last sample.
    pub truncated: bool,
    pub window: EventWindow,
    /// Index of `peak_time` in the analysed series.
    pub peak_index: usize,
}

/// Outcome of evaluating one threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EventRecord {
    /// The threshold was never crossed in the window. Not an error.
    Uncrossed,
    Crossed(ThresholdEvent),
}

impl EventRecord {
    pub fn is_crossed(&self) -> bool {
        matches!(self, EventRecord::Crossed(_))
    }

    pub fn event(&self) -> Option<&ThresholdEvent> {
        match self {
            EventRecord::Crossed(event) => Some(event),
            EventRecord::Uncrossed => None,
        }
    }

    pub fn crossing_time(&self) -> Option<Timestamp> {
        self.event().map(|e| e.crossing_time)
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.event().map(|e| e.end_time)
    }

    /// Peak flux, zero when uncrossed.
    pub fn peak_flux(&self) -> f64 {
        self.event().map_or(0.0, |e| e.peak_flux)
    }

    pub fn window(&self) -> Option<EventWindow> {
        self.event().map(|e| e.window)
    }
}
