//! Orchestration of the detection stages.
//!
//! [`events`] drives the crossing detector across thresholds and applies the
//! escalations; [`analysis`] runs the full pipeline from a raw series to a
//! report.

pub mod analysis;
pub mod events;

pub use analysis::{AnalysisReport, SepAnalysis, ThresholdReport};
pub use events::{AggregatedEvent, EventAggregator};
