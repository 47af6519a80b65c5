//! Event-detection algorithms.
//!
//! # Components
//!
//! - [`spectral`]: integral flux above an energy from differential or integral channels
//! - [`threshold`]: debounced threshold-crossing state machine
//! - [`fluence`]: event-integrated fluence per channel
//!
//! Every algorithm works on repaired data; see
//! [`crate::preprocessing::gaps::GapInterpolator`].

pub mod fluence;
pub mod spectral;
pub mod threshold;

#[cfg(test)]
mod threshold_tests;

pub use fluence::FluenceIntegrator;
pub use spectral::{power_law_integral, SpectralIntegralConverter};
pub use threshold::{summarize, DetectorState, ThresholdCrossingDetector};
