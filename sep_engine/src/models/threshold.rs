//! Energy/flux threshold definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SepError, SepResult};

/// An (energy, flux) pair: integral flux above `energy` MeV exceeding `flux` pfu.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Minimum particle energy in MeV.
    pub energy: f64,
    /// Flux level in pfu.
    pub flux: f64,
}

impl Threshold {
    /// Build a threshold, rejecting non-positive or non-finite values.
    pub fn new(energy: f64, flux: f64) -> SepResult<Self> {
        if !energy.is_finite() || energy <= 0.0 {
            return Err(SepError::InvalidThreshold(format!(
                "energy must be positive and finite, got {} MeV",
                energy
            )));
        }
        if !flux.is_finite() || flux <= 0.0 {
            return Err(SepError::InvalidThreshold(format!(
                "flux must be positive and finite, got {} pfu",
                flux
            )));
        }
        Ok(Self { energy, flux })
    }

    /// Flux level at or below which an event is considered over.
    pub fn end_level(&self, end_fraction: f64) -> f64 {
        end_fraction * self.flux
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">{} MeV, {} pfu", self.energy, self.flux)
    }
}

/// The operational >10 MeV, 10 pfu threshold.
pub const SWPC_10_MEV: Threshold = Threshold {
    energy: 10.0,
    flux: 10.0,
};

/// The operational >100 MeV, 1 pfu threshold.
pub const SWPC_100_MEV: Threshold = Threshold {
    energy: 100.0,
    flux: 1.0,
};

/// Thresholds evaluated in one analysis.
///
/// The two operational thresholds are always present, in order, followed by
/// at most one caller-supplied threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdSet {
    thresholds: Vec<Threshold>,
}

impl ThresholdSet {
    /// The operational thresholds only.
    pub fn operational() -> Self {
        Self {
            thresholds: vec![SWPC_10_MEV, SWPC_100_MEV],
        }
    }

    /// Operational thresholds plus one user threshold.
    ///
    /// A user threshold equal to an operational one is rejected, as is a
    /// second user threshold.
    pub fn with_user(mut self, threshold: Threshold) -> SepResult<Self> {
        let threshold = Threshold::new(threshold.energy, threshold.flux)?;
        if self.user().is_some() {
            return Err(SepError::InvalidThreshold(format!(
                "only one user threshold is supported; cannot add {}",
                threshold
            )));
        }
        if self.thresholds.contains(&threshold) {
            return Err(SepError::InvalidThreshold(format!(
                "{} is already evaluated as an operational threshold",
                threshold
            )));
        }
        self.thresholds.push(threshold);
        Ok(self)
    }

    /// The user threshold, if one was added.
    pub fn user(&self) -> Option<&Threshold> {
        self.thresholds.get(2)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Threshold> {
        self.thresholds.iter()
    }

    pub fn as_slice(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self::operational()
    }
}

impl<'a> IntoIterator for &'a ThresholdSet {
    type Item = &'a Threshold;
    type IntoIter = std::slice::Iter<'a, Threshold>;

    fn into_iter(self) -> Self::IntoIter {
        self.thresholds.iter()
    }
}
