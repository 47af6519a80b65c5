//! Known instrument calibration metadata.
//!
//! Some instruments carry a differential bin whose range overlaps a separate
//! open-ended detector. Summing both would count the same particles twice, so
//! the overlapping bin is left out of the integral-flux estimate. Which bin
//! that is depends on the instrument, so it lives here as data instead of as
//! special cases in the converter.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::models::energy::{EnergyBin, UpperBound};

/// A bin, identified by its exact edges, to leave out of integral-flux sums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExcludedBin {
    pub low: f64,
    /// `None` for an open-ended channel.
    #[serde(default)]
    pub high: Option<f64>,
}

impl ExcludedBin {
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            low,
            high: Some(high),
        }
    }

    pub fn matches(&self, bin: &EnergyBin) -> bool {
        let high = match self.high {
            Some(h) => UpperBound::Bounded(h),
            None => UpperBound::Open,
        };
        bin.has_edges(self.low, high)
    }
}

/// Calibration metadata for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub excluded_bins: Vec<ExcludedBin>,
}

/// EPEAD's highest differential bin (110-900 MeV) spans every HEPAD channel.
const EPEAD_HEPAD_OVERLAP: ExcludedBin = ExcludedBin {
    low: 110.0,
    high: Some(900.0),
};

static PROFILES: Lazy<Vec<InstrumentProfile>> = Lazy::new(|| {
    let plain = |name, description| InstrumentProfile {
        name,
        description,
        excluded_bins: Vec::new(),
    };
    let epead = |name, description| InstrumentProfile {
        name,
        description,
        excluded_bins: vec![EPEAD_HEPAD_OVERLAP],
    };

    vec![
        plain("GOES-08", "GOES-08 EPS and HEPAD"),
        plain("GOES-10", "GOES-10 EPS and HEPAD"),
        plain("GOES-11", "GOES-11 EPS and HEPAD"),
        plain("GOES-12", "GOES-12 EPS and HEPAD"),
        epead("GOES-13", "GOES-13 EPEAD and HEPAD"),
        epead("GOES-14", "GOES-14 EPEAD and HEPAD"),
        epead("GOES-15", "GOES-15 EPEAD and HEPAD"),
        plain("GOES-16", "GOES-16 SGPS"),
        plain("GOES-17", "GOES-17 SGPS"),
        plain("SEPEM", "SEPEM reference data set"),
        plain("SEPEMv3", "SEPEM reference data set, version 3"),
        plain("EPHIN", "SOHO/EPHIN"),
    ]
});

/// Look up a built-in profile by name, ignoring case.
pub fn lookup(name: &str) -> Option<&'static InstrumentProfile> {
    PROFILES
        .iter()
        .find(|profile| profile.name.eq_ignore_ascii_case(name))
}

/// Names of all built-in profiles.
pub fn known_instruments() -> impl Iterator<Item = &'static str> {
    PROFILES.iter().map(|profile| profile.name)
}
