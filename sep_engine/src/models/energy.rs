//! Energy channel definitions.
//!
//! Instruments report flux in energy bins. A differential instrument measures
//! bounded bins (per MeV), possibly followed by one open-ended integral
//! channel; an integral instrument only has open-ended channels, each one
//! counting every particle above its lower edge.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SepError, SepResult};

/// Upper-edge value instrument readers use to mark an open-ended channel.
pub const OPEN_SENTINEL: f64 = -1.0;

/// Upper edge of an energy bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpperBound {
    Bounded(f64),
    /// No upper edge: the channel is an integral measurement.
    Open,
}

/// A single energy channel in MeV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyBin {
    pub low: f64,
    pub high: UpperBound,
}

impl EnergyBin {
    /// Bounded bin `[low, high]`.
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            low,
            high: UpperBound::Bounded(high),
        }
    }

    /// Open-ended channel `>low`.
    pub fn open(low: f64) -> Self {
        Self {
            low,
            high: UpperBound::Open,
        }
    }

    /// Build a bin from reader edges, where an upper edge equal to
    /// [`OPEN_SENTINEL`] marks an open channel.
    pub fn from_edges(low: f64, high: f64) -> Self {
        if high == OPEN_SENTINEL {
            Self::open(low)
        } else {
            Self::new(low, high)
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.high, UpperBound::Open)
    }

    /// Geometric centre `sqrt(low * high)`, or `low` for open channels.
    pub fn center(&self) -> f64 {
        match self.high {
            UpperBound::Bounded(high) => (self.low * high).sqrt(),
            UpperBound::Open => self.low,
        }
    }

    /// Whether this bin has exactly the given edges.
    pub fn has_edges(&self, low: f64, high: UpperBound) -> bool {
        self.low == low && self.high == high
    }
}

impl fmt::Display for EnergyBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.high {
            UpperBound::Bounded(high) => write!(f, "{}-{} MeV", self.low, high),
            UpperBound::Open => write!(f, ">{} MeV", self.low),
        }
    }
}

/// Whether a series carries differential or integral flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FluxKind {
    Differential,
    Integral,
}

impl FluxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FluxKind::Differential => "differential",
            FluxKind::Integral => "integral",
        }
    }
}

/// The ordered channel set of one instrument.
///
/// Invariants, checked on construction:
/// - at least one bin, every `low` finite and positive;
/// - lower edges strictly increasing;
/// - bounded bins have `high > low`;
/// - differential sets: only the final bin may be open;
/// - integral sets: every bin is open.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyBins {
    bins: Vec<EnergyBin>,
    kind: FluxKind,
}

impl EnergyBins {
    pub fn new(bins: Vec<EnergyBin>, kind: FluxKind) -> SepResult<Self> {
        if bins.is_empty() {
            return Err(SepError::InvalidBins("no energy bins provided".to_string()));
        }

        let last = bins.len() - 1;
        for (i, bin) in bins.iter().enumerate() {
            if !bin.low.is_finite() || bin.low <= 0.0 {
                return Err(SepError::InvalidBins(format!(
                    "bin {} has a non-positive lower edge ({})",
                    i, bin.low
                )));
            }
            if let UpperBound::Bounded(high) = bin.high {
                if !high.is_finite() || high <= bin.low {
                    return Err(SepError::InvalidBins(format!(
                        "bin {} ({}) has an upper edge that does not exceed its lower edge",
                        i, bin
                    )));
                }
            }
            if i > 0 && bin.low <= bins[i - 1].low {
                return Err(SepError::InvalidBins(format!(
                    "bin {} ({}) is not ordered after bin {} ({})",
                    i,
                    bin,
                    i - 1,
                    bins[i - 1]
                )));
            }
            match kind {
                FluxKind::Differential if bin.is_open() && i != last => {
                    return Err(SepError::InvalidBins(format!(
                        "open-ended bin {} ({}) is not the final differential bin",
                        i, bin
                    )));
                }
                FluxKind::Integral if !bin.is_open() => {
                    return Err(SepError::InvalidBins(format!(
                        "integral channel {} ({}) must be open-ended",
                        i, bin
                    )));
                }
                _ => {}
            }
        }

        Ok(Self { bins, kind })
    }

    /// Differential bins from `[low, high]` edge pairs, `high == -1` marking
    /// a terminal open channel.
    pub fn differential(edges: &[[f64; 2]]) -> SepResult<Self> {
        let bins = edges
            .iter()
            .map(|[low, high]| EnergyBin::from_edges(*low, *high))
            .collect();
        Self::new(bins, FluxKind::Differential)
    }

    /// Integral channels from their energy thresholds.
    pub fn integral(thresholds: &[f64]) -> SepResult<Self> {
        let bins = thresholds.iter().map(|low| EnergyBin::open(*low)).collect();
        Self::new(bins, FluxKind::Integral)
    }

    pub fn kind(&self) -> FluxKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EnergyBin> {
        self.bins.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnergyBin> {
        self.bins.iter()
    }

    pub fn as_slice(&self) -> &[EnergyBin] {
        &self.bins
    }

    pub fn centers(&self) -> Vec<f64> {
        self.bins.iter().map(EnergyBin::center).collect()
    }

    /// Lower edge of the first bin.
    pub fn lowest_energy(&self) -> f64 {
        self.bins[0].low
    }

    /// Lower edge of the final bin.
    pub fn highest_lower_edge(&self) -> f64 {
        self.bins[self.bins.len() - 1].low
    }

    /// Human-readable label of a channel for messages.
    pub fn label(&self, index: usize) -> String {
        self.bins
            .get(index)
            .map(|bin| bin.to_string())
            .unwrap_or_else(|| format!("channel {}", index))
    }
}
