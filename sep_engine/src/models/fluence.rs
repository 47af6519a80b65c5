//! Event-integrated fluence.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Solid-angle convention of a fluence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluenceUnits {
    /// Per steradian, as the flux was measured.
    PerSteradian,
    /// Multiplied by 4π.
    Omnidirectional,
}

/// Fluence per energy bin over one event window.
///
/// `energies[b]` is the bin centre (lower edge for open channels) in MeV.
/// Differential bins yield cm⁻² sr⁻¹ MeV⁻¹, open channels cm⁻² sr⁻¹; the
/// `sr⁻¹` drops for [`FluenceUnits::Omnidirectional`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluenceSpectrum {
    pub energies: Vec<f64>,
    pub fluence: Vec<f64>,
    pub units: FluenceUnits,
}

impl FluenceSpectrum {
    pub fn new(energies: Vec<f64>, fluence: Vec<f64>) -> Self {
        Self {
            energies,
            fluence,
            units: FluenceUnits::PerSteradian,
        }
    }

    /// The same spectrum in the omnidirectional convention.
    pub fn to_omnidirectional(&self) -> Self {
        match self.units {
            FluenceUnits::Omnidirectional => self.clone(),
            FluenceUnits::PerSteradian => Self {
                energies: self.energies.clone(),
                fluence: self.fluence.iter().map(|f| f * 4.0 * PI).collect(),
                units: FluenceUnits::Omnidirectional,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.fluence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fluence.is_empty()
    }

    /// `(energy, fluence)` pairs in bin order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energies.iter().copied().zip(self.fluence.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_omnidirectional() {
        let spectrum = FluenceSpectrum::new(vec![10.0, 100.0], vec![1.0, 0.0]);
        let omni = spectrum.to_omnidirectional();

        assert_eq!(omni.units, FluenceUnits::Omnidirectional);
        assert!((omni.fluence[0] - 4.0 * PI).abs() < 1e-12);
        assert_eq!(omni.fluence[1], 0.0);
        assert_eq!(omni.energies, spectrum.energies);
    }

    #[test]
    fn test_to_omnidirectional_is_idempotent() {
        let omni = FluenceSpectrum::new(vec![10.0], vec![2.5]).to_omnidirectional();
        assert_eq!(omni.to_omnidirectional(), omni);
    }

    #[test]
    fn test_iter_pairs() {
        let spectrum = FluenceSpectrum::new(vec![5.0, 50.0], vec![3.0, 4.0]);
        assert_eq!(spectrum.iter().collect::<Vec<_>>(), vec![(5.0, 3.0), (50.0, 4.0)]);
        assert_eq!(spectrum.len(), 2);
    }
}
