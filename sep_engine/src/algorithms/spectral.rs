//! Differential-to-integral flux conversion.
//!
//! Integral flux above `min_energy` is estimated from a differential spectrum
//! by fitting a power law through each pair of neighbouring bin centres and
//! integrating it in closed form. A terminal open-ended channel already
//! measures everything above its lower edge and is added as is.
//!
//! Bins listed as excluded (instrument calibration metadata or per-run
//! configuration) are dropped before pairing, so their neighbours are joined
//! directly.

use crate::config::{AnalysisConfig, ExcludedBin};
use crate::error::{SepError, SepResult};
use crate::models::energy::{EnergyBins, FluxKind};
use crate::models::flux::{FluxSample, FluxSeries};
use crate::models::threshold::Threshold;

/// Slopes closer than this to -1 use the logarithmic antiderivative.
const LOG_BRANCH_TOLERANCE: f64 = 1e-9;

/// Converts multi-channel flux into integral flux above an energy.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralIntegralConverter {
    excluded: Vec<ExcludedBin>,
    zero_flux_epsilon: f64,
}

impl Default for SpectralIntegralConverter {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl SpectralIntegralConverter {
    /// Converter using the configuration's exclusions and epsilon.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            excluded: config.excluded_bins(),
            zero_flux_epsilon: config.zero_flux_epsilon,
        }
    }

    pub fn with_exclusions(excluded: Vec<ExcludedBin>, zero_flux_epsilon: f64) -> Self {
        Self {
            excluded,
            zero_flux_epsilon,
        }
    }

    pub fn excluded_bins(&self) -> &[ExcludedBin] {
        &self.excluded
    }

    /// Per-sample integral flux above the threshold energy.
    ///
    /// Differential series go through the power-law conversion; integral
    /// series pass through the channel whose lower edge equals the threshold
    /// energy.
    pub fn flux_above(
        &self,
        series: &FluxSeries,
        threshold: &Threshold,
    ) -> SepResult<Vec<FluxSample>> {
        match series.kind() {
            FluxKind::Differential => self.integral_series(series, threshold.energy),
            FluxKind::Integral => {
                let channel = Self::select_integral_channel(series.bins(), threshold)?;
                log::debug!(
                    "Using integral channel {} ({}) for {}",
                    channel,
                    series.bins().label(channel),
                    threshold
                );
                Ok(series.channels()[channel].clone())
            }
        }
    }

    /// Index of the integral channel whose lower edge matches the threshold energy exactly.
    pub fn select_integral_channel(bins: &EnergyBins, threshold: &Threshold) -> SepResult<usize> {
        bins.iter()
            .position(|bin| bin.is_open() && bin.low == threshold.energy)
            .ok_or_else(|| SepError::NoMatchingChannel {
                threshold: threshold.to_string(),
            })
    }

    /// Integral flux above `min_energy` for every sample of a differential series.
    pub fn integral_series(
        &self,
        series: &FluxSeries,
        min_energy: f64,
    ) -> SepResult<Vec<FluxSample>> {
        let bins = series.bins();
        Self::check_range(bins, min_energy)?;
        let included = self.included_bins(bins, true);

        let mut sample = vec![FluxSample::Missing; bins.len()];
        let mut integral = Vec::with_capacity(series.len());
        for i in 0..series.len() {
            for (c, channel) in series.channels().iter().enumerate() {
                sample[c] = channel[i];
            }
            integral.push(self.integrate(bins, &included, &sample, min_energy));
        }

        let missing = integral.iter().filter(|s| !s.is_value()).count();
        if missing > 0 {
            log::debug!(
                "{} of {} samples above {} MeV had no contributing bin",
                missing,
                integral.len(),
                min_energy
            );
        }

        Ok(integral)
    }

    /// Integral flux above `min_energy` for a single time sample.
    ///
    /// Returns [`FluxSample::Missing`] when no bin contributes, so an absent
    /// estimate is never confused with zero flux.
    ///
    /// # Examples
    ///
    /// ```
    /// use sep_engine::algorithms::spectral::SpectralIntegralConverter;
    /// use sep_engine::models::energy::EnergyBins;
    /// use sep_engine::models::flux::FluxSample;
    ///
    /// let bins = EnergyBins::differential(&[[5.0, 10.0], [10.0, 40.0], [40.0, -1.0]]).unwrap();
    /// let flux = [FluxSample::Value(2.0), FluxSample::Value(0.5), FluxSample::Value(0.1)];
    ///
    /// let converter = SpectralIntegralConverter::default();
    /// let above = converter.differential_to_integral(&bins, &flux, 10.0).unwrap();
    /// assert!(above.value().unwrap() > 0.1);
    /// ```
    pub fn differential_to_integral(
        &self,
        bins: &EnergyBins,
        flux_at_t: &[FluxSample],
        min_energy: f64,
    ) -> SepResult<FluxSample> {
        if flux_at_t.len() != bins.len() {
            return Err(SepError::InvalidSeries(format!(
                "{} flux values for {} energy bins",
                flux_at_t.len(),
                bins.len()
            )));
        }
        Self::check_range(bins, min_energy)?;
        let included = self.included_bins(bins, false);
        Ok(self.integrate(bins, &included, flux_at_t, min_energy))
    }

    fn check_range(bins: &EnergyBins, min_energy: f64) -> SepResult<()> {
        let lowest = bins.lowest_energy();
        let highest = bins.highest_lower_edge();
        if !(min_energy >= lowest && min_energy < highest) {
            return Err(SepError::EnergyOutOfRange {
                min_energy,
                lowest,
                highest,
            });
        }
        Ok(())
    }

    /// Bin indices left after exclusions, in order.
    fn included_bins(&self, bins: &EnergyBins, report: bool) -> Vec<usize> {
        if report {
            for excluded in &self.excluded {
                match bins.iter().position(|bin| excluded.matches(bin)) {
                    Some(index) => log::debug!(
                        "Excluding bin {} ({}) from integral flux",
                        index,
                        bins.label(index)
                    ),
                    None => log::warn!(
                        "Configured bin exclusion {}-{:?} MeV does not match any bin; \
                         integrating all bins",
                        excluded.low,
                        excluded.high
                    ),
                }
            }
        }

        bins.iter()
            .enumerate()
            .filter(|(_, bin)| !self.excluded.iter().any(|e| e.matches(bin)))
            .map(|(i, _)| i)
            .collect()
    }

    fn integrate(
        &self,
        bins: &EnergyBins,
        included: &[usize],
        flux: &[FluxSample],
        min_energy: f64,
    ) -> FluxSample {
        let mut total = 0.0;
        let mut contributing = 0usize;

        let bounded: Vec<usize> = included
            .iter()
            .copied()
            .filter(|&i| !bins.as_slice()[i].is_open())
            .collect();

        for (k, pair) in bounded.windows(2).enumerate() {
            let (i, j) = (pair[0], pair[1]);
            let e1 = bins.as_slice()[i].center();
            let e2 = bins.as_slice()[j].center();
            if e2 <= min_energy {
                continue;
            }
            let (Some(f1), Some(f2)) = (flux[i].value(), flux[j].value()) else {
                continue;
            };

            // the first pair's law extends down to a min_energy below its centre
            let lower = if k == 0 { min_energy } else { e1.max(min_energy) };
            total += power_law_integral(
                e1,
                f1.max(self.zero_flux_epsilon),
                e2,
                f2.max(self.zero_flux_epsilon),
                lower,
                e2,
            );
            contributing += 1;
        }

        if let Some(&last) = included.last() {
            if bins.as_slice()[last].is_open() {
                if let Some(f) = flux[last].value() {
                    total += f;
                    contributing += 1;
                }
            }
        }

        if contributing == 0 {
            FluxSample::Missing
        } else {
            FluxSample::Value(total)
        }
    }
}

/// Integral over `[a, b]` of the power law through `(e1, f1)` and `(e2, f2)`.
///
/// Fluxes must be positive.
pub fn power_law_integral(e1: f64, f1: f64, e2: f64, f2: f64, a: f64, b: f64) -> f64 {
    let slope = (f2 / f1).ln() / (e2 / e1).ln();
    let exponent = slope + 1.0;
    if exponent.abs() < LOG_BRANCH_TOLERANCE {
        f1 * e1 * (b / a).ln()
    } else {
        f1 * e1 / exponent * ((b / e1).powf(exponent) - (a / e1).powf(exponent))
    }
}
