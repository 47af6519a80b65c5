//! Event-integrated fluence.

use crate::error::{SepError, SepResult};
use crate::models::event::EventWindow;
use crate::models::fluence::FluenceSpectrum;
use crate::models::flux::{FluxSample, FluxSeries};
use crate::models::time::{duration_seconds, Timestamp};

/// Sums flux times sampling interval over an event window.
pub struct FluenceIntegrator;

impl FluenceIntegrator {
    /// Fluence of one channel over the given samples.
    ///
    /// The sampling interval is taken from the first two dates and assumed
    /// uniform. Every sample must hold a value: a missing or invalid one means
    /// the window was never repaired.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use sep_engine::algorithms::fluence::FluenceIntegrator;
    /// use sep_engine::models::flux::FluxSample;
    ///
    /// let t0 = Utc.with_ymd_and_hms(2017, 9, 10, 16, 0, 0).unwrap();
    /// let dates: Vec<_> = (0..4).map(|i| t0 + Duration::minutes(5 * i)).collect();
    /// let flux = vec![FluxSample::Value(2.0); 4];
    ///
    /// let fluence = FluenceIntegrator::fluence(&dates, &flux, ">10 MeV").unwrap();
    /// assert_eq!(fluence, 2.0 * 4.0 * 300.0);
    /// ```
    pub fn fluence(dates: &[Timestamp], flux: &[FluxSample], label: &str) -> SepResult<f64> {
        if dates.len() != flux.len() {
            return Err(SepError::InvalidSeries(format!(
                "fluence window for {} has {} samples for {} dates",
                label,
                flux.len(),
                dates.len()
            )));
        }
        if dates.len() < 2 {
            return Err(SepError::FluenceWindowTooShort {
                bin: label.to_string(),
                samples: dates.len(),
            });
        }

        let interval = duration_seconds(dates[1] - dates[0]);
        flux.iter()
            .zip(dates)
            .try_fold(0.0, |total, (sample, date)| match sample {
                FluxSample::Value(v) => Ok(total + v * interval),
                FluxSample::Missing | FluxSample::Invalid => Err(SepError::BadFluenceSample {
                    bin: label.to_string(),
                    date: *date,
                }),
            })
    }

    /// Fluence of every channel of `series` over `window`.
    pub fn spectrum(series: &FluxSeries, window: EventWindow) -> SepResult<FluenceSpectrum> {
        if window.is_empty() || window.end >= series.len() {
            return Err(SepError::InvalidSeries(format!(
                "fluence window {}..={} is outside a series of {} samples",
                window.start,
                window.end,
                series.len()
            )));
        }

        let dates = &series.dates()[window.range()];
        let fluence = series
            .channels()
            .iter()
            .enumerate()
            .map(|(c, channel)| {
                Self::fluence(dates, &channel[window.range()], &series.bins().label(c))
            })
            .collect::<SepResult<Vec<_>>>()?;

        Ok(FluenceSpectrum::new(series.bins().centers(), fluence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::energy::EnergyBins;
    use chrono::{Duration, TimeZone, Utc};
    use FluxSample::{Invalid, Missing, Value};

    fn dates(n: usize) -> Vec<Timestamp> {
        let start = Utc.with_ymd_and_hms(2017, 9, 10, 16, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::minutes(5 * i as i64)).collect()
    }

    #[test]
    fn test_constant_flux() {
        let fluence = FluenceIntegrator::fluence(&dates(6), &[Value(3.0); 6], "c0").unwrap();
        assert_eq!(fluence, 3.0 * 6.0 * 300.0);
    }

    #[test]
    fn test_zero_flux_is_valid() {
        let fluence = FluenceIntegrator::fluence(&dates(3), &[Value(0.0); 3], "c0").unwrap();
        assert_eq!(fluence, 0.0);
    }

    #[test]
    fn test_bad_sample_is_fatal() {
        let d = dates(4);
        let err = FluenceIntegrator::fluence(
            &d,
            &[Value(1.0), Value(1.0), Missing, Invalid],
            "40-80 MeV",
        )
        .unwrap_err();
        assert_eq!(
            err,
            SepError::BadFluenceSample {
                bin: "40-80 MeV".to_string(),
                date: d[2],
            }
        );
    }

    #[test]
    fn test_single_sample_window() {
        let err = FluenceIntegrator::fluence(&dates(1), &[Value(1.0)], "c0").unwrap_err();
        assert!(matches!(err, SepError::FluenceWindowTooShort { samples: 1, .. }));
    }

    #[test]
    fn test_spectrum_over_window() {
        let series = FluxSeries::from_raw(
            dates(5),
            vec![vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![0.0, 1.0, 1.0, 1.0, 0.0]],
            EnergyBins::differential(&[[10.0, 40.0], [40.0, -1.0]]).unwrap(),
            -1.0,
        )
        .unwrap();

        let spectrum = FluenceIntegrator::spectrum(&series, EventWindow::new(1, 3)).unwrap();
        assert_eq!(spectrum.energies, vec![20.0, 40.0]);
        assert_eq!(spectrum.fluence, vec![9.0 * 300.0, 3.0 * 300.0]);
    }

    #[test]
    fn test_spectrum_window_out_of_range() {
        let series = FluxSeries::from_raw(
            dates(3),
            vec![vec![1.0; 3]],
            EnergyBins::integral(&[10.0]).unwrap(),
            -1.0,
        )
        .unwrap();
        assert!(FluenceIntegrator::spectrum(&series, EventWindow::new(1, 3)).is_err());
    }
}
