//! Gap repair for flux channels.
//!
//! Missing and invalid samples are replaced by a time-linear interpolation
//! between the nearest valid samples on either side. Gaps touching the start
//! or the end of the window are flat-filled from the nearest valid sample.
//! A channel without a single valid sample cannot be repaired and is a fatal
//! error: the caller has to request a wider window.

use crate::error::{SepError, SepResult};
use crate::models::flux::{FluxSample, FluxSeries};
use crate::models::threshold::Threshold;
use crate::models::time::{duration_seconds, Timestamp};

/// Repairs missing and invalid samples, one channel at a time.
pub struct GapInterpolator;

impl GapInterpolator {
    /// Repair a single channel.
    ///
    /// `channel` and `label` only feed error messages. A channel without bad
    /// samples is returned unchanged, so repairing twice is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use sep_engine::models::flux::FluxSample;
    /// use sep_engine::preprocessing::gaps::GapInterpolator;
    ///
    /// let t0 = Utc.with_ymd_and_hms(2017, 9, 10, 0, 0, 0).unwrap();
    /// let dates: Vec<_> = (0..3).map(|i| t0 + Duration::minutes(5 * i)).collect();
    /// let samples = [FluxSample::Value(2.0), FluxSample::Invalid, FluxSample::Value(4.0)];
    ///
    /// let repaired = GapInterpolator::repair(&dates, &samples, 0, ">10 MeV").unwrap();
    /// assert_eq!(repaired[1], FluxSample::Value(3.0));
    /// ```
    pub fn repair(
        dates: &[Timestamp],
        samples: &[FluxSample],
        channel: usize,
        label: &str,
    ) -> SepResult<Vec<FluxSample>> {
        if dates.len() != samples.len() {
            return Err(SepError::InvalidSeries(format!(
                "channel {} ({}) has {} samples for {} dates",
                channel,
                label,
                samples.len(),
                dates.len()
            )));
        }

        let Some((repaired, bad)) = Self::fill(dates, samples) else {
            return Err(SepError::NoValidAnchor {
                channel,
                bin: label.to_string(),
                date: dates[0],
            });
        };
        if bad == 0 {
            return Ok(repaired);
        }

        if 2 * bad > samples.len() {
            log::warn!(
                "Channel {} ({}) is mostly interpolated: {} of {} samples repaired",
                channel,
                label,
                bad,
                samples.len()
            );
        } else {
            log::debug!(
                "Repaired {} of {} samples in channel {} ({})",
                bad,
                samples.len(),
                channel,
                label
            );
        }

        Ok(repaired)
    }

    /// Repair the integral flux derived for `threshold`.
    ///
    /// Samples no energy bin contributed to are filled like any other gap.
    /// The result holds plain values, ready for detection.
    pub fn repair_integral(
        dates: &[Timestamp],
        samples: &[FluxSample],
        threshold: &Threshold,
    ) -> SepResult<Vec<f64>> {
        if dates.len() != samples.len() {
            return Err(SepError::InvalidSeries(format!(
                "flux above {} has {} samples for {} dates",
                threshold,
                samples.len(),
                dates.len()
            )));
        }

        let Some((repaired, bad)) = Self::fill(dates, samples) else {
            return Err(SepError::NoIntegralFlux {
                threshold: threshold.to_string(),
                date: dates[0],
            });
        };
        if bad > 0 {
            log::debug!(
                "Repaired {} of {} integral samples for {}",
                bad,
                samples.len(),
                threshold
            );
        }

        Ok(repaired.iter().filter_map(FluxSample::value).collect())
    }

    /// Repair every channel of a series, producing a new series.
    pub fn repair_series(series: &FluxSeries) -> SepResult<FluxSeries> {
        let channels = series
            .channels()
            .iter()
            .enumerate()
            .map(|(c, samples)| {
                Self::repair(series.dates(), samples, c, &series.bins().label(c))
            })
            .collect::<SepResult<Vec<_>>>()?;

        series.with_channels(channels)
    }

    /// Fill every gap, returning the samples and how many were bad.
    ///
    /// `None` when samples exist but none holds a value.
    fn fill(dates: &[Timestamp], samples: &[FluxSample]) -> Option<(Vec<FluxSample>, usize)> {
        let bad = samples.iter().filter(|s| !s.is_value()).count();
        if bad == 0 {
            return Some((samples.to_vec(), 0));
        }
        if bad == samples.len() {
            return None;
        }

        // next_valid[i]: nearest index >= i holding a value
        let mut next_valid = vec![None; samples.len()];
        let mut upcoming = None;
        for i in (0..samples.len()).rev() {
            if samples[i].is_value() {
                upcoming = Some(i);
            }
            next_valid[i] = upcoming;
        }

        let mut repaired = Vec::with_capacity(samples.len());
        let mut previous: Option<(usize, f64)> = None;
        for (i, sample) in samples.iter().enumerate() {
            if let FluxSample::Value(v) = sample {
                previous = Some((i, *v));
                repaired.push(*sample);
                continue;
            }

            let following = next_valid[i].and_then(|k| samples[k].value().map(|v| (k, v)));
            let value = match (previous, following) {
                (Some((_, pre)), None) => pre,
                (None, Some((_, post))) => post,
                (Some((j, pre)), Some((k, post))) => {
                    Self::interpolate(dates[j], pre, dates[k], post, dates[i])
                }
                (None, None) => return None,
            };
            repaired.push(FluxSample::Value(value));
        }

        Some((repaired, bad))
    }

    fn interpolate(
        pre_date: Timestamp,
        pre: f64,
        post_date: Timestamp,
        post: f64,
        date: Timestamp,
    ) -> f64 {
        if pre == post {
            return pre;
        }
        let span = duration_seconds(post_date - pre_date);
        let offset = duration_seconds(date - pre_date);
        pre + (post - pre) * offset / span
    }
}
