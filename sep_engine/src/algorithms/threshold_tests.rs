#[cfg(test)]
mod tests {
    use crate::algorithms::threshold::{summarize, ThresholdCrossingDetector};
    use crate::config::DetectionConfig;
    use crate::error::SepError;
    use crate::models::event::{EventRecord, EventWindow};
    use crate::models::threshold::{Threshold, SWPC_10_MEV};
    use crate::models::time::Timestamp;
    use chrono::{Duration, TimeZone, Utc};

    /// Five-minute dates starting 2017-09-10 16:00 UTC
    fn dates(n: usize) -> Vec<Timestamp> {
        let start = Utc.with_ymd_and_hms(2017, 9, 10, 16, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::minutes(5 * i as i64)).collect()
    }

    fn detect(flux: &[f64]) -> EventRecord {
        ThresholdCrossingDetector::default()
            .detect(&dates(flux.len()), flux, &SWPC_10_MEV)
            .unwrap()
    }

    /// Twelve samples, >10 MeV channel, threshold 10 pfu
    #[test]
    fn test_reference_fixture() {
        let flux = [2.0, 3.0, 11.0, 12.0, 13.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0];
        let d = dates(flux.len());
        let record = detect(&flux);

        let event = record.event().expect("threshold should be crossed");
        // 9 > 8.5 so the end run is 8, 7, 6
        assert_eq!(event.window, EventWindow::new(2, 6));
        assert_eq!(event.crossing_time, d[2]);
        assert_eq!(event.end_time, d[6]);
        assert_eq!(event.peak_flux, 13.0);
        assert_eq!(event.peak_time, d[4]);
        assert_eq!(event.peak_index, 4);
        assert_eq!(event.rise_time, Duration::minutes(10));
        assert_eq!(event.duration, Duration::minutes(20));
        assert!(!event.truncated);
    }

    /// Two samples above threshold are not enough
    #[test]
    fn test_short_excursion_is_ignored() {
        let record = detect(&[1.0, 11.0, 12.0, 1.0, 11.0, 12.0, 13.0, 1.0, 1.0, 1.0]);
        assert_eq!(record.event().map(|e| e.window.start), Some(4));
    }

    /// Equal to the threshold is not above it
    #[test]
    fn test_threshold_is_strict() {
        let record = detect(&[10.0, 10.0, 10.0, 10.0, 10.0]);
        assert_eq!(record, EventRecord::Uncrossed);
        assert_eq!(record.peak_flux(), 0.0);
    }

    /// End level 8.5 is inclusive
    #[test]
    fn test_end_level_is_inclusive() {
        let record = detect(&[11.0, 11.0, 11.0, 8.5, 8.5, 8.5, 20.0]);
        let event = record.event().unwrap();
        assert_eq!(event.window, EventWindow::new(0, 3));
    }

    /// A sample above the end level restarts the end run
    #[test]
    fn test_end_run_resets() {
        let record = detect(&[11.0, 11.0, 11.0, 5.0, 5.0, 9.0, 5.0, 5.0, 5.0, 1.0]);
        let event = record.event().unwrap();
        assert_eq!(event.window, EventWindow::new(0, 6));
    }

    /// Still above at the last sample: truncated, ends on the last sample
    #[test]
    fn test_truncated_event() {
        let flux = [1.0, 15.0, 20.0, 25.0, 22.0, 8.0, 8.0];
        let d = dates(flux.len());
        let record = detect(&flux);

        let event = record.event().unwrap();
        assert!(event.truncated);
        assert_eq!(event.end_time, d[6]);
        assert_eq!(event.peak_flux, 25.0);
        assert_eq!(event.duration, Duration::minutes(25));
    }

    /// Onset run completed by the final sample
    #[test]
    fn test_onset_run_at_series_end() {
        let record = detect(&[1.0, 1.0, 11.0, 11.0, 11.0]);
        let event = record.event().unwrap();
        assert_eq!(event.window, EventWindow::new(2, 4));
        assert!(event.truncated);
    }

    /// Peak ties resolve to the earliest sample
    #[test]
    fn test_peak_tie_takes_earliest() {
        let record = detect(&[12.0, 14.0, 12.0, 14.0, 1.0, 1.0, 1.0]);
        assert_eq!(record.event().unwrap().peak_index, 1);
    }

    /// The peak ignores samples outside the event window
    #[test]
    fn test_peak_restricted_to_window() {
        let record = detect(&[1.0, 11.0, 12.0, 13.0, 1.0, 1.0, 1.0, 50.0, 50.0]);
        let event = record.event().unwrap();
        assert_eq!(event.peak_flux, 13.0);
        assert_eq!(event.window, EventWindow::new(1, 4));
    }

    #[test]
    fn test_no_crossing() {
        assert_eq!(detect(&[1.0, 2.0, 3.0, 2.0, 1.0]), EventRecord::Uncrossed);
        assert_eq!(detect(&[]), EventRecord::Uncrossed);
    }

    #[test]
    fn test_detect_from_uses_absolute_indices() {
        let flux = [20.0, 20.0, 20.0, 1.0, 1.0, 1.0, 30.0, 30.0, 30.0, 1.0, 1.0, 1.0];
        let d = dates(flux.len());
        let record = ThresholdCrossingDetector::default()
            .detect_from(&d, &flux, 3, &SWPC_10_MEV)
            .unwrap();

        let event = record.event().unwrap();
        assert_eq!(event.window, EventWindow::new(6, 9));
        assert_eq!(event.crossing_time, d[6]);
    }

    #[test]
    fn test_detect_from_past_end() {
        let d = dates(3);
        let result =
            ThresholdCrossingDetector::default().detect_from(&d, &[1.0; 3], 4, &SWPC_10_MEV);
        assert!(result.is_err());

        let record = ThresholdCrossingDetector::default()
            .detect_from(&d, &[20.0; 3], 3, &SWPC_10_MEV)
            .unwrap();
        assert_eq!(record, EventRecord::Uncrossed);
    }

    #[test]
    fn test_length_mismatch() {
        let result = ThresholdCrossingDetector::default().detect(&dates(3), &[1.0; 4], &SWPC_10_MEV);
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_debounce() {
        let detector = ThresholdCrossingDetector::new(&DetectionConfig {
            onset_samples: 1,
            end_samples: 2,
            end_fraction: 0.5,
        });
        let threshold = Threshold::new(100.0, 1.0).unwrap();
        let flux = [0.1, 1.5, 0.6, 0.5, 0.4, 0.3];

        let record = detector.detect(&dates(flux.len()), &flux, &threshold).unwrap();
        assert_eq!(record.window(), Some(EventWindow::new(1, 3)));
    }

    #[test]
    fn test_summarize_window() {
        let flux = [2.0, 3.0, 11.0, 12.0, 13.0, 9.0, 8.0];
        let d = dates(flux.len());
        let event = summarize(&d, &flux, EventWindow::new(2, 6), false).unwrap();
        assert_eq!(event.peak_index, 4);
        assert_eq!(event.rise_time, Duration::minutes(10));
        assert_eq!(event.duration, Duration::minutes(20));
    }

    #[test]
    fn test_summarize_rejects_bad_window() {
        let flux = [2.0, 3.0, 11.0];
        let d = dates(flux.len());
        for window in [EventWindow::new(1, 3), EventWindow::new(2, 1)] {
            assert!(matches!(
                summarize(&d, &flux, window, false),
                Err(SepError::InvalidSeries(_))
            ));
        }
        assert!(summarize(&d[..2], &flux, EventWindow::new(0, 1), false).is_err());
    }
}
