use chrono::{DateTime, Duration, Utc};

/// Sample timestamp. All series are in UTC.
pub type Timestamp = DateTime<Utc>;

/// Length of a duration in seconds, with sub-second precision.
pub fn duration_seconds(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(micros) => micros as f64 / 1e6,
        None => duration.num_milliseconds() as f64 / 1e3,
    }
}

/// Length of a duration in hours.
pub fn duration_hours(duration: Duration) -> f64 {
    duration_seconds(duration) / 3600.0
}

/// Build a duration from fractional hours (used by configuration values).
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::microseconds((hours * 3600.0 * 1e6).round() as i64)
}

/// Serde adapter storing a `chrono::Duration` as floating-point seconds.
pub mod serde_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::duration_seconds(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::microseconds((secs * 1e6).round() as i64))
    }
}
