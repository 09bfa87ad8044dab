use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, TrackError};

/// Derived state of a project name within the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectStatus {
    Working,
    NotWorking,
    DoesNotExist,
}

/// One contiguous span of work. An interval without an end is still running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkInterval {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl WorkInterval {
    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Length of the interval, measured up to `now` while it is still open.
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.end.unwrap_or(now) - self.start
    }
}

/// Canonical form of a project name: trimmed and lower-cased.
pub fn normalize_name(name: &str) -> Result<String> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(TrackError::InvalidArgument(
            "Project names cannot be empty.".to_string(),
        ));
    }
    Ok(normalized)
}

/// Renders a duration as `1h 05m`, `12m 30s` or `45s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn normalize_folds_case_and_trims() {
        assert_eq!(normalize_name("  Foo ").unwrap(), "foo");
        assert_eq!(normalize_name("BAR").unwrap(), "bar");
    }

    #[test]
    fn normalize_rejects_blank_names() {
        assert!(matches!(
            normalize_name("   "),
            Err(TrackError::InvalidArgument(_))
        ));
        assert!(normalize_name("").is_err());
    }

    #[test]
    fn open_interval_runs_until_now() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let now = start + Duration::minutes(90);
        let interval = WorkInterval::open(start);
        assert!(interval.is_open());
        assert_eq!(interval.duration(now), Duration::minutes(90));

        let closed = WorkInterval {
            start,
            end: Some(start + Duration::minutes(30)),
        };
        assert!(!closed.is_open());
        assert_eq!(closed.duration(now), Duration::minutes(30));
    }

    #[test]
    fn durations_are_human_readable() {
        assert_eq!(format_duration(Duration::seconds(45)), "45s");
        assert_eq!(format_duration(Duration::seconds(750)), "12m 30s");
        assert_eq!(format_duration(Duration::minutes(65)), "1h 05m");
        assert_eq!(format_duration(Duration::seconds(-5)), "0s");
    }
}
