use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::error::{Result, TrackError};
use crate::types::WorkInterval;

/// An interval row together with the id of the project owning it.
pub struct IntervalRow {
    pub project_id: i64,
    pub interval: WorkInterval,
}

/// Every interval in insertion order, which is also chronological order per project.
pub fn query_intervals(conn: &Connection) -> Result<Vec<IntervalRow>> {
    let mut stmt =
        conn.prepare("SELECT project_id, start_time, end_time FROM intervals ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;
    let mut result = Vec::new();
    for row in rows {
        let (project_id, start, end) = row?;
        result.push(IntervalRow {
            project_id,
            interval: WorkInterval {
                start: parse_datetime(&start)?,
                end: end.as_deref().map(parse_datetime).transpose()?,
            },
        });
    }
    Ok(result)
}

pub fn create_interval(project_id: i64, interval: &WorkInterval, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO intervals (project_id, start_time, end_time) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            project_id,
            format_datetime(&interval.start),
            interval.end.as_ref().map(format_datetime),
        ],
    )?;
    Ok(())
}

pub fn delete_all_intervals(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM intervals", [])?;
    Ok(())
}

/// RFC 3339 in UTC with nanoseconds, so a value reads back exactly as written.
fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| TrackError::CorruptData(format!("invalid timestamp {raw:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamps_keep_subsecond_precision() {
        let value = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(parse_datetime(&format_datetime(&value)).unwrap(), value);
    }

    #[test]
    fn offsets_are_converted_to_utc() {
        let parsed = parse_datetime("2024-05-06T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap());
    }

    #[test]
    fn garbage_timestamp_is_corrupt_data() {
        assert!(matches!(
            parse_datetime("yesterday"),
            Err(TrackError::CorruptData(_))
        ));
    }
}
