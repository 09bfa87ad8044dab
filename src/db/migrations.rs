/// Database migrations and schema management.
use rusqlite::Connection;

use crate::error::{Result, TrackError};

const SCHEMA_VERSION: i64 = 1;

/// Creates the schema if it doesn't exist yet and stamps its version.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version = schema_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(newer_schema(version));
    }

    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS projects (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS intervals (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id  INTEGER NOT NULL,
            start_time  TEXT    NOT NULL,
            end_time    TEXT,
            FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
        );
        ",
    )?;
    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(())
}

/// Confirms an existing file carries our schema without writing to it.
pub fn verify_schema(conn: &Connection) -> Result<()> {
    let version = schema_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(newer_schema(version));
    }
    if version == 0 {
        return Err(TrackError::CorruptData(
            "file has no tracking schema".to_string(),
        ));
    }
    for table in ["projects", "intervals"] {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        if count == 0 {
            return Err(TrackError::CorruptData(format!("table {table} is missing")));
        }
    }
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(())
}

fn schema_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

fn newer_schema(version: i64) -> TrackError {
    TrackError::CorruptData(format!(
        "schema version {version} is newer than supported version {SCHEMA_VERSION}"
    ))
}
