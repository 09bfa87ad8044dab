/// Persistence of the tracking store as a single SQLite file.
mod intervals;
mod migrations;
mod project;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{Result, TrackError};
use crate::store::{Project, TrackingStore};
use crate::types::normalize_name;

/// Opens an existing snapshot. Nothing is created or migrated here; a file without
/// the tracking schema is reported as corrupt and left untouched.
pub fn open(db_path: &Path) -> Result<Connection> {
    if !db_path.exists() {
        return Err(TrackError::NotInitialized(db_path.to_path_buf()));
    }
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
    migrations::verify_schema(&conn).map_err(|err| match err {
        TrackError::Database(rusqlite::Error::SqliteFailure(failure, _))
            if failure.code == rusqlite::ErrorCode::NotADatabase =>
        {
            TrackError::CorruptData(format!("{} is not a tracking database", db_path.display()))
        }
        other => other,
    })?;
    Ok(conn)
}

/// Reads the whole store into memory.
pub fn load(conn: &Connection) -> Result<TrackingStore> {
    let mut projects: HashMap<i64, Project> = HashMap::new();
    for (id, name) in project::query_projects(conn)? {
        if normalize_name(&name).ok().as_deref() != Some(name.as_str()) {
            return Err(TrackError::CorruptData(format!(
                "project name {name:?} is not normalized"
            )));
        }
        projects.insert(id, Project::new(name));
    }

    let rows = intervals::query_intervals(conn)?;
    let interval_count = rows.len();
    for row in rows {
        let project = projects.get_mut(&row.project_id).ok_or_else(|| {
            TrackError::CorruptData(format!(
                "interval refers to unknown project id {}",
                row.project_id
            ))
        })?;
        project.intervals.push(row.interval);
    }

    debug!(projects = projects.len(), intervals = interval_count, "loaded tracking store");
    Ok(TrackingStore::from_projects(projects.into_values()))
}

/// Replaces the persisted snapshot with `store` in one transaction.
pub fn save(store: &TrackingStore, conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    intervals::delete_all_intervals(&tx)?;
    project::delete_all_projects(&tx)?;
    for entry in store.projects() {
        let project_id = project::create_project(&entry.name, &tx)?;
        for interval in &entry.intervals {
            intervals::create_interval(project_id, interval, &tx)?;
        }
    }
    tx.commit()?;
    debug!("saved tracking store");
    Ok(())
}

/// Replaces whatever is at `db_path` with a fresh, empty store.
pub fn initialize(db_path: &Path) -> Result<(Connection, TrackingStore)> {
    if db_path.exists() {
        fs::remove_file(db_path)?;
    }
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut conn = Connection::open(db_path)?;
    migrations::run_migrations(&conn)?;
    let store = TrackingStore::new();
    save(&store, &mut conn)?;
    debug!(path = %db_path.display(), "initialized tracking store");
    Ok((conn, store))
}

/// Deletes the persisted snapshot.
pub fn wipe(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        return Err(TrackError::NotInitialized(db_path.to_path_buf()));
    }
    fs::remove_file(db_path)?;
    debug!(path = %db_path.display(), "wiped tracking store");
    Ok(())
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./track.db` when no data dir is found.
pub fn default_db_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(data_dir) => data_dir.join("track").join("track.db"),
        None => PathBuf::from("track.db"),
    }
}
