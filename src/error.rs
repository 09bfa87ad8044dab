/// Error kinds surfaced by the tracking store and its persistence.
use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};

pub type Result<T> = std::result::Result<T, TrackError>;

#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Project {0} does not exist. Add it with `track add {0}`.")]
    NotFound(String),

    #[error("Already working on {project} since {}", format_local(.since))]
    AlreadyWorking {
        project: String,
        since: DateTime<Utc>,
    },

    #[error("Not working on {0}.")]
    NotWorking(String),

    #[error("Not currently working on any project.")]
    InvalidState,

    /// The loaded data breaks a store invariant; the file is at fault, not the command.
    #[error("Corrupted tracking data: {0}")]
    Corrupted(String),

    #[error("No tracking data at {}. Create it with `track init`.", .0.display())]
    NotInitialized(PathBuf),

    #[error("Unreadable tracking data: {0}")]
    CorruptData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl TrackError {
    /// True for errors caused by the persisted snapshot rather than the user's command.
    pub fn is_data_corruption(&self) -> bool {
        matches!(self, TrackError::Corrupted(_) | TrackError::CorruptData(_))
    }
}

pub fn format_local(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
