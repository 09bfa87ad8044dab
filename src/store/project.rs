/// Per-project interval lifecycle: Idle (no open interval) and Active.
use chrono::{DateTime, Utc};

use crate::error::{Result, TrackError};
use crate::types::{ProjectStatus, WorkInterval};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    /// Chronological; only ever appended to.
    pub intervals: Vec<WorkInterval>,
}

impl Project {
    pub fn new(name: String) -> Self {
        Self {
            name,
            intervals: Vec::new(),
        }
    }

    pub fn last_interval(&self) -> Option<&WorkInterval> {
        self.intervals.last()
    }

    pub fn status(&self) -> ProjectStatus {
        match self.last_interval() {
            Some(interval) if interval.is_open() => ProjectStatus::Working,
            _ => ProjectStatus::NotWorking,
        }
    }

    pub fn is_working(&self) -> bool {
        self.status() == ProjectStatus::Working
    }

    /// Idle -> Active. Opens a new interval starting at `now`.
    pub fn work(&mut self, now: DateTime<Utc>) -> Result<bool> {
        if let Some(interval) = self.last_interval().filter(|i| i.is_open()) {
            return Err(TrackError::AlreadyWorking {
                project: self.name.clone(),
                since: interval.start,
            });
        }
        self.intervals.push(WorkInterval::open(now));
        Ok(true)
    }

    /// Active -> Idle. Closes the latest interval at `now`.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<bool> {
        match self.intervals.last_mut() {
            Some(interval) if interval.is_open() => {
                interval.end = Some(now);
                Ok(true)
            }
            _ => Err(TrackError::NotWorking(self.name.clone())),
        }
    }
}
