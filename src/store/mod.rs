/// In-memory tracking store: projects by name and the single-working-project rule.
mod project;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::error::{Result, TrackError};
use crate::types::{ProjectStatus, WorkInterval, normalize_name};

pub use project::Project;

/// All projects and their interval histories. Which project is working is always
/// derived from the intervals; nothing caches it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackingStore {
    projects: BTreeMap<String, Project>,
}

impl TrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already-normalized projects, as read back from disk.
    pub fn from_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        Self {
            projects: projects
                .into_iter()
                .map(|project| (project.name.clone(), project))
                .collect(),
        }
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn list_projects(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    pub fn project_exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn status(&self, name: &str) -> ProjectStatus {
        self.lookup(name)
            .map(Project::status)
            .unwrap_or(ProjectStatus::DoesNotExist)
    }

    pub fn last_interval(&self, name: &str) -> Option<&WorkInterval> {
        self.lookup(name).and_then(Project::last_interval)
    }

    /// Name of the project currently being worked on, if any.
    pub fn current_project(&self) -> Result<Option<&str>> {
        Ok(self.working_project()?.map(|project| project.name.as_str()))
    }

    pub fn add_projects<S: AsRef<str>>(&mut self, names: &[S]) -> Result<bool> {
        let names = normalize_all(names, "Please use `track add <project-name> [<project-name> ...]`")?;
        let mut changed = false;
        for name in names {
            if self.projects.contains_key(&name) {
                continue;
            }
            debug!(project = %name, "adding project");
            self.projects.insert(name.clone(), Project::new(name));
            changed = true;
        }
        Ok(changed)
    }

    pub fn remove_projects<S: AsRef<str>>(&mut self, names: &[S]) -> Result<bool> {
        let names = normalize_all(names, "Please use `track rm <project-name> [<project-name> ...]`")?;
        let mut changed = false;
        for name in names {
            if let Some(project) = self.projects.remove(&name) {
                debug!(project = %name, intervals = project.intervals.len(), "removed project");
                changed = true;
            }
        }
        Ok(changed)
    }

    pub fn start_working(&mut self, name: &str) -> Result<bool> {
        self.start_working_at(name, Utc::now())
    }

    /// Opens an interval on `name`. Refuses while any project, this one included,
    /// is still working; the active one has to be stopped explicitly.
    pub fn start_working_at(&mut self, name: &str, now: DateTime<Utc>) -> Result<bool> {
        let name = normalize_name(name)?;
        if !self.projects.contains_key(&name) {
            return Err(TrackError::NotFound(name));
        }
        if let Some(active) = self.working_project()? {
            let since = active.last_interval().map(|i| i.start).unwrap_or(now);
            return Err(TrackError::AlreadyWorking {
                project: active.name.clone(),
                since,
            });
        }
        let project = self
            .projects
            .get_mut(&name)
            .ok_or_else(|| TrackError::NotFound(name.clone()))?;
        let changed = project.work(now)?;
        info!(project = %name, "started working");
        Ok(changed)
    }

    pub fn stop_working(&mut self) -> Result<bool> {
        self.stop_working_at(Utc::now()).map(|stopped| stopped.is_some())
    }

    /// Closes the open interval and returns the project it belonged to along with it.
    pub fn stop_working_at(&mut self, now: DateTime<Utc>) -> Result<Option<(String, WorkInterval)>> {
        let name = match self.current_project()? {
            Some(name) => name.to_string(),
            None => return Err(TrackError::InvalidState),
        };
        let project = self
            .projects
            .get_mut(&name)
            .ok_or_else(|| TrackError::NotFound(name.clone()))?;
        project.stop(now)?;
        info!(project = %name, "stopped working");
        Ok(project.last_interval().cloned().map(|interval| (name, interval)))
    }

    /// One line per project, the working one marked with `->`.
    pub fn render_status(&self) -> String {
        self.projects
            .values()
            .map(|project| {
                let marker = if project.is_working() { " -> " } else { "    " };
                format!("{marker}{}\n", project.name)
            })
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<&Project> {
        normalize_name(name)
            .ok()
            .and_then(|name| self.projects.get(&name))
    }

    fn working_project(&self) -> Result<Option<&Project>> {
        let mut working = self.projects.values().filter(|p| p.is_working());
        let first = working.next();
        let rest: Vec<&str> = working.map(|p| p.name.as_str()).collect();
        match first {
            Some(project) if !rest.is_empty() => {
                error!(first = %project.name, others = ?rest, "more than one project is working");
                Err(TrackError::Corrupted(format!(
                    "more than one project is marked as working ({}, {})",
                    project.name,
                    rest.join(", ")
                )))
            }
            other => Ok(other),
        }
    }
}

/// Validates a whole batch up front so a bad name cannot leave a half-applied change.
fn normalize_all<S: AsRef<str>>(names: &[S], usage: &str) -> Result<Vec<String>> {
    if names.is_empty() {
        return Err(TrackError::InvalidArgument(usage.to_string()));
    }
    names
        .iter()
        .map(|name| normalize_name(name.as_ref()))
        .collect()
}
