/// CLI argument parsing and command handling.
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use crate::db;
use crate::error::{TrackError, format_local};
use crate::store::TrackingStore;
use crate::types::{ProjectStatus, format_duration, normalize_name};

#[derive(Parser)]
#[command(
    name = "track",
    version,
    about = "Track - A command-line time tracker for personal projects"
)]
pub struct Cli {
    /// Location of the tracking database.
    #[arg(long, global = true, env = "TRACK_DB")]
    pub db: Option<PathBuf>,
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a fresh, empty tracking database.
    Init {
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete the tracking database.
    Wipe {
        #[arg(short, long)]
        yes: bool,
    },
    /// Register one or more projects.
    Add { names: Vec<String> },
    /// Remove projects along with all their recorded work.
    #[command(alias = "rm")]
    Remove {
        names: Vec<String>,
        #[arg(short, long)]
        yes: bool,
    },
    /// Start working on a project.
    #[command(alias = "work")]
    Start { name: String },
    /// Stop working on the current project.
    Stop,
    /// Show which project is being worked on, or the status of the given ones.
    Status { names: Vec<String> },
    /// List all projects.
    List,
}

/// Execute a command against the database at `db_path`.
pub fn run(command: Command, db_path: &Path) -> Result<()> {
    match command {
        Command::Init { yes } => handle_init(db_path, yes),
        Command::Wipe { yes } => handle_wipe(db_path, yes),
        Command::Add { names } => with_store(db_path, |store| handle_add(&names, store)),
        Command::Remove { names, yes } => {
            with_store(db_path, |store| handle_remove(&names, yes, store))
        }
        Command::Start { name } => with_store(db_path, |store| handle_start(&name, store)),
        Command::Stop => with_store(db_path, handle_stop),
        Command::Status { names } => with_store(db_path, |store| handle_status(&names, store)),
        Command::List => with_store(db_path, handle_list),
    }
}

/// Loads the store, applies `command`, and saves only if it reports a change.
fn with_store(
    db_path: &Path,
    command: impl FnOnce(&mut TrackingStore) -> Result<bool>,
) -> Result<()> {
    let mut conn = db::open(db_path).map_err(|err| damaged(err, db_path))?;
    let mut store = db::load(&conn).map_err(|err| damaged(err, db_path))?;
    if command(&mut store)? {
        db::save(&store, &mut conn)?;
    }
    Ok(())
}

fn damaged(err: TrackError, db_path: &Path) -> anyhow::Error {
    if err.is_data_corruption() {
        anyhow::Error::new(err).context(format!(
            "The tracking data at {} is damaged; `track init` starts over",
            db_path.display()
        ))
    } else {
        err.into()
    }
}

fn handle_init(db_path: &Path, yes: bool) -> Result<()> {
    if db_path.exists() && !yes && !confirm("This will destroy all your current data.")? {
        println!("Aborted.");
        return Ok(());
    }
    db::initialize(db_path)
        .with_context(|| format!("Cannot create tracking data at {}", db_path.display()))?;
    println!("Initialized tracking data at {}", db_path.display());
    Ok(())
}

fn handle_wipe(db_path: &Path, yes: bool) -> Result<()> {
    if !db_path.exists() {
        return Err(TrackError::NotInitialized(db_path.to_path_buf()).into());
    }
    if !yes && !confirm("This will delete all your tracking data.")? {
        println!("Aborted.");
        return Ok(());
    }
    db::wipe(db_path)?;
    println!("Deleted {}", db_path.display());
    Ok(())
}

fn handle_add(names: &[String], store: &mut TrackingStore) -> Result<bool> {
    let existing: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| store.project_exists(name))
        .collect();
    let changed = store.add_projects(names)?;
    if !existing.is_empty() {
        println!("Already tracked: {}", existing.join(", "));
    }
    if changed {
        println!("Projects: {}", store.list_projects().join(", "));
    }
    Ok(changed)
}

fn handle_remove(names: &[String], yes: bool, store: &mut TrackingStore) -> Result<bool> {
    if !names.is_empty() && !yes && !confirm(&format!("Remove projects {names:?}?"))? {
        println!("Aborted.");
        return Ok(false);
    }
    let changed = store.remove_projects(names)?;
    if !changed {
        println!("None of these projects exist.");
    }
    Ok(changed)
}

fn handle_start(name: &str, store: &mut TrackingStore) -> Result<bool> {
    let changed = store.start_working(name)?;
    if let Some(interval) = store.last_interval(name) {
        println!(
            "Started working on {} at {}",
            normalize_name(name)?,
            format_local(&interval.start)
        );
    }
    Ok(changed)
}

fn handle_stop(store: &mut TrackingStore) -> Result<bool> {
    let name = store.current_project()?.map(str::to_string);
    let changed = store.stop_working()?;
    if let Some(name) = name {
        if let Some(interval) = store.last_interval(&name) {
            println!(
                "Stopped working on {name} after {}",
                format_duration(interval.duration(Utc::now()))
            );
        }
    }
    Ok(changed)
}

fn handle_status(names: &[String], store: &mut TrackingStore) -> Result<bool> {
    store.current_project()?;
    if names.is_empty() {
        if store.list_projects().is_empty() {
            println!("No projects yet. Add one with `track add <project-name>`.");
        } else {
            print!("{}", store.render_status());
        }
        return Ok(false);
    }
    for name in names {
        println!("{}", describe_status(name, store));
    }
    Ok(false)
}

fn handle_list(store: &mut TrackingStore) -> Result<bool> {
    for name in store.list_projects() {
        println!("{name}");
    }
    Ok(false)
}

fn describe_status(name: &str, store: &TrackingStore) -> String {
    match store.status(name) {
        ProjectStatus::Working => {
            let since = store
                .last_interval(name)
                .map(|interval| format_local(&interval.start))
                .unwrap_or_default();
            format!("{name}: working since {since}")
        }
        ProjectStatus::NotWorking => format!("{name}: not working"),
        ProjectStatus::DoesNotExist => format!("{name}: does not exist"),
    }
}

/// Asks a yes/no question on the terminal. End of input counts as no.
fn confirm(message: &str) -> Result<bool> {
    print!("{message} Continue? y/n: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "sure" | "yeah"
    )
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use tempfile::tempdir;

    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn aliases_parse_to_the_same_commands() {
        let cli = Cli::parse_from(["track", "work", "docs"]);
        assert!(matches!(cli.command, Command::Start { ref name } if name == "docs"));
        let cli = Cli::parse_from(["track", "rm", "a", "b", "-y"]);
        assert!(matches!(cli.command, Command::Remove { ref names, yes: true } if names.len() == 2));
    }

    #[test]
    fn affirmative_answers() {
        for answer in ["y", "YES\n", " sure ", "Yeah"] {
            assert!(is_affirmative(answer), "{answer:?}");
        }
        for answer in ["", "n", "no", "yep"] {
            assert!(!is_affirmative(answer), "{answer:?}");
        }
    }

    #[test]
    fn read_only_commands_report_no_change() {
        let mut store = TrackingStore::new();
        store.add_projects(&["a"]).unwrap();
        assert!(!handle_status(&[], &mut store).unwrap());
        assert!(!handle_status(&names(&["a", "b"]), &mut store).unwrap());
        assert!(!handle_list(&mut store).unwrap());
    }

    #[test]
    fn describe_status_covers_every_state() {
        let mut store = TrackingStore::new();
        store.add_projects(&["a", "b"]).unwrap();
        store.start_working("a").unwrap();
        assert!(describe_status("A", &store).starts_with("A: working since "));
        assert_eq!(describe_status("b", &store), "b: not working");
        assert_eq!(describe_status("c", &store), "c: does not exist");
    }

    #[test]
    fn start_stop_through_handlers() {
        let mut store = TrackingStore::new();
        assert!(handle_add(&names(&["Docs"]), &mut store).unwrap());
        assert!(!handle_add(&names(&["docs"]), &mut store).unwrap());
        assert!(handle_start("docs", &mut store).unwrap());
        assert!(handle_start("docs", &mut store).is_err());
        assert!(handle_stop(&mut store).unwrap());
        assert!(store.last_interval("docs").is_some_and(|i| !i.is_open()));
        assert_eq!(store.current_project().unwrap(), None);
        assert!(handle_stop(&mut store).is_err());
        assert!(handle_remove(&names(&["docs"]), true, &mut store).unwrap());
        assert!(handle_remove(&[], true, &mut store).is_err());
    }

    #[test]
    fn read_only_commands_refuse_files_that_are_not_snapshots() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("track.db");
        std::fs::write(&path, b"").unwrap();

        assert!(run(Command::List, &path).is_err());
        assert!(run(Command::Status { names: Vec::new() }, &path).is_err());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn commands_persist_only_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("track.db");
        assert!(run(Command::List, &path).is_err());

        run(Command::Init { yes: true }, &path).unwrap();
        run(Command::Add { names: names(&["a"]) }, &path).unwrap();
        run(Command::Start { name: "a".into() }, &path).unwrap();

        let store = db::load(&db::open(&path).unwrap()).unwrap();
        assert_eq!(store.status("a"), ProjectStatus::Working);

        run(Command::Stop, &path).unwrap();
        let store = db::load(&db::open(&path).unwrap()).unwrap();
        assert_eq!(store.status("a"), ProjectStatus::NotWorking);

        run(Command::Wipe { yes: true }, &path).unwrap();
        assert!(!path.exists());
    }
}
