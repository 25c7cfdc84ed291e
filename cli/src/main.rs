#![forbid(unsafe_code)]
//! Operator command line for the tournament document.
use itertools::Itertools;
use quadra_core::clock::ClockTime;
use quadra_core::config::CategoryName;
use quadra_core::fixture::{Assignment, MatchId};
use quadra_core::ops::{self, MatchEdit};
use quadra_core::schedule::CancelToken;
use quadra_core::team::Team;
use quadra_store::{schedule_csv, DocumentStore, StoreError};
use std::fs::File;
use std::path::PathBuf;
use structopt::StructOpt;
use thiserror::Error;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let opt = Opt::from_args();
    if let Err(err) = run(opt) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), CliError> {
    let store = DocumentStore::new(&opt.store);
    match opt.command {
        Command::Schedule => schedule(&store),
        Command::Clear => {
            store.update(|tournament| {
                ops::clear_all_schedules(tournament);
                Ok(())
            })?;
            println!("schedule cleared");
            Ok(())
        }
        Command::Set {
            match_id,
            category,
            time,
            court,
        } => set(&store, match_id, category, time, court),
        Command::Export { path } => export(&store, &path),
        Command::Import { path } => import(&store, &path),
        Command::Regenerate { category, seed } => {
            store.update(|tournament| {
                ops::regenerate_category(tournament, &CategoryName::from(category.as_str()), seed)
            })?;
            println!("bracket for '{}' regenerated", category);
            Ok(())
        }
        Command::Result {
            category,
            match_id,
            score1,
            score2,
        } => {
            store.update(|tournament| {
                ops::record_result(
                    tournament,
                    &CategoryName::from(category.as_str()),
                    &MatchId::from(match_id.as_str()),
                    score1,
                    score2,
                )
            })?;
            Ok(())
        }
        Command::RenameTeam {
            category,
            original,
            updated,
        } => {
            let original: Team = original.parse().map_err(quadra_core::Error::from)?;
            let updated: Team = updated.parse().map_err(quadra_core::Error::from)?;
            store.update(|tournament| {
                ops::update_team(
                    tournament,
                    &CategoryName::from(category.as_str()),
                    &original,
                    updated.clone(),
                )
            })?;
            Ok(())
        }
        Command::Show => show(&store),
    }
}

fn schedule(store: &DocumentStore) -> Result<(), CliError> {
    let outcome = store.update(|tournament| {
        ops::reschedule_all(tournament, &CancelToken::new())
    })?;
    println!(
        "{} matches placed over {} ticks",
        outcome.assignments.len(),
        outcome.ticks
    );
    for unplaced in &outcome.unplaced {
        let reasons = unplaced.reasons.iter().map(|r| r.to_string()).join("; ");
        println!("  could not place {}: {}", unplaced.id, reasons);
    }
    Ok(())
}

fn set(
    store: &DocumentStore,
    match_id: String,
    category: Option<String>,
    time: Option<ClockTime>,
    court: Option<String>,
) -> Result<(), CliError> {
    let assignment = match (time, court) {
        (Some(time), Some(court)) => Some(Assignment {
            time,
            court: court.as_str().into(),
        }),
        (None, None) => None,
        _ => return Err(CliError::HalfAssignment),
    };
    let edit = MatchEdit {
        category: category.map(|name| CategoryName::from(name.as_str())),
        match_id: MatchId::from(match_id.as_str()),
        assignment,
    };
    store.update(|tournament| ops::update_match(tournament, &edit))?;
    Ok(())
}

fn export(store: &DocumentStore, path: &PathBuf) -> Result<(), CliError> {
    let tournament = store.load()?;
    let rows = ops::export_schedule(&tournament);
    let file = File::create(path).map_err(StoreError::from)?;
    schedule_csv::write_schedule(&rows, file)?;
    println!("{} rows exported", rows.len());
    Ok(())
}

fn import(store: &DocumentStore, path: &PathBuf) -> Result<(), CliError> {
    let file = File::open(path).map_err(StoreError::from)?;
    let rows = schedule_csv::read_schedule(file)?;
    store.update(|tournament| ops::import_schedule(tournament, &rows))?;
    println!("{} rows imported", rows.len());
    Ok(())
}

/// Print the timetable, one block per court in priority order.
fn show(store: &DocumentStore) -> Result<(), CliError> {
    let tournament = store.load()?;
    let rows = ops::export_schedule(&tournament);
    let by_court = rows
        .iter()
        .filter_map(|row| {
            match (&row.time, &row.court) {
                (Some(time), Some(court)) => Some((court.clone(), (*time, row))),
                _ => None,
            }
        })
        .into_group_map();
    for court in tournament
        .settings
        .courts
        .iter()
        .sorted_by_key(|court| court.priority)
    {
        println!("{}", court.name);
        let Some(mut entries) = by_court.get(&court.name).cloned() else {
            continue;
        };
        entries.sort_by_key(|(time, _)| *time);
        for (time, row) in entries {
            println!("  {}  {}  {} x {}", time, row.match_id, row.team1, row.team2);
        }
    }
    let pending = rows.iter().filter(|row| row.time.is_none()).count();
    if pending > 0 {
        println!("{} matches without a slot", pending);
    }
    Ok(())
}

#[derive(Debug, StructOpt)]
#[structopt(name = "quadra", about = "single-day court tournament scheduler")]
pub struct Opt {
    /// Path of the tournament document.
    #[structopt(long, default_value = "tournament.json")]
    store: PathBuf,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Clear every assignment and plan the whole day.
    Schedule,
    /// Empty every assignment.
    Clear,
    /// Manually place (or clear) one match.
    Set {
        match_id: String,
        #[structopt(long)]
        category: Option<String>,
        #[structopt(long)]
        time: Option<ClockTime>,
        #[structopt(long)]
        court: Option<String>,
    },
    /// Write the schedule as CSV.
    Export { path: PathBuf },
    /// Apply schedule rows from CSV.
    Import { path: PathBuf },
    /// Rebuild a category's bracket from its form values.
    Regenerate {
        category: String,
        #[structopt(long)]
        seed: Option<u64>,
    },
    /// Record a match result.
    Result {
        category: String,
        match_id: String,
        score1: u32,
        score2: u32,
    },
    /// Rename a team across a category.
    RenameTeam {
        category: String,
        original: String,
        updated: String,
    },
    /// Print the timetable by court.
    Show,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Core(#[from] quadra_core::Error),
    #[error("set needs both --time and --court, or neither")]
    HalfAssignment,
}
