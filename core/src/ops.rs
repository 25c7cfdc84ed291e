//! # Operator surface
//!
//! The operations an administrator performs on the document: run the
//! scheduler, edit single assignments, batch edits, CSV rows, score
//! recording, team renames, bracket regeneration. Every operation
//! validates against the current document and either applies fully or
//! leaves it untouched; batches stage their edits on a copy and commit
//! on success.
use crate::bracket;
use crate::clock::ClockTime;
use crate::config::{CategoryName, ConfigError, TournamentConfig};
use crate::court::CourtName;
use crate::error::{Error, ErrorKind};
use crate::fixture::{Assignment, MatchId, Stage};
use crate::resolve;
use crate::schedule::{self, CancelToken, ScheduleOutcome};
use crate::state::{literal_placeholder_slots, Category, Tournament, TournamentData};
use crate::team::{Player, Team};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// A single manual `(time, court)` edit. `None` clears the assignment.
#[derive(Debug, Clone)]
pub struct MatchEdit {
    pub category: Option<CategoryName>,
    pub match_id: MatchId,
    pub assignment: Option<Assignment>,
}

/// One line of the schedule in its external (CSV) shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub match_id: MatchId,
    pub category: CategoryName,
    pub stage: Stage,
    pub team1: String,
    pub team2: String,
    pub time: Option<ClockTime>,
    pub court: Option<CourtName>,
}

/// Create a category from its form values and generate its bracket.
///
/// # Errors
///
/// Configuration failures abort with nothing written; a category that
/// already exists is a conflict.
pub fn create_category(
    tournament: &mut Tournament,
    config: TournamentConfig,
    seed: Option<u64>,
) -> Result<(), Error> {
    if tournament.categories.contains_key(&config.category) {
        return Err(OpsError::CategoryExists(config.category).into());
    }
    let data = bracket::generate(&config, seed)?;
    tournament.categories.insert(
        config.category.clone(),
        Category {
            form_values: config,
            tournament_data: data.groups.map(|groups| TournamentData { groups }),
            playoffs: data.playoffs,
            total_matches: data.total_matches,
        },
    );
    Ok(())
}

/// Rebuild a category's bracket from its stored form values, dropping
/// all scores and assignments of the old one.
pub fn regenerate_category(
    tournament: &mut Tournament,
    category: &CategoryName,
    seed: Option<u64>,
) -> Result<(), Error> {
    let entry = tournament
        .category_mut(category)
        .ok_or_else(|| OpsError::CategoryNotFound(category.clone()))?;
    let data = bracket::generate(&entry.form_values, seed)?;
    entry.tournament_data = data.groups.map(|groups| TournamentData { groups });
    entry.playoffs = data.playoffs;
    entry.total_matches = data.total_matches;
    Ok(())
}

/// Clear every assignment, plan the whole day and write the plan back.
///
/// The document changes only on success, in one step; a cancellation
/// or scheduling error leaves the previous schedule in place.
pub fn reschedule_all(
    tournament: &mut Tournament,
    cancel: &CancelToken,
) -> Result<ScheduleOutcome, Error> {
    resolve::resolve_all(tournament);
    let outcome = schedule::plan(tournament, cancel)?;
    tournament.clear_assignments();
    for (id, assignment) in &outcome.assignments {
        if let Some(mut m) = tournament.match_mut(None, id) {
            m.set_assignment(Some(assignment.clone()));
        }
    }
    tracing::info!(
        placed = outcome.assignments.len(),
        unplaced = outcome.unplaced.len(),
        ticks = outcome.ticks,
        "reschedule complete"
    );
    Ok(outcome)
}

/// Empty every `(time, court)` pair.
pub fn clear_all_schedules(tournament: &mut Tournament) {
    tournament.clear_assignments();
}

/// Apply one manual edit after validating it against the document.
pub fn update_match(tournament: &mut Tournament, edit: &MatchEdit) -> Result<(), Error> {
    let players = {
        let m = tournament
            .match_mut(edit.category.as_ref(), &edit.match_id)
            .ok_or_else(|| OpsError::MatchNotFound(edit.match_id.clone()))?;
        m.players()
    };
    if let Some(assignment) = &edit.assignment {
        validate_assignment(tournament, &edit.match_id, assignment, &players)?;
    }
    if let Some(mut m) = tournament.match_mut(edit.category.as_ref(), &edit.match_id) {
        m.set_assignment(edit.assignment.clone());
    }
    Ok(())
}

/// Apply a batch of edits, all or nothing.
///
/// The batch is staged on a copy so that edits validate against each
/// other; any failure leaves the document untouched.
pub fn update_many(tournament: &mut Tournament, edits: &[MatchEdit]) -> Result<(), Error> {
    let mut staged = tournament.clone();
    for edit in edits {
        update_match(&mut staged, edit)?;
    }
    *tournament = staged;
    Ok(())
}

/// Apply imported schedule rows, all or nothing.
///
/// A row with neither time nor court clears that match's assignment; a
/// row with both applies it under full validation; a half-set row is
/// rejected. Matches are located by id across all categories, so the
/// import is idempotent against an export.
pub fn import_schedule(tournament: &mut Tournament, rows: &[ScheduleRow]) -> Result<(), Error> {
    let mut edits = Vec::with_capacity(rows.len());
    for row in rows {
        let assignment = match (row.time, row.court.clone()) {
            (Some(time), Some(court)) => Some(Assignment { time, court }),
            (None, None) => None,
            _ => return Err(OpsError::HalfAssignment(row.match_id.clone()).into()),
        };
        edits.push(MatchEdit {
            category: None,
            match_id: row.match_id.clone(),
            assignment,
        });
    }
    update_many(tournament, &edits)
}

/// Serialise the current schedule as external rows, one per match.
pub fn export_schedule(tournament: &Tournament) -> Vec<ScheduleRow> {
    let mut rows = Vec::new();
    for (name, category) in &tournament.categories {
        for m in category.group_matches() {
            rows.push(ScheduleRow {
                match_id: m.id.clone(),
                category: name.clone(),
                stage: Stage::Group,
                team1: m.team1.to_string(),
                team2: m.team2.to_string(),
                time: m.time,
                court: m.court.clone(),
            });
        }
        for m in category.playoff_matches() {
            rows.push(ScheduleRow {
                match_id: m.id.clone(),
                category: name.clone(),
                stage: m.stage,
                // Unresolved slots export their placeholder text.
                team1: m
                    .team1
                    .as_ref()
                    .map(Team::to_string)
                    .unwrap_or_else(|| m.placeholder1.to_string()),
                team2: m
                    .team2
                    .as_ref()
                    .map(Team::to_string)
                    .unwrap_or_else(|| m.placeholder2.to_string()),
                time: m.time,
                court: m.court.clone(),
            });
        }
    }
    rows.sort_by(|a, b| a.match_id.cmp(&b.match_id));
    rows
}

/// Record a result and ripple it through the category's placeholders.
pub fn record_result(
    tournament: &mut Tournament,
    category: &CategoryName,
    match_id: &MatchId,
    score1: u32,
    score2: u32,
) -> Result<(), Error> {
    {
        let mut m = tournament
            .match_mut(Some(category), match_id)
            .ok_or_else(|| OpsError::MatchNotFound(match_id.clone()))?;
        m.set_score(score1, score2);
    }
    if let Some(entry) = tournament.category_mut(category) {
        resolve::resolve_category(entry);
    }
    Ok(())
}

/// Replace a team everywhere it occurs inside one category: roster,
/// group cohorts, group matches, playoff slots and literal
/// placeholders.
pub fn update_team(
    tournament: &mut Tournament,
    category: &CategoryName,
    original: &Team,
    updated: Team,
) -> Result<(), Error> {
    let entry = tournament
        .category_mut(category)
        .ok_or_else(|| OpsError::CategoryNotFound(category.clone()))?;

    if !entry.form_values.teams.iter().any(|team| team == original) {
        return Err(OpsError::TeamNotFound(original.clone(), category.clone()).into());
    }
    // The new pair must not collide with any other team's players.
    for team in &entry.form_values.teams {
        if team == original {
            continue;
        }
        for player in updated.players() {
            if team.has_player(player) {
                return Err(Error::Config(ConfigError::DuplicatePlayer(player.clone())));
            }
        }
    }

    let replace = |team: &mut Team| {
        if team == original {
            *team = updated.clone();
        }
    };
    entry.form_values.teams.iter_mut().for_each(replace);
    for group in entry.groups_mut() {
        group.teams.iter_mut().for_each(replace);
        for m in group.matches.iter_mut() {
            replace(&mut m.team1);
            replace(&mut m.team2);
        }
    }
    if let Some(playoffs) = entry.playoffs.as_mut() {
        for m in playoffs.matches_mut() {
            if let Some(team) = m.team1.as_mut() {
                replace(team);
            }
            if let Some(team) = m.team2.as_mut() {
                replace(team);
            }
        }
        for placeholder in literal_placeholder_slots(playoffs) {
            if let crate::placeholder::Placeholder::Literal(team) = placeholder {
                replace(team);
            }
        }
    }
    Ok(())
}

/// Validate a manual `(time, court)` against windows and conflicts.
fn validate_assignment(
    tournament: &Tournament,
    match_id: &MatchId,
    assignment: &Assignment,
    players: &[Player],
) -> Result<(), OpsError> {
    let settings = &tournament.settings;
    let court = settings
        .court(&assignment.court)
        .ok_or_else(|| OpsError::CourtNotFound(assignment.court.clone()))?;

    if assignment.time < settings.start_time {
        return Err(OpsError::BeforeOpening {
            match_id: match_id.clone(),
            time: assignment.time,
            opens: settings.start_time,
        });
    }
    if !court.fits(assignment.time, settings.estimated_match_duration) {
        return Err(OpsError::OutsideWindow {
            match_id: match_id.clone(),
            court: assignment.court.clone(),
            time: assignment.time,
        });
    }

    if let Some(occupant) = tournament
        .occupied(assignment.time, &assignment.court)
        .into_iter()
        .find(|occupant| occupant != match_id)
    {
        return Err(OpsError::CourtTaken {
            court: assignment.court.clone(),
            time: assignment.time,
            occupant,
        });
    }

    if let Some((other, player)) = player_clash(tournament, match_id, assignment.time, players) {
        return Err(OpsError::PlayerClash {
            player,
            other,
            time: assignment.time,
        });
    }
    Ok(())
}

/// Another match at the same time sharing one of these players.
fn player_clash(
    tournament: &Tournament,
    match_id: &MatchId,
    time: ClockTime,
    players: &[Player],
) -> Option<(MatchId, Player)> {
    let clash = |id: &MatchId, others: Vec<&Player>| -> Option<(MatchId, Player)> {
        if id == match_id {
            return None;
        }
        others
            .into_iter()
            .find(|player| players.contains(player))
            .map(|player| (id.clone(), player.clone()))
    };
    for category in tournament.categories.values() {
        for m in category.group_matches() {
            if m.time == Some(time) {
                if let Some(found) = clash(&m.id, m.players().collect()) {
                    return Some(found);
                }
            }
        }
        for m in category.playoff_matches() {
            if m.time == Some(time) {
                if let Some(found) = clash(&m.id, m.players().collect()) {
                    return Some(found);
                }
            }
        }
    }
    None
}

#[derive(ThisError, Debug, Clone)]
pub enum OpsError {
    #[error("match '{0}' not found")]
    MatchNotFound(MatchId),
    #[error("category '{0}' not found")]
    CategoryNotFound(CategoryName),
    #[error("category '{0}' already exists")]
    CategoryExists(CategoryName),
    #[error("court '{0}' not found")]
    CourtNotFound(CourtName),
    #[error("team '{0}' not found in category '{1}'")]
    TeamNotFound(Team, CategoryName),
    #[error("match '{match_id}' cannot start at {time}, the tournament opens at {opens}")]
    BeforeOpening {
        match_id: MatchId,
        time: ClockTime,
        opens: ClockTime,
    },
    #[error("no operating window of court '{court}' contains {time} plus a match")]
    OutsideWindow {
        match_id: MatchId,
        court: CourtName,
        time: ClockTime,
    },
    #[error("court '{court}' already hosts '{occupant}' at {time}")]
    CourtTaken {
        court: CourtName,
        time: ClockTime,
        occupant: MatchId,
    },
    #[error("player '{player}' already plays in '{other}' at {time}")]
    PlayerClash {
        player: Player,
        other: MatchId,
        time: ClockTime,
    },
    #[error("row for '{0}' must set both time and court, or neither")]
    HalfAssignment(MatchId),
}

impl OpsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OpsError::MatchNotFound(_)
            | OpsError::CategoryNotFound(_)
            | OpsError::CourtNotFound(_)
            | OpsError::TeamNotFound(_, _) => ErrorKind::NotFound,
            OpsError::CategoryExists(_) => ErrorKind::Conflict,
            OpsError::BeforeOpening { .. } | OpsError::OutsideWindow { .. } => {
                ErrorKind::OutOfWindow
            }
            OpsError::CourtTaken { .. } | OpsError::PlayerClash { .. } => ErrorKind::Conflict,
            OpsError::HalfAssignment(_) => ErrorKind::InvalidConfig,
        }
    }
}
