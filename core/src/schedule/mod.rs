//! # Scheduler core
//!
//! The event-driven greedy allocator. Time advances in ticks of the
//! estimated match duration from the earliest configured start; at each
//! tick the engine collects the free courts in priority order and the
//! ready matches in rank order, and pairs them up. All working state
//! (court and player availability, match history, planned finish
//! times) is owned by the single run; the tournament document is never
//! touched, the caller applies the returned assignments.
//!
//! Ranking inside a tick is lexicographic: later stages first, then the
//! operator's category priority, then the players with the most
//! accumulated rest, and finally the match id so that equal inputs
//! always produce the same plan.
pub mod log;

use crate::clock::{ClockTime, Minutes};
use crate::config::{CategoryName, ConfigError};
use crate::court::{Court, CourtName};
use crate::deps::{DependencyGraph, DepsError};
use crate::fixture::{Assignment, MatchId, Stage};
use crate::state::Tournament;
use crate::team::Player;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub use log::{LogEntry, ScheduleLog, SkipReason};

/// Safety cap on the tick loop. The day window bounds real runs far
/// below this; the cap only catches degenerate configurations.
const MAX_TICKS: u32 = 10_000;

/// Cooperative cancellation flag, checked at tick boundaries.
///
/// Cancelling discards the partial plan; nothing is written back.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Schedule-facing view of one match.
#[derive(Debug, Clone)]
pub struct MatchInfo {
    pub id: MatchId,
    pub category: CategoryName,
    pub stage: Stage,
    /// Players of the slots resolved so far. Placeholder slots add
    /// their players once resolved; the scheduler can place a match
    /// whose teams are still placeholders.
    pub players: Vec<Player>,
    pub phase_start: Option<ClockTime>,
}

/// Flatten the document into the scheduler's match list.
pub fn match_infos(tournament: &Tournament) -> Vec<MatchInfo> {
    let mut out = Vec::new();
    for (name, category) in &tournament.categories {
        for m in category.group_matches() {
            out.push(MatchInfo {
                id: m.id.clone(),
                category: name.clone(),
                stage: Stage::Group,
                players: m.players().cloned().collect(),
                phase_start: None,
            });
        }
        for m in category.playoff_matches() {
            out.push(MatchInfo {
                id: m.id.clone(),
                category: name.clone(),
                stage: m.stage,
                players: m.players().cloned().collect(),
                phase_start: m.phase_start_time,
            });
        }
    }
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

/// A match the day could not accommodate, with everything the log
/// knows about why.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedMatch {
    pub id: MatchId,
    pub reasons: Vec<SkipReason>,
}

/// Result of a scheduling run.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    pub assignments: BTreeMap<MatchId, Assignment>,
    pub unplaced: Vec<UnplacedMatch>,
    pub log: ScheduleLog,
    pub ticks: u32,
}

/// Plan the whole tournament from scratch.
///
/// Pure with respect to the document: existing assignments are ignored
/// and nothing is written back. `reschedule_all` in [`crate::ops`]
/// commits the outcome.
///
/// # Errors
///
/// Settings validation and dependency extraction failures abort before
/// the loop; cancellation and the tick cap abort during it.
pub fn plan(
    tournament: &Tournament,
    cancel: &CancelToken,
) -> Result<ScheduleOutcome, ScheduleError> {
    tournament.settings.validate()?;
    let graph = DependencyGraph::build(tournament)?;
    let matches = match_infos(tournament);
    let engine = Engine::new(tournament, &graph, &matches);
    engine.run(cancel)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Deps(#[from] DepsError),
    #[error("scheduling was cancelled")]
    Cancelled,
    #[error("scheduler exceeded the safety cap of {0} ticks")]
    IterationCap(u32),
}

struct Engine<'a> {
    duration: Minutes,
    end_time: ClockTime,
    anchor: ClockTime,
    /// Sorted by priority, then name; the head is the top court.
    courts: Vec<&'a Court>,
    category_start: BTreeMap<CategoryName, ClockTime>,
    category_priority: BTreeMap<CategoryName, u32>,
    graph: &'a DependencyGraph,
    matches: &'a [MatchInfo],
    court_free: BTreeMap<CourtName, ClockTime>,
    player_free: BTreeMap<Player, ClockTime>,
    history: BTreeMap<Player, Vec<ClockTime>>,
    finish: BTreeMap<MatchId, ClockTime>,
    assignments: BTreeMap<MatchId, Assignment>,
    log: ScheduleLog,
}

impl<'a> Engine<'a> {
    fn new(
        tournament: &'a Tournament,
        graph: &'a DependencyGraph,
        matches: &'a [MatchInfo],
    ) -> Self {
        let settings = &tournament.settings;
        let mut courts: Vec<&Court> = settings.courts.iter().collect();
        courts.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.name.cmp(&b.name)));

        let mut anchor = settings.start_time;
        let mut category_start = BTreeMap::new();
        let mut category_priority = BTreeMap::new();
        for (name, category) in &tournament.categories {
            let config = &category.form_values;
            if let Some(start) = config.start_time {
                anchor = anchor.min(start);
            }
            // A category never starts before the tournament does.
            let effective = config
                .start_time
                .map(|start| start.max(settings.start_time))
                .unwrap_or(settings.start_time);
            category_start.insert(name.clone(), effective);
            category_priority.insert(name.clone(), config.effective_priority());
        }

        Engine {
            duration: settings.estimated_match_duration,
            end_time: settings.end_time,
            anchor,
            courts,
            category_start,
            category_priority,
            graph,
            matches,
            court_free: BTreeMap::new(),
            player_free: BTreeMap::new(),
            history: BTreeMap::new(),
            finish: BTreeMap::new(),
            assignments: BTreeMap::new(),
            log: ScheduleLog::default(),
        }
    }

    fn run(mut self, cancel: &CancelToken) -> Result<ScheduleOutcome, ScheduleError> {
        let total = self.matches.len();
        let mut t = self.anchor;
        let mut ticks = 0;
        let mut day_end = t;

        while self.assignments.len() < total {
            if cancel.is_cancelled() {
                return Err(ScheduleError::Cancelled);
            }
            ticks += 1;
            if ticks > MAX_TICKS {
                return Err(ScheduleError::IterationCap(MAX_TICKS));
            }
            let tick_end = match t.checked_add(self.duration) {
                Some(tick_end) => tick_end,
                None => break,
            };
            if tick_end > self.end_time {
                break;
            }
            self.run_tick(t);
            day_end = t;
            t = tick_end;
        }

        let pending: Vec<MatchId> = self
            .matches
            .iter()
            .map(|m| m.id.clone())
            .filter(|id| !self.assignments.contains_key(id))
            .collect();
        for id in &pending {
            self.log.push(day_end, id.clone(), SkipReason::EndOfDay);
        }
        let unplaced = pending
            .into_iter()
            .map(|id| UnplacedMatch {
                reasons: self.log.reasons_for(&id),
                id,
            })
            .collect();

        Ok(ScheduleOutcome {
            assignments: self.assignments,
            unplaced,
            log: self.log,
            ticks,
        })
    }

    /// One pass over the free courts of a tick. A placement can only
    /// shrink the ready set (players get claimed), so a single sweep
    /// in court priority order exhausts the tick.
    fn run_tick(&mut self, t: ClockTime) {
        let free: Vec<CourtName> = self
            .courts
            .iter()
            .filter(|court| court.fits(t, self.duration))
            .filter(|court| self.court_is_free(&court.name, t))
            .map(|court| court.name.clone())
            .collect();

        for (index, court) in free.iter().enumerate() {
            let ready = self.ranked_ready(t);
            if ready.is_empty() {
                break;
            }
            // The top court of the tick prefers playoff matches; the
            // ranking already sorts them first, this keeps the rule
            // explicit for the court that matters.
            let pick = if index == 0 {
                ready
                    .iter()
                    .copied()
                    .find(|&i| self.matches[i].stage.is_playoff())
                    .or(Some(ready[0]))
            } else {
                Some(ready[0])
            };
            if let Some(pick) = pick {
                self.place(pick, court.clone(), t);
            }
        }

        // Whatever is still pending gets its failing predicate on
        // record, or a court shortage if it was ready and passed over.
        let pending: Vec<usize> = (0..self.matches.len())
            .filter(|&i| !self.assignments.contains_key(&self.matches[i].id))
            .collect();
        for i in pending {
            let reason = match self.ready_check(i, t) {
                Err(reason) => reason,
                Ok(()) => SkipReason::NoCourtAvailable,
            };
            self.log.push(t, self.matches[i].id.clone(), reason);
        }
    }

    fn court_is_free(&self, court: &CourtName, t: ClockTime) -> bool {
        self.court_free
            .get(court)
            .map(|free| *free <= t)
            .unwrap_or(true)
    }

    /// Indices of placeable matches, best first.
    fn ranked_ready(&self, t: ClockTime) -> Vec<usize> {
        let mut ready: Vec<usize> = (0..self.matches.len())
            .filter(|&i| !self.assignments.contains_key(&self.matches[i].id))
            .filter(|&i| self.ready_check(i, t).is_ok())
            .collect();
        ready.sort_by_cached_key(|&i| self.rank_key(i, t));
        ready
    }

    fn rank_key(
        &self,
        i: usize,
        t: ClockTime,
    ) -> (Reverse<u8>, u32, Reverse<u32>, Reverse<u32>, MatchId) {
        let info = &self.matches[i];
        let priority = self
            .category_priority
            .get(&info.category)
            .copied()
            .unwrap_or(u32::MAX);
        let rests: Vec<u32> = info
            .players
            .iter()
            .map(|player| self.rest_of(player, t))
            .collect();
        let total_rest: u32 = rests.iter().sum();
        let min_rest = rests.iter().copied().min().unwrap_or(u32::MAX);
        (
            Reverse(info.stage.rank()),
            priority,
            Reverse(total_rest),
            Reverse(min_rest),
            info.id.clone(),
        )
    }

    /// Minutes a player has been off court at tick `t`.
    fn rest_of(&self, player: &Player, t: ClockTime) -> u32 {
        let free = self
            .player_free
            .get(player)
            .copied()
            .unwrap_or(self.anchor);
        free.until(t).into()
    }

    fn ready_check(&self, i: usize, t: ClockTime) -> Result<(), SkipReason> {
        let info = &self.matches[i];

        let category_start = self
            .category_start
            .get(&info.category)
            .copied()
            .unwrap_or(self.anchor);
        if t < category_start {
            return Err(SkipReason::CategoryNotStarted {
                starts: category_start,
            });
        }

        if let Some(phase_start) = info.phase_start {
            if t < phase_start {
                return Err(SkipReason::PhaseNotReached {
                    starts: phase_start,
                });
            }
        }

        if let Some(deps) = self.graph.of(&info.id) {
            for dependency in &deps.matches {
                if !self.finished_by(dependency, t) {
                    return Err(SkipReason::DependencyUnfinished {
                        dependency: dependency.clone(),
                    });
                }
            }
            for group in &deps.groups {
                let members = self.graph.group_members(group);
                if members.is_empty()
                    || members.iter().any(|member| !self.finished_by(member, t))
                {
                    return Err(SkipReason::group_unfinished(group));
                }
            }
        }

        for player in &info.players {
            if let Some(free) = self.player_free.get(player) {
                if *free > t {
                    return Err(SkipReason::PlayerBusy {
                        player: player.clone(),
                    });
                }
            }
        }

        for player in &info.players {
            if self.would_be_third_consecutive(player, t) {
                return Err(SkipReason::ThirdConsecutive {
                    player: player.clone(),
                });
            }
        }

        Ok(())
    }

    /// Strict finished-by-t: the dependency must be scheduled and its
    /// planned finish must not run past the tick.
    fn finished_by(&self, id: &MatchId, t: ClockTime) -> bool {
        self.finish.get(id).map(|f| *f <= t).unwrap_or(false)
    }

    /// A start at `t` is the third in a row when the player's last two
    /// starts were exactly one and two durations ago.
    fn would_be_third_consecutive(&self, player: &Player, t: ClockTime) -> bool {
        let history = match self.history.get(player) {
            Some(history) if history.len() >= 2 => history,
            _ => return false,
        };
        let last = history[history.len() - 1];
        let before_last = history[history.len() - 2];
        matches!(
            (t.checked_sub(self.duration), t.checked_sub(self.duration.doubled())),
            (Some(one_ago), Some(two_ago)) if last == one_ago && before_last == two_ago
        )
    }

    fn place(&mut self, i: usize, court: CourtName, t: ClockTime) {
        let info = &self.matches[i];
        // The court was checked to fit the interval, so the end exists.
        let end = match t.checked_add(self.duration) {
            Some(end) => end,
            None => return,
        };
        tracing::debug!(match_id = %info.id, %court, time = %t, "placed");
        self.assignments.insert(
            info.id.clone(),
            Assignment {
                time: t,
                court: court.clone(),
            },
        );
        self.finish.insert(info.id.clone(), end);
        self.court_free.insert(court, end);
        for player in &info.players {
            self.player_free.insert(player.clone(), end);
            self.history.entry(player.clone()).or_default().push(t);
        }
    }
}
