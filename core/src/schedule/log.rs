//! Structured trace of scheduling decisions.
//!
//! Every readiness predicate that fails for a pending match is recorded
//! against the tick where it was evaluated. The log feeds two readers:
//! `tracing` output for the operator while the run happens, and the
//! per-match reason list attached to anything left unplaced at the end.
use crate::clock::ClockTime;
use crate::fixture::MatchId;
use crate::group::GroupId;
use crate::team::Player;
use serde::Serialize;
use std::fmt;

/// Why a pending match could not be placed at a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    /// The match's category opens later than this tick.
    CategoryNotStarted { starts: ClockTime },
    /// A configured phase minimum keeps the match back.
    PhaseNotReached { starts: ClockTime },
    /// A prerequisite match has not been scheduled to finish yet.
    DependencyUnfinished { dependency: MatchId },
    /// A prerequisite group still has matches finishing later.
    GroupUnfinished { group_id: String },
    /// A player is still on court at this tick.
    PlayerBusy { player: Player },
    /// Placing the match would give a player a third match in a row.
    ThirdConsecutive { player: Player },
    /// No court has a free operating window containing the tick.
    NoCourtAvailable,
    /// The tournament day ended with the match still pending.
    EndOfDay,
}

impl SkipReason {
    pub(crate) fn group_unfinished(group: &GroupId) -> Self {
        SkipReason::GroupUnfinished {
            group_id: group.to_string(),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::CategoryNotStarted { starts } => {
                write!(f, "category starts at {}", starts)
            }
            SkipReason::PhaseNotReached { starts } => {
                write!(f, "phase opens at {}", starts)
            }
            SkipReason::DependencyUnfinished { dependency } => {
                write!(f, "waiting on {}", dependency)
            }
            SkipReason::GroupUnfinished { group_id } => {
                write!(f, "waiting on group {}", group_id)
            }
            SkipReason::PlayerBusy { player } => write!(f, "{} still playing", player),
            SkipReason::ThirdConsecutive { player } => {
                write!(f, "{} would play a third match in a row", player)
            }
            SkipReason::NoCourtAvailable => write!(f, "no court available"),
            SkipReason::EndOfDay => write!(f, "day ended"),
        }
    }
}

/// One rejected placement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub tick: ClockTime,
    pub match_id: MatchId,
    pub reason: SkipReason,
}

/// The whole run's trace, in evaluation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleLog {
    entries: Vec<LogEntry>,
}

impl ScheduleLog {
    pub(crate) fn push(&mut self, tick: ClockTime, match_id: MatchId, reason: SkipReason) {
        tracing::debug!(%tick, %match_id, %reason, "skipped");
        self.entries.push(LogEntry {
            tick,
            match_id,
            reason,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Distinct reasons recorded for one match, in first-seen order.
    pub fn reasons_for(&self, id: &MatchId) -> Vec<SkipReason> {
        let mut out: Vec<SkipReason> = Vec::new();
        for entry in self.entries.iter().filter(|entry| entry.match_id == *id) {
            if !out.contains(&entry.reason) {
                out.push(entry.reason.clone());
            }
        }
        out
    }
}
