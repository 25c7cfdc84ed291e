//! # Common match vocabulary
//!
//! Types shared by group and playoff matches. Specification and
//! implementation here is strictly limited; the concrete match structs
//! live in the [`crate::group`] and [`crate::playoff`] modules.
use crate::clock::ClockTime;
use crate::court::CourtName;
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Stable match identifier.
///
/// Ids are deterministic given the category configuration and carry the
/// category, phase and index, e.g. `Masculino-GroupA-Jogo3` or
/// `Feminino-U-R2-J1`. They are the only way matches refer to each
/// other; there are no direct references between match objects.
#[derive(
    Debug,
    Display,
    Clone,
    AsRef,
    From,
    Into,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
)]
#[as_ref(forward)]
pub struct MatchId(String);

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        MatchId(String::from(id))
    }
}

/// How late in the tournament a match sits.
///
/// The scheduler places later-stage matches first within a tick, so the
/// ordering here is load-bearing: [`Stage::rank`] ascends from group
/// play to the final.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Group,
    Playoff,
    EighthFinal,
    QuarterFinal,
    Semifinal,
    ThirdPlace,
    Final,
}

impl Stage {
    pub fn rank(&self) -> u8 {
        match self {
            Stage::Group => 0,
            Stage::Playoff => 1,
            Stage::EighthFinal => 2,
            Stage::QuarterFinal => 3,
            Stage::Semifinal => 4,
            Stage::ThirdPlace => 5,
            Stage::Final => 6,
        }
    }

    pub fn is_playoff(&self) -> bool {
        !matches!(self, Stage::Group)
    }
}

/// The `(time, court)` pair written onto a match by the scheduler or by
/// a manual edit. Either both are present or the match is unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub time: ClockTime,
    pub court: CourtName,
}

/// A recorded result. Scores count sets won and are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub score1: u32,
    pub score2: u32,
}

impl MatchScore {
    pub fn new(score1: u32, score2: u32) -> Self {
        MatchScore { score1, score2 }
    }

    /// Which side won, `None` on a tie.
    pub fn winning_side(&self) -> Option<Side> {
        match self.score1.cmp(&self.score2) {
            Ordering::Greater => Some(Side::Team1),
            Ordering::Less => Some(Side::Team2),
            Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }
}
