//! # Tournament configuration
//!
//! Per-category form values and the global settings shared by every
//! category. Validation happens up front, in one place; the bracket
//! generator and the scheduler can then assume a well-formed
//! configuration and never emit partial output for a broken one.
use crate::clock::{ClockTime, Minutes};
use crate::court::{Court, CourtError, CourtName, CourtSlot};
use crate::fixture::Stage;
use crate::team::{Player, Team};
use derive_more::{AsRef, Display, From, Into};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Category identifier, unique across the tournament.
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
pub struct CategoryName(String);

impl From<&str> for CategoryName {
    fn from(name: &str) -> Self {
        CategoryName(String::from(name))
    }
}

/// Competition format of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentKind {
    #[serde(rename = "groups")]
    Groups,
    #[serde(rename = "singleElim")]
    SingleElim,
    #[serde(rename = "doubleElim")]
    DoubleElim,
}

/// How teams are ordered before bracket construction.
///
/// `Order` keeps the roster order (the operator's seeding); `Random`
/// shuffles with a caller-supplied rng so runs stay reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seeding {
    Order,
    Random,
}

/// Optional per-phase earliest start times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarters: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semis: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finals: Option<ClockTime>,
}

impl PhaseTimes {
    /// Earliest start configured for a stage, if any. The third-place
    /// match follows the finals setting.
    pub fn for_stage(&self, stage: Stage) -> Option<ClockTime> {
        match stage {
            Stage::QuarterFinal => self.quarters,
            Stage::Semifinal => self.semis,
            Stage::Final | Stage::ThirdPlace => self.finals,
            _ => None,
        }
    }
}

/// Per-category form values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    pub category: CategoryName,
    #[serde(rename = "type")]
    pub kind: TournamentKind,
    pub teams: Vec<Team>,
    #[serde(default = "default_group_count")]
    pub group_count: u32,
    #[serde(default = "default_advance")]
    pub advance_per_group: u32,
    pub seeding: Seeding,
    #[serde(default)]
    pub include_third_place: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<ClockTime>,
    #[serde(default)]
    pub phase_start_times: PhaseTimes,
    /// Scheduling tiebreak between categories, ascending. Absent means
    /// lowest priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

fn default_group_count() -> u32 {
    1
}

fn default_advance() -> u32 {
    1
}

/// Letters available for group keys.
const MAX_GROUPS: u32 = 26;

impl TournamentConfig {
    pub fn effective_priority(&self) -> u32 {
        self.priority.unwrap_or(u32::MAX)
    }

    /// Group sizes for the configured team count: the remainder of the
    /// division spreads over the first groups, so sizes differ by at
    /// most one.
    pub fn group_sizes(&self) -> Vec<usize> {
        let teams = self.teams.len();
        let groups = self.group_count as usize;
        if groups == 0 {
            return Vec::new();
        }
        let base = teams / groups;
        let extra = teams % groups;
        (0..groups)
            .map(|g| if g < extra { base + 1 } else { base })
            .collect()
    }

    /// Validate the configuration, naming the failing field.
    ///
    /// # Errors
    ///
    /// All failures carry the `InvalidConfig` kind; no partial bracket
    /// is ever generated from a configuration that fails here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.teams.len() < 2 {
            return Err(ConfigError::NotEnoughTeams(self.teams.len()));
        }
        if let Some(player) = duplicate_player(&self.teams) {
            return Err(ConfigError::DuplicatePlayer(player));
        }
        match self.kind {
            TournamentKind::SingleElim => {
                if !self.teams.len().is_power_of_two() {
                    return Err(ConfigError::TeamsNotPowerOfTwo(self.teams.len()));
                }
            }
            TournamentKind::DoubleElim => {}
            TournamentKind::Groups => {
                if self.group_count == 0 {
                    return Err(ConfigError::NoGroups);
                }
                if self.group_count > MAX_GROUPS {
                    return Err(ConfigError::TooManyGroups(self.group_count));
                }
                if self.advance_per_group == 0 {
                    return Err(ConfigError::NoAdvancing);
                }
                let qualifiers = (self.group_count * self.advance_per_group) as usize;
                if qualifiers < 2 || !qualifiers.is_power_of_two() {
                    return Err(ConfigError::QualifiersNotPowerOfTwo(qualifiers));
                }
                let smallest = self
                    .group_sizes()
                    .into_iter()
                    .min()
                    .unwrap_or(0);
                if self.advance_per_group as usize >= smallest {
                    return Err(ConfigError::AdvanceTooLarge {
                        advance: self.advance_per_group,
                        smallest_group: smallest,
                    });
                }
            }
        }
        Ok(())
    }
}

/// First player appearing in more than one team, if any.
fn duplicate_player(teams: &[Team]) -> Option<Player> {
    let mut seen: HashSet<&Player> = HashSet::new();
    teams
        .iter()
        .flat_map(|team| team.players())
        .find(|player| !seen.insert(player))
        .cloned()
}

/// Tournament-wide settings: the day window, the tick length and the
/// court inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub estimated_match_duration: Minutes,
    pub courts: Vec<Court>,
}

impl GlobalSettings {
    /// # Errors
    ///
    /// Errors on an empty court inventory, a duplicate court name, a
    /// zero match duration or a day window that ends before it starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.courts.is_empty() {
            return Err(ConfigError::NoCourts);
        }
        if self.estimated_match_duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if self.end_time <= self.start_time {
            return Err(ConfigError::EmptyDay {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if let Some(name) = self
            .courts
            .iter()
            .map(|court| &court.name)
            .duplicates()
            .next()
        {
            return Err(ConfigError::DuplicateCourt(name.clone()));
        }
        Ok(())
    }

    pub fn court(&self, name: &CourtName) -> Option<&Court> {
        self.courts.iter().find(|court| court.name == *name)
    }
}

impl Default for GlobalSettings {
    /// One court, open over the default day, twenty-minute matches.
    fn default() -> Self {
        let start = ClockTime::new(8, 0).expect("literal time");
        let end = ClockTime::new(18, 0).expect("literal time");
        GlobalSettings {
            start_time: start,
            end_time: end,
            estimated_match_duration: Minutes(20),
            courts: vec![Court {
                name: CourtName::from("Quadra 1"),
                priority: 1,
                slots: vec![CourtSlot {
                    start_time: start,
                    end_time: end,
                }],
            }],
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a category needs at least two teams, got {0}")]
    NotEnoughTeams(usize),
    #[error("player '{0}' appears in more than one team")]
    DuplicatePlayer(Player),
    #[error("single elimination needs a power of two of teams, got {0}")]
    TeamsNotPowerOfTwo(usize),
    #[error("group count must be positive")]
    NoGroups,
    #[error("at most 26 groups are supported, got {0}")]
    TooManyGroups(u32),
    #[error("teams advancing per group must be positive")]
    NoAdvancing,
    #[error("groups times advancing must be a power of two of at least 2, got {0}")]
    QualifiersNotPowerOfTwo(usize),
    #[error("cannot advance {advance} from a group of {smallest_group}")]
    AdvanceTooLarge { advance: u32, smallest_group: usize },
    #[error("no courts configured")]
    NoCourts,
    #[error("estimated match duration must be positive")]
    ZeroDuration,
    #[error("tournament day ends before it starts ({start}..{end})")]
    EmptyDay { start: ClockTime, end: ClockTime },
    #[error("duplicate court name '{0}'")]
    DuplicateCourt(CourtName),
    #[error(transparent)]
    Court(#[from] CourtError),
}
