//! # Tournament document
//!
//! The whole tournament is one document: global settings plus one entry
//! per category. The serde layout mirrors the legacy store schema, with
//! the settings under the reserved `_globalSettings` key and category
//! names as the remaining top-level keys.
use crate::clock::ClockTime;
use crate::config::{CategoryName, GlobalSettings, TournamentConfig};
use crate::court::CourtName;
use crate::fixture::{Assignment, MatchId};
use crate::group::{Group, GroupKey, GroupMatch};
use crate::placeholder::Placeholder;
use crate::playoff::{PlayoffMatch, Playoffs};
use crate::team::Player;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group-phase payload of a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentData {
    pub groups: Vec<Group>,
}

/// One category: its form values and its generated match graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub form_values: TournamentConfig,
    #[serde(default)]
    pub tournament_data: Option<TournamentData>,
    #[serde(default)]
    pub playoffs: Option<Playoffs>,
    pub total_matches: usize,
}

impl Category {
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.tournament_data
            .iter()
            .flat_map(|data| data.groups.iter())
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.tournament_data
            .iter_mut()
            .flat_map(|data| data.groups.iter_mut())
    }

    pub fn group(&self, key: GroupKey) -> Option<&Group> {
        self.groups().find(|group| group.key == key)
    }

    pub fn group_matches(&self) -> impl Iterator<Item = &GroupMatch> {
        self.groups().flat_map(|group| group.matches.iter())
    }

    pub fn playoff_matches(&self) -> Box<dyn Iterator<Item = &PlayoffMatch> + '_> {
        match &self.playoffs {
            Some(playoffs) => playoffs.matches(),
            None => Box::new(std::iter::empty()),
        }
    }
}

/// A match of either phase, by mutable reference.
///
/// Group and playoff matches share the assignment surface but not a
/// struct; operations that only care about `(time, court)` go through
/// this view.
pub enum MatchMut<'a> {
    Group(&'a mut GroupMatch),
    Playoff(&'a mut PlayoffMatch),
}

impl MatchMut<'_> {
    pub fn id(&self) -> &MatchId {
        match self {
            MatchMut::Group(m) => &m.id,
            MatchMut::Playoff(m) => &m.id,
        }
    }

    pub fn assignment(&self) -> Option<Assignment> {
        match self {
            MatchMut::Group(m) => m.assignment(),
            MatchMut::Playoff(m) => m.assignment(),
        }
    }

    pub fn set_assignment(&mut self, assignment: Option<Assignment>) {
        match self {
            MatchMut::Group(m) => m.set_assignment(assignment),
            MatchMut::Playoff(m) => m.set_assignment(assignment),
        }
    }

    pub fn set_score(&mut self, score1: u32, score2: u32) {
        match self {
            MatchMut::Group(m) => {
                m.score1 = Some(score1);
                m.score2 = Some(score2);
            }
            MatchMut::Playoff(m) => {
                m.score1 = Some(score1);
                m.score2 = Some(score2);
            }
        }
    }

    /// Players known to take part, resolved slots only.
    pub fn players(&self) -> Vec<Player> {
        match self {
            MatchMut::Group(m) => m.players().cloned().collect(),
            MatchMut::Playoff(m) => m.players().cloned().collect(),
        }
    }
}

/// The tournament state document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(rename = "_globalSettings")]
    pub settings: GlobalSettings,
    #[serde(flatten)]
    pub categories: BTreeMap<CategoryName, Category>,
}

impl Tournament {
    pub fn category(&self, name: &CategoryName) -> Option<&Category> {
        self.categories.get(name)
    }

    pub fn category_mut(&mut self, name: &CategoryName) -> Option<&mut Category> {
        self.categories.get_mut(name)
    }

    /// Locate a match by id, searching one category or all of them.
    pub fn match_mut(
        &mut self,
        category: Option<&CategoryName>,
        id: &MatchId,
    ) -> Option<MatchMut<'_>> {
        let categories: Vec<&mut Category> = match category {
            Some(name) => self.categories.get_mut(name).into_iter().collect(),
            None => self.categories.values_mut().collect(),
        };
        for cat in categories {
            for group in cat
                .tournament_data
                .iter_mut()
                .flat_map(|data| data.groups.iter_mut())
            {
                if let Some(m) = group.matches.iter_mut().find(|m| m.id == *id) {
                    return Some(MatchMut::Group(m));
                }
            }
            if let Some(playoffs) = cat.playoffs.as_mut() {
                if let Some(m) = playoffs.matches_mut().find(|m| m.id == *id) {
                    return Some(MatchMut::Playoff(m));
                }
            }
        }
        None
    }

    /// Every assignment currently on the board, keyed by match id.
    pub fn assignments(&self) -> BTreeMap<MatchId, Assignment> {
        let mut out = BTreeMap::new();
        for cat in self.categories.values() {
            for m in cat.group_matches() {
                if let Some(assignment) = m.assignment() {
                    out.insert(m.id.clone(), assignment);
                }
            }
            for m in cat.playoff_matches() {
                if let Some(assignment) = m.assignment() {
                    out.insert(m.id.clone(), assignment);
                }
            }
        }
        out
    }

    /// Clear every `(time, court)` pair in the document.
    pub fn clear_assignments(&mut self) {
        for cat in self.categories.values_mut() {
            for group in cat.groups_mut() {
                for m in group.matches.iter_mut() {
                    m.set_assignment(None);
                }
            }
            if let Some(playoffs) = cat.playoffs.as_mut() {
                for m in playoffs.matches_mut() {
                    m.set_assignment(None);
                }
            }
        }
    }

    /// All matches assigned to a given `(time, court)` pair.
    pub fn occupied(&self, time: ClockTime, court: &CourtName) -> Vec<MatchId> {
        let hit = |assignment: Option<Assignment>| {
            assignment
                .map(|a| a.time == time && a.court == *court)
                .unwrap_or(false)
        };
        let mut out = Vec::new();
        for cat in self.categories.values() {
            for m in cat.group_matches() {
                if hit(m.assignment()) {
                    out.push(m.id.clone());
                }
            }
            for m in cat.playoff_matches() {
                if hit(m.assignment()) {
                    out.push(m.id.clone());
                }
            }
        }
        out
    }
}

/// Lifecycle of a match on tournament day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchState {
    /// Some slot is still a placeholder and unresolved.
    Pending,
    /// Teams known, no court assignment yet.
    Ready,
    /// Placed on a `(time, court)` pair.
    Scheduled,
    /// Both scores recorded.
    Played,
}

pub fn group_match_state(m: &GroupMatch) -> MatchState {
    if m.is_played() {
        MatchState::Played
    } else if m.assignment().is_some() {
        MatchState::Scheduled
    } else {
        MatchState::Ready
    }
}

pub fn playoff_match_state(m: &PlayoffMatch) -> MatchState {
    if m.is_played() {
        MatchState::Played
    } else if m.assignment().is_some() {
        MatchState::Scheduled
    } else if m.team1.is_some() && m.team2.is_some() {
        MatchState::Ready
    } else {
        MatchState::Pending
    }
}

/// Literal placeholders referencing a team, for renames.
pub(crate) fn literal_placeholder_slots<'a>(
    playoffs: &'a mut Playoffs,
) -> impl Iterator<Item = &'a mut Placeholder> {
    playoffs.matches_mut().flat_map(|m| {
        let PlayoffMatch {
            placeholder1,
            placeholder2,
            ..
        } = m;
        [placeholder1, placeholder2].into_iter()
    })
}
