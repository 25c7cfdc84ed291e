//! # Group stage
//!
//! A group is a round-robin cohort inside a category. The fundamental
//! data are the teams and their matches; standings, completion and
//! qualifier positions are all derived from recorded scores, never
//! stored.
pub mod standings;

use crate::clock::ClockTime;
use crate::config::CategoryName;
use crate::court::CourtName;
use crate::fixture::{Assignment, MatchId, MatchScore};
use crate::team::{Player, Team};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use standings::{standings, Standing};

/// Group letter within a category.
///
/// Groups are labelled with an upper case letter, rendered as
/// `Group<letter>` on the wire (ids, qualifier placeholders). The
/// letter is restricted to ASCII A-Z.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GroupKey(char);

impl GroupKey {
    /// Key of the `index`-th group, zero-based (`0 -> A`).
    ///
    /// # Errors
    ///
    /// Errors past the letter `Z`.
    pub fn from_index(index: u32) -> Result<Self, GroupError> {
        if index < 26 {
            // index < 26 keeps the arithmetic inside A-Z.
            Ok(GroupKey(char::from(b'A' + index as u8)))
        } else {
            Err(GroupError::TooManyGroups(index + 1))
        }
    }

    pub fn letter(&self) -> char {
        self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group{}", self.0)
    }
}

impl TryFrom<char> for GroupKey {
    type Error = GroupError;
    fn try_from(letter: char) -> Result<Self, Self::Error> {
        if letter.is_ascii_uppercase() {
            Ok(GroupKey(letter))
        } else {
            Err(GroupError::InvalidGroupKey(letter))
        }
    }
}

impl FromStr for GroupKey {
    type Err = GroupError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let letter = s
            .strip_prefix("Group")
            .and_then(|rest| {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(letter), None) => Some(letter),
                    _ => None,
                }
            })
            .ok_or_else(|| GroupError::ParseGroupKey(String::from(s)))?;
        GroupKey::try_from(letter)
    }
}

impl Serialize for GroupKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GroupKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Tournament-wide group identifier: category plus group key.
///
/// Rendered `<category>-<groupKey>`, e.g. `Masculino-GroupA`. This is
/// the id that group-completion dependencies refer to.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GroupId {
    pub category: CategoryName,
    pub key: GroupKey,
}

impl GroupId {
    pub fn new(category: CategoryName, key: GroupKey) -> Self {
        GroupId { category, key }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.category, self.key)
    }
}

impl FromStr for GroupId {
    type Err = GroupError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Category names may contain dashes; the group key never does.
        let (category, key) = s
            .rsplit_once('-')
            .ok_or_else(|| GroupError::ParseGroupId(String::from(s)))?;
        if category.is_empty() {
            return Err(GroupError::ParseGroupId(String::from(s)));
        }
        Ok(GroupId {
            category: CategoryName::from(category),
            key: key.parse()?,
        })
    }
}

/// A round-robin match between two known teams.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMatch {
    pub id: MatchId,
    pub team1: Team,
    pub team2: Team,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score2: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<CourtName>,
}

impl GroupMatch {
    pub fn new(id: MatchId, team1: Team, team2: Team) -> Self {
        GroupMatch {
            id,
            team1,
            team2,
            score1: None,
            score2: None,
            time: None,
            court: None,
        }
    }

    /// The recorded result, once both scores are present.
    pub fn score(&self) -> Option<MatchScore> {
        match (self.score1, self.score2) {
            (Some(score1), Some(score2)) => Some(MatchScore::new(score1, score2)),
            _ => None,
        }
    }

    pub fn is_played(&self) -> bool {
        self.score().is_some()
    }

    pub fn assignment(&self) -> Option<Assignment> {
        match (self.time, self.court.as_ref()) {
            (Some(time), Some(court)) => Some(Assignment {
                time,
                court: court.clone(),
            }),
            _ => None,
        }
    }

    pub fn set_assignment(&mut self, assignment: Option<Assignment>) {
        match assignment {
            Some(assignment) => {
                self.time = Some(assignment.time);
                self.court = Some(assignment.court);
            }
            None => {
                self.time = None;
                self.court = None;
            }
        }
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.team1
            .players()
            .into_iter()
            .chain(self.team2.players())
    }
}

/// Single group data structure.
///
/// Holds the teams in roster order (which doubles as the last
/// standings tiebreaker) and the full round-robin of matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub key: GroupKey,
    pub teams: Vec<Team>,
    pub matches: Vec<GroupMatch>,
}

impl Group {
    /// A group is finished once every match has both scores recorded.
    /// Finishing freezes the qualifier positions.
    pub fn is_finished(&self) -> bool {
        self.matches.iter().all(GroupMatch::is_played)
    }

    pub fn match_ids(&self) -> impl Iterator<Item = &MatchId> {
        self.matches.iter().map(|m| &m.id)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("group letters run out at Z, cannot label group {0}")]
    TooManyGroups(u32),
    #[error("group key letter '{0}' not an upper case ASCII letter")]
    InvalidGroupKey(char),
    #[error("could not parse group key '{0}', expected Group<letter>")]
    ParseGroupKey(String),
    #[error("could not parse group id '{0}', expected <category>-Group<letter>")]
    ParseGroupId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_key_round_trip() {
        let key = GroupKey::from_index(2).unwrap();
        assert_eq!(key.to_string(), "GroupC");
        assert_eq!("GroupC".parse::<GroupKey>().unwrap(), key);
    }

    #[test]
    fn group_key_rejects_lowercase_and_junk() {
        assert!("Groupa".parse::<GroupKey>().is_err());
        assert!("GrpA".parse::<GroupKey>().is_err());
        assert!("GroupAB".parse::<GroupKey>().is_err());
    }

    #[test]
    fn group_id_allows_dashed_category() {
        let id: GroupId = "Misto-Sub18-GroupB".parse().unwrap();
        assert_eq!(id.category, CategoryName::from("Misto-Sub18"));
        assert_eq!(id.key.letter(), 'B');
        assert_eq!(id.to_string(), "Misto-Sub18-GroupB");
    }

    #[test]
    fn score_requires_both_sides() {
        let mut game = GroupMatch::new(
            MatchId::from("Masculino-GroupA-Jogo1"),
            Team::try_new("Ana", "Bia").unwrap(),
            Team::try_new("Caio", "Duda").unwrap(),
        );
        assert!(game.score().is_none());
        game.score1 = Some(2);
        assert!(game.score().is_none());
        game.score2 = Some(1);
        assert!(game.is_played());
    }
}
