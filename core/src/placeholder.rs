//! # Deferred team references
//!
//! A playoff slot that cannot name its team yet carries a
//! [`Placeholder`] describing where the team will come from. The wire
//! grammar is the legacy Portuguese one:
//!
//! - `"Vencedor <matchId>"`, winner of that match
//! - `"Perdedor <matchId>"`, loser of that match
//! - `"<n>º do <category>-<groupKey>"`, the n-th ranked team of a
//!   finished group
//! - any other string is a literal team key (bootstrap rounds)
//!
//! Strings are parsed once at ingress into this sum type; everything
//! downstream (the resolver, the dependency graph) matches on variants
//! and never inspects text again.
use crate::fixture::MatchId;
use crate::group::GroupId;
use crate::team::Team;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const WINNER_PREFIX: &str = "Vencedor ";
const LOSER_PREFIX: &str = "Perdedor ";
const RANK_SEPARATOR: &str = "º do ";

/// Where a slot's team comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// A team known at generation time.
    Literal(Team),
    /// Winner of a previous playoff match.
    WinnerOf(MatchId),
    /// Loser of a previous playoff match (third place, lower bracket).
    LoserOf(MatchId),
    /// The team ranked `position` (1-based) in a finished group.
    GroupRank(GroupId, u32),
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Literal(team) => write!(f, "{}", team),
            Placeholder::WinnerOf(id) => write!(f, "{}{}", WINNER_PREFIX, id),
            Placeholder::LoserOf(id) => write!(f, "{}{}", LOSER_PREFIX, id),
            Placeholder::GroupRank(group, position) => {
                write!(f, "{}{}{}", position, RANK_SEPARATOR, group)
            }
        }
    }
}

impl FromStr for Placeholder {
    type Err = PlaceholderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix(WINNER_PREFIX) {
            return Ok(Placeholder::WinnerOf(MatchId::from(id)));
        }
        if let Some(id) = s.strip_prefix(LOSER_PREFIX) {
            return Ok(Placeholder::LoserOf(MatchId::from(id)));
        }
        if let Some((position, group)) = s.split_once(RANK_SEPARATOR) {
            let position: u32 = position
                .parse()
                .map_err(|_| PlaceholderError::InvalidRank(String::from(s)))?;
            if position == 0 {
                return Err(PlaceholderError::InvalidRank(String::from(s)));
            }
            let group = group
                .parse()
                .map_err(|_| PlaceholderError::InvalidGroup(String::from(s)))?;
            return Ok(Placeholder::GroupRank(group, position));
        }
        // Everything else is a literal team key.
        let team = s
            .parse()
            .map_err(|_| PlaceholderError::InvalidLiteral(String::from(s)))?;
        Ok(Placeholder::Literal(team))
    }
}

impl Serialize for Placeholder {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Placeholder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    #[error("invalid qualifier rank in placeholder '{0}'")]
    InvalidRank(String),
    #[error("invalid group reference in placeholder '{0}'")]
    InvalidGroup(String),
    #[error("placeholder '{0}' is neither a rule nor a team key")]
    InvalidLiteral(String),
}
