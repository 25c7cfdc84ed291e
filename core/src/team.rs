//! # Teams and players
//!
//! A team is a pair of players. The wire form is the display string
//! `"<player1> e <player2>"` and the canonical key is the same string
//! with the pair sorted, so `"Ana e Bia"` and `"Bia e Ana"` denote the
//! same team. [`Team`] sorts the pair at construction; equality and
//! hashing therefore fall out of the derived impls.
use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Player display name.
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
pub struct Player(String);

impl Player {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Player {
    fn from(name: &str) -> Self {
        Player(String::from(name))
    }
}

/// The separator of the `"<p1> e <p2>"` wire form.
const PAIR_SEPARATOR: &str = " e ";

/// A doubles team, canonicalised.
///
/// The constructor sorts the two players, so any two teams naming the
/// same pair compare equal and hash identically.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Team {
    player1: Player,
    player2: Player,
}

impl Team {
    /// Fallible constructor.
    ///
    /// # Errors
    ///
    /// Errors on an empty player name or a player paired with themselves.
    pub fn try_new<P: Into<Player>>(player1: P, player2: P) -> Result<Self, TeamError> {
        let mut player1 = player1.into();
        let mut player2 = player2.into();
        if player1.name().trim().is_empty() || player2.name().trim().is_empty() {
            return Err(TeamError::EmptyPlayer);
        }
        if player1 == player2 {
            return Err(TeamError::PlayerPairedWithSelf(player1));
        }
        if player2 < player1 {
            std::mem::swap(&mut player1, &mut player2);
        }
        Ok(Team { player1, player2 })
    }

    pub fn players(&self) -> [&Player; 2] {
        [&self.player1, &self.player2]
    }

    pub fn has_player(&self, player: &Player) -> bool {
        self.player1 == *player || self.player2 == *player
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.player1, PAIR_SEPARATOR, self.player2)
    }
}

impl FromStr for Team {
    type Err = TeamError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (p1, p2) = s
            .split_once(PAIR_SEPARATOR)
            .ok_or_else(|| TeamError::Parse(String::from(s)))?;
        Team::try_new(p1.trim(), p2.trim())
    }
}

impl Serialize for Team {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Team {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TeamError {
    #[error("player name must not be empty")]
    EmptyPlayer,
    #[error("player '{0}' cannot be paired with themselves")]
    PlayerPairedWithSelf(Player),
    #[error("could not parse team '{0}', expected '<player> e <player>'")]
    Parse(String),
}
