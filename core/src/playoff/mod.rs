//! # Playoff brackets
//!
//! Knockout matches and the bracket structures that hold them. A
//! bracket is a flat list of named rounds; matches refer to each other
//! only through ids inside their [`Placeholder`]s, so there is no
//! pointer graph to keep consistent and the whole structure serialises
//! directly.
use crate::clock::ClockTime;
use crate::court::CourtName;
use crate::fixture::{Assignment, MatchId, MatchScore, Side, Stage};
use crate::placeholder::Placeholder;
use crate::team::{Player, Team};
use serde::{Deserialize, Serialize};

/// A knockout match.
///
/// Each slot carries the rule describing where its team comes from
/// (`placeholder1`/`placeholder2`) and, once known, the resolved team.
/// Resolution happens at most once per slot and never overwrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffMatch {
    pub id: MatchId,
    pub name: String,
    pub round_order: u32,
    pub stage: Stage,
    pub placeholder1: Placeholder,
    pub placeholder2: Placeholder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score2: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<CourtName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_start_time: Option<ClockTime>,
}

impl PlayoffMatch {
    pub fn new(
        id: MatchId,
        name: String,
        round_order: u32,
        stage: Stage,
        placeholder1: Placeholder,
        placeholder2: Placeholder,
    ) -> Self {
        // Literal placeholders resolve on the spot.
        let team1 = match &placeholder1 {
            Placeholder::Literal(team) => Some(team.clone()),
            _ => None,
        };
        let team2 = match &placeholder2 {
            Placeholder::Literal(team) => Some(team.clone()),
            _ => None,
        };
        PlayoffMatch {
            id,
            name,
            round_order,
            stage,
            placeholder1,
            placeholder2,
            team1,
            team2,
            score1: None,
            score2: None,
            time: None,
            court: None,
            phase_start_time: None,
        }
    }

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

    /// Players of the already-resolved slots.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.team1
            .iter()
            .chain(self.team2.iter())
            .flat_map(|team| team.players())
    }

    fn team_on(&self, side: Side) -> Option<&Team> {
        match side {
            Side::Team1 => self.team1.as_ref(),
            Side::Team2 => self.team2.as_ref(),
        }
    }

    /// Winner, once both teams are resolved and a decisive score is in.
    pub fn winner(&self) -> Option<&Team> {
        let side = self.score()?.winning_side()?;
        self.team_on(side)
    }

    /// Loser, under the same conditions as [`PlayoffMatch::winner`].
    pub fn loser(&self) -> Option<&Team> {
        let side = self.score()?.winning_side()?;
        self.team_on(side.other())
    }
}

/// A named bracket round.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffRound {
    pub name: String,
    pub order: u32,
    pub matches: Vec<PlayoffMatch>,
}

/// A linear sequence of rounds (single elimination, or the playoff
/// phase grown out of a group stage).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffBracket {
    pub rounds: Vec<PlayoffRound>,
}

impl PlayoffBracket {
    pub fn matches(&self) -> impl Iterator<Item = &PlayoffMatch> {
        self.rounds.iter().flat_map(|round| round.matches.iter())
    }

    pub fn matches_mut(&mut self) -> impl Iterator<Item = &mut PlayoffMatch> {
        self.rounds
            .iter_mut()
            .flat_map(|round| round.matches.iter_mut())
    }
}

/// Upper/lower bracket pair with a grand final (double elimination).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoffBracketSet {
    pub upper: PlayoffBracket,
    pub lower: PlayoffBracket,
    pub grand_final: PlayoffRound,
}

/// The playoff phase of a category, whichever shape it takes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Playoffs {
    Double(PlayoffBracketSet),
    Single(PlayoffBracket),
}

impl Playoffs {
    pub fn matches(&self) -> Box<dyn Iterator<Item = &PlayoffMatch> + '_> {
        match self {
            Playoffs::Single(bracket) => Box::new(bracket.matches()),
            Playoffs::Double(set) => Box::new(
                set.upper
                    .matches()
                    .chain(set.lower.matches())
                    .chain(set.grand_final.matches.iter()),
            ),
        }
    }

    pub fn matches_mut(&mut self) -> Box<dyn Iterator<Item = &mut PlayoffMatch> + '_> {
        match self {
            Playoffs::Single(bracket) => Box::new(bracket.matches_mut()),
            Playoffs::Double(set) => Box::new(
                set.upper
                    .matches_mut()
                    .chain(set.lower.matches_mut())
                    .chain(set.grand_final.matches.iter_mut()),
            ),
        }
    }

    pub fn find(&self, id: &MatchId) -> Option<&PlayoffMatch> {
        self.matches().find(|m| m.id == *id)
    }
}

/// Name, id key and stage of a knockout round with `remaining` teams.
pub(crate) fn knockout_round(remaining: usize) -> (String, String, Stage) {
    match remaining {
        2 => (
            String::from("Final"),
            String::from("Final"),
            Stage::Final,
        ),
        4 => (
            String::from("Semifinal"),
            String::from("Semifinal"),
            Stage::Semifinal,
        ),
        8 => (
            String::from("Quartas de Final"),
            String::from("Quartas"),
            Stage::QuarterFinal,
        ),
        16 => (
            String::from("Oitavas de Final"),
            String::from("Oitavas"),
            Stage::EighthFinal,
        ),
        n => (format!("Rodada de {}", n), format!("R{}", n), Stage::Playoff),
    }
}
