//! Shared knockout-round construction.
//!
//! Both the single elimination tree and the playoff phase grown out of
//! a group stage are a chain of halving rounds over an initial list of
//! slot sources; only that list differs. Later rounds pair the previous
//! round's winners mirrored (first against last), which reproduces the
//! classic bracket where seeds 1 and 2 can only meet in the final.
use crate::config::CategoryName;
use crate::fixture::{MatchId, Stage};
use crate::placeholder::Placeholder;
use crate::playoff::{knockout_round, PlayoffBracket, PlayoffMatch, PlayoffRound};

/// Build the full round chain from the first-round slot sources.
///
/// `fixed_semis` switches the quarters-to-semis step to the legacy
/// `(W1,W4)(W3,W2)` arrangement used by group-sourced brackets.
pub(crate) fn build_rounds(
    category: &CategoryName,
    sources: Vec<(Placeholder, Placeholder)>,
    include_third_place: bool,
    fixed_semis: bool,
) -> PlayoffBracket {
    let mut rounds: Vec<PlayoffRound> = Vec::new();
    let mut order = 1;
    let mut remaining = sources.len() * 2;

    rounds.push(make_round(category, remaining, order, sources));

    while remaining > 2 {
        let from_quarters = remaining == 8;
        remaining /= 2;
        order += 1;
        let winners: Vec<Placeholder> = rounds
            .last()
            .map(|round| {
                round
                    .matches
                    .iter()
                    .map(|m| Placeholder::WinnerOf(m.id.clone()))
                    .collect()
            })
            .unwrap_or_default();
        let pairs = if from_quarters && fixed_semis {
            vec![
                (winners[0].clone(), winners[3].clone()),
                (winners[2].clone(), winners[1].clone()),
            ]
        } else {
            mirrored(&winners)
        };
        rounds.push(make_round(category, remaining, order, pairs));
    }

    if include_third_place {
        if let Some(third) = third_place(category, &rounds, order + 1) {
            rounds.push(third);
        }
    }

    PlayoffBracket { rounds }
}

/// Pair a list first-against-last. The list length is even by bracket
/// construction.
pub(crate) fn mirrored(entrants: &[Placeholder]) -> Vec<(Placeholder, Placeholder)> {
    (0..entrants.len() / 2)
        .map(|i| {
            (
                entrants[i].clone(),
                entrants[entrants.len() - 1 - i].clone(),
            )
        })
        .collect()
}

fn make_round(
    category: &CategoryName,
    remaining: usize,
    order: u32,
    pairs: Vec<(Placeholder, Placeholder)>,
) -> PlayoffRound {
    let (round_name, key, stage) = knockout_round(remaining);
    let matches = pairs
        .into_iter()
        .enumerate()
        .map(|(i, (placeholder1, placeholder2))| {
            let name = if remaining == 2 {
                round_name.clone()
            } else {
                format!("{} {}", round_name, i + 1)
            };
            PlayoffMatch::new(
                MatchId::from(format!("{}-{}-Jogo{}", category, key, i + 1)),
                name,
                order,
                stage,
                placeholder1,
                placeholder2,
            )
        })
        .collect();
    PlayoffRound {
        name: round_name,
        order,
        matches,
    }
}

/// The optional third-place match, pairing the semifinal losers.
fn third_place(
    category: &CategoryName,
    rounds: &[PlayoffRound],
    order: u32,
) -> Option<PlayoffRound> {
    let semis = rounds.iter().find(|round| {
        round.matches.len() == 2
            && round
                .matches
                .iter()
                .all(|m| m.stage == Stage::Semifinal)
    })?;
    let name = String::from("Disputa de 3º Lugar");
    let third = PlayoffMatch::new(
        MatchId::from(format!("{}-3P-J1", category)),
        name.clone(),
        order,
        Stage::ThirdPlace,
        Placeholder::LoserOf(semis.matches[0].id.clone()),
        Placeholder::LoserOf(semis.matches[1].id.clone()),
    );
    Some(PlayoffRound {
        name,
        order,
        matches: vec![third],
    })
}
