//! Group-stage generation: team distribution, round-robins and the
//! playoff phase fed by group qualifiers.
use crate::bracket::knockout::{build_rounds, mirrored};
use crate::bracket::BracketError;
use crate::config::{Seeding, TournamentConfig};
use crate::fixture::MatchId;
use crate::group::{Group, GroupId, GroupKey, GroupMatch};
use crate::placeholder::Placeholder;
use crate::playoff::PlayoffBracket;
use crate::team::Team;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub(crate) fn generate(
    config: &TournamentConfig,
    rng: &mut StdRng,
) -> Result<(Vec<Group>, PlayoffBracket), BracketError> {
    let cohorts = distribute(&config.teams, config, rng);
    let mut groups = Vec::with_capacity(cohorts.len());
    for (index, teams) in cohorts.into_iter().enumerate() {
        // Group count was validated against the letter range.
        let key = GroupKey::from_index(index as u32)?;
        let matches = round_robin(config, key, &teams);
        groups.push(Group {
            key,
            teams,
            matches,
        });
    }
    let sources = qualifier_sources(config)?;
    let bracket = build_rounds(&config.category, sources, config.include_third_place, true);
    Ok((groups, bracket))
}

/// Distribute teams into groups.
///
/// `Order` deals serpentine so that seeds spread evenly: even dealing
/// rounds run left to right over the groups, odd rounds right to left.
/// `Random` shuffles the roster and fills the groups sequentially.
fn distribute(teams: &[Team], config: &TournamentConfig, rng: &mut StdRng) -> Vec<Vec<Team>> {
    let group_count = config.group_count as usize;
    match config.seeding {
        Seeding::Order => {
            let mut groups = vec![Vec::new(); group_count];
            for (i, team) in teams.iter().enumerate() {
                let dealing_round = i / group_count;
                let position = i % group_count;
                let target = if dealing_round % 2 == 0 {
                    position
                } else {
                    group_count - 1 - position
                };
                groups[target].push(team.clone());
            }
            groups
        }
        Seeding::Random => {
            let mut shuffled = teams.to_vec();
            shuffled.shuffle(rng);
            let mut rest = shuffled.as_slice();
            config
                .group_sizes()
                .into_iter()
                .map(|size| {
                    let (cohort, tail) = rest.split_at(size);
                    rest = tail;
                    cohort.to_vec()
                })
                .collect()
        }
    }
}

/// Full round-robin of a group, pairings in natural nested order.
fn round_robin(config: &TournamentConfig, key: GroupKey, teams: &[Team]) -> Vec<GroupMatch> {
    teams
        .iter()
        .tuple_combinations()
        .enumerate()
        .map(|(i, (team1, team2))| {
            GroupMatch::new(
                MatchId::from(format!("{}-{}-Jogo{}", config.category, key, i + 1)),
                team1.clone(),
                team2.clone(),
            )
        })
        .collect()
}

/// Slot sources of the first playoff round.
///
/// The canonical four-groups-two-advance case keeps the legacy seeding
/// table; any other qualifier count orders qualifiers position-major
/// (all group winners, then all runners-up, ...) and pairs them
/// mirrored.
fn qualifier_sources(
    config: &TournamentConfig,
) -> Result<Vec<(Placeholder, Placeholder)>, BracketError> {
    let rank = |group: u32, position: u32| -> Result<Placeholder, BracketError> {
        let key = GroupKey::from_index(group)?;
        Ok(Placeholder::GroupRank(
            GroupId::new(config.category.clone(), key),
            position,
        ))
    };

    if config.group_count == 4 && config.advance_per_group == 2 {
        return Ok(vec![
            (rank(0, 1)?, rank(3, 2)?),
            (rank(1, 2)?, rank(2, 1)?),
            (rank(1, 1)?, rank(2, 2)?),
            (rank(0, 2)?, rank(3, 1)?),
        ]);
    }

    let mut qualifiers = Vec::new();
    for position in 1..=config.advance_per_group {
        for group in 0..config.group_count {
            qualifiers.push(rank(group, position)?);
        }
    }
    Ok(mirrored(&qualifiers))
}
