//! # Bracket generator
//!
//! Turns a validated [`TournamentConfig`] into the category's full
//! match graph: group round-robins, a single elimination tree, or the
//! upper/lower pair of a double elimination. Generation is all-or
//! nothing; a configuration that fails validation produces no partial
//! bracket.
//!
//! Determinism matters here because match ids double as dependency
//! references and as stable keys for the operator's spreadsheets:
//! identical input (and seed, for random seeding) must produce a
//! byte-identical id set.
mod double;
mod groups;
mod knockout;
mod single;

use crate::config::{ConfigError, Seeding, TournamentConfig, TournamentKind};
use crate::group::{Group, GroupError};
use crate::playoff::Playoffs;
use crate::team::Team;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

/// Everything the generator produces for one category.
#[derive(Debug, Clone)]
pub struct CategoryData {
    pub groups: Option<Vec<Group>>,
    pub playoffs: Option<Playoffs>,
    pub total_matches: usize,
}

/// Generate the match graph for a category.
///
/// `seed` pins the rng for random seeding; pass `None` outside tests
/// to draw from entropy.
///
/// # Errors
///
/// Configuration validation failures ([`ConfigError`]) abort the whole
/// generation.
pub fn generate(config: &TournamentConfig, seed: Option<u64>) -> Result<CategoryData, BracketError> {
    config.validate()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut data = match config.kind {
        TournamentKind::Groups => {
            let (groups, bracket) = groups::generate(config, &mut rng)?;
            let total = groups.iter().map(|g| g.matches.len()).sum::<usize>()
                + bracket.matches().count();
            CategoryData {
                groups: Some(groups),
                playoffs: Some(Playoffs::Single(bracket)),
                total_matches: total,
            }
        }
        TournamentKind::SingleElim => {
            let bracket = single::generate(config, &mut rng);
            let total = bracket.matches().count();
            CategoryData {
                groups: None,
                playoffs: Some(Playoffs::Single(bracket)),
                total_matches: total,
            }
        }
        TournamentKind::DoubleElim => {
            let set = double::generate(config, &mut rng);
            let playoffs = Playoffs::Double(set);
            let total = playoffs.matches().count();
            CategoryData {
                groups: None,
                playoffs: Some(playoffs),
                total_matches: total,
            }
        }
    };

    if let Some(playoffs) = data.playoffs.as_mut() {
        for m in playoffs.matches_mut() {
            m.phase_start_time = config.phase_start_times.for_stage(m.stage);
        }
    }
    Ok(data)
}

/// Roster order for `Order` seeding, a reproducible shuffle otherwise.
pub(crate) fn seed_teams(teams: &[Team], seeding: Seeding, rng: &mut StdRng) -> Vec<Team> {
    let mut seeds = teams.to_vec();
    if let Seeding::Random = seeding {
        seeds.shuffle(rng);
    }
    seeds
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Group(#[from] GroupError),
}
