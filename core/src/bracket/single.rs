//! Single elimination generation.
use crate::bracket::knockout::build_rounds;
use crate::bracket::seed_teams;
use crate::config::TournamentConfig;
use crate::placeholder::Placeholder;
use crate::playoff::PlayoffBracket;
use rand::rngs::StdRng;

/// Build the elimination tree for a power-of-two roster.
///
/// After seeding, round one pairs seed `i` against seed `n-1-i`, so
/// the top seeds sit at opposite ends of the bracket.
pub(crate) fn generate(config: &TournamentConfig, rng: &mut StdRng) -> PlayoffBracket {
    let seeds = seed_teams(&config.teams, config.seeding, rng);
    let n = seeds.len();
    let sources: Vec<(Placeholder, Placeholder)> = (0..n / 2)
        .map(|i| {
            (
                Placeholder::Literal(seeds[i].clone()),
                Placeholder::Literal(seeds[n - 1 - i].clone()),
            )
        })
        .collect();
    build_rounds(&config.category, sources, config.include_third_place, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::mock_data::{config, numbered_teams};
    use crate::config::{Seeding, TournamentKind};
    use crate::fixture::Stage;
    use rand::SeedableRng;

    #[test]
    fn eight_teams_make_a_full_tree() {
        let cfg = config("Cat", TournamentKind::SingleElim, numbered_teams(8));
        let bracket = generate(&cfg, &mut StdRng::seed_from_u64(0));
        let sizes: Vec<usize> = bracket.rounds.iter().map(|r| r.matches.len()).collect();
        assert_eq!(sizes, vec![4, 2, 1]);
        let quarters = &bracket.rounds[0];
        assert_eq!(quarters.matches[0].team1, Some(cfg.teams[0].clone()));
        assert_eq!(quarters.matches[0].team2, Some(cfg.teams[7].clone()));
        assert_eq!(quarters.matches[3].team1, Some(cfg.teams[3].clone()));
        assert_eq!(quarters.matches[3].team2, Some(cfg.teams[4].clone()));
    }

    #[test]
    fn third_place_round_present_when_asked() {
        let mut cfg = config("Cat", TournamentKind::SingleElim, numbered_teams(4));
        cfg.include_third_place = true;
        let bracket = generate(&cfg, &mut StdRng::seed_from_u64(0));
        let stages: Vec<Stage> = bracket
            .rounds
            .iter()
            .flat_map(|r| r.matches.iter().map(|m| m.stage))
            .collect();
        assert_eq!(
            stages,
            vec![
                Stage::Semifinal,
                Stage::Semifinal,
                Stage::Final,
                Stage::ThirdPlace
            ]
        );
    }

    #[test]
    fn random_seeding_reproducible_under_a_seed() {
        let mut cfg = config("Cat", TournamentKind::SingleElim, numbered_teams(16));
        cfg.seeding = Seeding::Random;
        let a = generate(&cfg, &mut StdRng::seed_from_u64(99));
        let b = generate(&cfg, &mut StdRng::seed_from_u64(99));
        let teams_of = |bracket: &PlayoffBracket| -> Vec<String> {
            bracket
                .rounds[0]
                .matches
                .iter()
                .map(|m| format!("{:?}x{:?}", m.team1, m.team2))
                .collect()
        };
        assert_eq!(teams_of(&a), teams_of(&b));
        assert_eq!(a.rounds[0].name, "Oitavas de Final");
    }
}
