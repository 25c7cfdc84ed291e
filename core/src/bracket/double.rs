//! Double elimination generation.
//!
//! The upper bracket is a single elimination tree over the padded
//! bracket size; teams holding a bye join in round two. The lower
//! bracket alternates two round shapes: internal rounds pair lower
//! bracket survivors among themselves, drop-down rounds pair them with
//! the losers falling out of the corresponding upper round. The grand
//! final pits the two bracket finalists against each other.
//!
//! With byes the participant counts stop being powers of two, so both
//! round shapes let an odd participant carry straight into the next
//! round instead of forcing hollow matches.
use crate::bracket::seed_teams;
use crate::config::{CategoryName, Seeding, TournamentConfig};
use crate::fixture::{MatchId, Stage};
use crate::placeholder::Placeholder;
use crate::playoff::{PlayoffBracket, PlayoffBracketSet, PlayoffMatch, PlayoffRound};
use crate::team::Team;
use rand::rngs::StdRng;

pub(crate) fn generate(config: &TournamentConfig, rng: &mut StdRng) -> PlayoffBracketSet {
    let seeds = seed_teams(&config.teams, config.seeding, rng);
    let n = seeds.len();
    let bracket_size = n.next_power_of_two();
    let byes = bracket_size - n;

    // Who sits out round one. With roster seeding the top seeds earn
    // the bye; with random seeding the shuffled tail does.
    let (resting, playing): (&[Team], &[Team]) = match config.seeding {
        Seeding::Order => (&seeds[..byes], &seeds[byes..]),
        Seeding::Random => (&seeds[n - byes..], &seeds[..n - byes]),
    };

    let upper_round_count = bracket_size.trailing_zeros();
    let mut builder = Builder::new(&config.category);
    let upper = builder.upper_bracket(resting, playing, upper_round_count);
    let lower = builder.lower_bracket(upper_round_count);
    let grand_final = builder.grand_final();

    PlayoffBracketSet {
        upper,
        lower,
        grand_final,
    }
}

struct Builder<'a> {
    category: &'a CategoryName,
    order: u32,
    /// Losers of each upper round, in match order.
    dropped: Vec<Vec<Placeholder>>,
    upper_finalist: Option<Placeholder>,
    lower_finalist: Option<Placeholder>,
}

impl<'a> Builder<'a> {
    fn new(category: &'a CategoryName) -> Self {
        Builder {
            category,
            order: 0,
            dropped: Vec::new(),
            upper_finalist: None,
            lower_finalist: None,
        }
    }

    fn upper_bracket(
        &mut self,
        resting: &[Team],
        playing: &[Team],
        round_count: u32,
    ) -> PlayoffBracket {
        let mut rounds = Vec::new();

        let m = playing.len();
        let first: Vec<(Placeholder, Placeholder)> = (0..m / 2)
            .map(|j| {
                (
                    Placeholder::Literal(playing[j].clone()),
                    Placeholder::Literal(playing[m - 1 - j].clone()),
                )
            })
            .collect();
        rounds.push(self.upper_round(1, first));

        for r in 2..=round_count {
            let mut participants: Vec<Placeholder> = Vec::new();
            if r == 2 {
                participants.extend(resting.iter().cloned().map(Placeholder::Literal));
            }
            participants.extend(
                rounds
                    .last()
                    .into_iter()
                    .flat_map(|round: &PlayoffRound| round.matches.iter())
                    .map(|m| Placeholder::WinnerOf(m.id.clone())),
            );
            let pairs: Vec<(Placeholder, Placeholder)> = (0..participants.len() / 2)
                .map(|i| {
                    (
                        participants[i].clone(),
                        participants[participants.len() - 1 - i].clone(),
                    )
                })
                .collect();
            rounds.push(self.upper_round(r, pairs));
        }

        self.upper_finalist = rounds
            .last()
            .and_then(|round| round.matches.first())
            .map(|m| Placeholder::WinnerOf(m.id.clone()));
        PlayoffBracket { rounds }
    }

    fn upper_round(&mut self, r: u32, pairs: Vec<(Placeholder, Placeholder)>) -> PlayoffRound {
        self.order += 1;
        let name = format!("Chave Superior Rodada {}", r);
        let matches: Vec<PlayoffMatch> = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (placeholder1, placeholder2))| {
                PlayoffMatch::new(
                    MatchId::from(format!("{}-U-R{}-J{}", self.category, r, i + 1)),
                    format!("{} Jogo {}", name, i + 1),
                    self.order,
                    Stage::Playoff,
                    placeholder1,
                    placeholder2,
                )
            })
            .collect();
        self.dropped.push(
            matches
                .iter()
                .map(|m| Placeholder::LoserOf(m.id.clone()))
                .collect(),
        );
        PlayoffRound {
            name,
            order: self.order,
            matches,
        }
    }

    fn lower_bracket(&mut self, upper_round_count: u32) -> PlayoffBracket {
        let mut rounds = Vec::new();
        let mut index = 0;

        // Round one is internal among the upper round-one losers.
        let mut survivors = self.play_round(
            &mut rounds,
            &mut index,
            pair_adjacent(self.dropped[0].clone()),
        );

        for r in 2..=upper_round_count {
            let mut drops = self.dropped[r as usize - 1].clone();
            // Reversed so that a team cannot immediately rematch the
            // opponent that sent it down.
            drops.reverse();
            survivors = self.play_round(&mut rounds, &mut index, zip_carry(survivors, drops));
            if r < upper_round_count && survivors.len() >= 2 {
                survivors = self.play_round(&mut rounds, &mut index, pair_adjacent(survivors));
            }
        }

        debug_assert_eq!(survivors.len(), 1, "lower bracket must leave one finalist");
        self.lower_finalist = survivors.pop();
        PlayoffBracket { rounds }
    }

    /// Materialise one lower round from its pairs, returning the next
    /// survivor list (winners first, then any carried participant).
    fn play_round(
        &mut self,
        rounds: &mut Vec<PlayoffRound>,
        index: &mut u32,
        (pairs, carried): (Vec<(Placeholder, Placeholder)>, Vec<Placeholder>),
    ) -> Vec<Placeholder> {
        if pairs.is_empty() {
            return carried;
        }
        *index += 1;
        self.order += 1;
        let name = format!("Chave Inferior Rodada {}", index);
        let matches: Vec<PlayoffMatch> = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (placeholder1, placeholder2))| {
                PlayoffMatch::new(
                    MatchId::from(format!("{}-L-R{}-J{}", self.category, index, i + 1)),
                    format!("{} Jogo {}", name, i + 1),
                    self.order,
                    Stage::Playoff,
                    placeholder1,
                    placeholder2,
                )
            })
            .collect();
        let mut survivors: Vec<Placeholder> = matches
            .iter()
            .map(|m| Placeholder::WinnerOf(m.id.clone()))
            .collect();
        survivors.extend(carried);
        rounds.push(PlayoffRound {
            name,
            order: self.order,
            matches,
        });
        survivors
    }

    fn grand_final(&mut self) -> PlayoffRound {
        self.order += 1;
        let name = String::from("Grande Final");
        // Both finalists exist for any bracket of two or more teams.
        let upper = self
            .upper_finalist
            .take()
            .expect("upper bracket always has a final");
        let lower = self
            .lower_finalist
            .take()
            .expect("lower bracket always leaves a finalist");
        let grand_final = PlayoffMatch::new(
            MatchId::from(format!("{}-GF-J1", self.category)),
            name.clone(),
            self.order,
            Stage::Final,
            upper,
            lower,
        );
        PlayoffRound {
            name,
            order: self.order,
            matches: vec![grand_final],
        }
    }
}

/// Pair a list in adjacent twos; an odd last participant is carried.
fn pair_adjacent(
    entrants: Vec<Placeholder>,
) -> (Vec<(Placeholder, Placeholder)>, Vec<Placeholder>) {
    let mut pairs = Vec::new();
    let mut carried = Vec::new();
    let mut iter = entrants.into_iter();
    while let Some(first) = iter.next() {
        match iter.next() {
            Some(second) => pairs.push((first, second)),
            None => carried.push(first),
        }
    }
    (pairs, carried)
}

/// Pair two lists elementwise; the longer list's tail is carried.
fn zip_carry(
    mut left: Vec<Placeholder>,
    mut right: Vec<Placeholder>,
) -> (Vec<(Placeholder, Placeholder)>, Vec<Placeholder>) {
    let paired = left.len().min(right.len());
    let mut carried: Vec<Placeholder> = left.split_off(paired);
    carried.extend(right.split_off(paired));
    (left.into_iter().zip(right).collect(), carried)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::mock_data::{config, numbered_teams};
    use crate::config::TournamentKind;

    fn build(teams: usize) -> PlayoffBracketSet {
        let cfg = config("Cat", TournamentKind::DoubleElim, numbered_teams(teams));
        let mut rng = rand::SeedableRng::seed_from_u64(0);
        generate(&cfg, &mut rng)
    }

    #[test]
    fn six_teams_order_seeding() {
        let cfg = config("Cat", TournamentKind::DoubleElim, numbered_teams(6));
        let mut rng = rand::SeedableRng::seed_from_u64(0);
        let set = generate(&cfg, &mut rng);

        // Top two seeds rest; upper round one has two matches over the
        // remaining four, mirrored.
        let r1 = &set.upper.rounds[0];
        assert_eq!(r1.matches.len(), 2);
        assert_eq!(r1.matches[0].team1, Some(cfg.teams[2].clone()));
        assert_eq!(r1.matches[0].team2, Some(cfg.teams[5].clone()));
        assert_eq!(r1.matches[1].team1, Some(cfg.teams[3].clone()));
        assert_eq!(r1.matches[1].team2, Some(cfg.teams[4].clone()));

        // Byes join in round two against the round-one winners.
        let r2 = &set.upper.rounds[1];
        assert_eq!(r2.matches.len(), 2);
        assert_eq!(r2.matches[0].team1, Some(cfg.teams[0].clone()));
        assert_eq!(
            r2.matches[0].placeholder2.to_string(),
            "Vencedor Cat-U-R1-J2"
        );
        assert_eq!(r2.matches[1].team1, Some(cfg.teams[1].clone()));
        assert_eq!(
            r2.matches[1].placeholder2.to_string(),
            "Vencedor Cat-U-R1-J1"
        );

        // Lower bracket interleaves dropped losers with survivors.
        let lower_ids: Vec<&str> = set
            .lower
            .matches()
            .map(|m| AsRef::<str>::as_ref(&m.id))
            .collect();
        assert_eq!(
            lower_ids,
            vec!["Cat-L-R1-J1", "Cat-L-R2-J1", "Cat-L-R3-J1", "Cat-L-R4-J1"]
        );
        let l2 = set.lower.rounds[1].matches.first().unwrap();
        assert_eq!(l2.placeholder1.to_string(), "Vencedor Cat-L-R1-J1");
        assert_eq!(l2.placeholder2.to_string(), "Perdedor Cat-U-R2-J2");
        let l3 = set.lower.rounds[2].matches.first().unwrap();
        assert_eq!(l3.placeholder1.to_string(), "Vencedor Cat-L-R2-J1");
        assert_eq!(l3.placeholder2.to_string(), "Perdedor Cat-U-R2-J1");

        // Grand final pairs the two bracket finalists.
        let gf = set.grand_final.matches.first().unwrap();
        assert_eq!(AsRef::<str>::as_ref(&gf.id), "Cat-GF-J1");
        assert_eq!(gf.placeholder1.to_string(), "Vencedor Cat-U-R3-J1");
        assert_eq!(gf.placeholder2.to_string(), "Vencedor Cat-L-R4-J1");

        // Every team loses at most twice: 2n - 2 matches including the
        // grand final.
        let total = set.upper.matches().count()
            + set.lower.matches().count()
            + set.grand_final.matches.len();
        assert_eq!(total, 2 * 6 - 2);
    }

    #[test]
    fn full_bracket_counts() {
        let set = build(8);
        assert_eq!(set.upper.matches().count(), 7);
        assert_eq!(set.lower.matches().count(), 6);
        assert_eq!(set.grand_final.matches.len(), 1);
    }

    #[test]
    fn two_teams_reduce_to_final_and_rematch() {
        let set = build(2);
        assert_eq!(set.upper.matches().count(), 1);
        assert_eq!(set.lower.matches().count(), 0);
        let gf = set.grand_final.matches.first().unwrap();
        assert_eq!(gf.placeholder1.to_string(), "Vencedor Cat-U-R1-J1");
        assert_eq!(gf.placeholder2.to_string(), "Perdedor Cat-U-R1-J1");
    }

    #[test]
    fn odd_rosters_always_leave_one_lower_finalist() {
        for teams in 2..=12 {
            let set = build(teams);
            let total = set.upper.matches().count()
                + set.lower.matches().count()
                + set.grand_final.matches.len();
            assert_eq!(total, 2 * teams - 2, "teams = {}", teams);
        }
    }
}
