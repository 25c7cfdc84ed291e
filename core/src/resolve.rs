//! # Placeholder resolution
//!
//! Fills unresolved playoff slots from what is known: winners and
//! losers of decided playoff matches, and qualifier positions of
//! finished groups. Resolution iterates to a fixpoint because filling
//! one slot can decide another match's winner; chains through a
//! bracket are short, so the pass count is capped rather than tracked.
//!
//! A resolved slot is never overwritten. Slots that stay unresolved
//! after the cap are simply left for a later call; that is the normal
//! state of a bracket in progress, not an error.
use crate::group::standings;
use crate::placeholder::Placeholder;
use crate::state::{Category, Tournament};
use crate::team::Team;
use std::collections::HashMap;

/// Enough for the longest dependency chain any generated bracket has.
const MAX_PASSES: usize = 10;

/// Resolve every category, returning the number of slots filled.
pub fn resolve_all(tournament: &mut Tournament) -> usize {
    tournament
        .categories
        .values_mut()
        .map(resolve_category)
        .sum()
}

/// Iterate one category to its resolution fixpoint.
pub fn resolve_category(category: &mut Category) -> usize {
    let mut filled_total = 0;
    for _ in 0..MAX_PASSES {
        let filled = resolve_pass(category);
        if filled == 0 {
            break;
        }
        filled_total += filled;
    }
    filled_total
}

fn resolve_pass(category: &mut Category) -> usize {
    let category_name = category.form_values.category.clone();

    // Qualifier positions freeze when a group finishes.
    let mut qualifiers: HashMap<(char, u32), Team> = HashMap::new();
    for group in category.groups() {
        if !group.is_finished() {
            continue;
        }
        for (i, standing) in standings(group).into_iter().enumerate() {
            qualifiers.insert((group.key.letter(), i as u32 + 1), standing.team);
        }
    }

    let mut winners: HashMap<String, Team> = HashMap::new();
    let mut losers: HashMap<String, Team> = HashMap::new();
    for m in category.playoff_matches() {
        if let (Some(winner), Some(loser)) = (m.winner(), m.loser()) {
            winners.insert(m.id.to_string(), winner.clone());
            losers.insert(m.id.to_string(), loser.clone());
        }
    }

    let mut filled = 0;
    let playoffs = match category.playoffs.as_mut() {
        Some(playoffs) => playoffs,
        None => return 0,
    };
    for m in playoffs.matches_mut() {
        for (team, placeholder) in [
            (&mut m.team1, &m.placeholder1),
            (&mut m.team2, &m.placeholder2),
        ] {
            if team.is_some() {
                continue;
            }
            let resolved = match placeholder {
                Placeholder::Literal(literal) => Some(literal.clone()),
                Placeholder::WinnerOf(id) => winners.get::<str>(id.as_ref()).cloned(),
                Placeholder::LoserOf(id) => losers.get::<str>(id.as_ref()).cloned(),
                Placeholder::GroupRank(group, position) => {
                    if group.category == category_name {
                        qualifiers.get(&(group.key.letter(), *position)).cloned()
                    } else {
                        None
                    }
                }
            };
            if let Some(resolved) = resolved {
                *team = Some(resolved);
                filled += 1;
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket;
    use crate::config::mock_data::{config, numbered_teams};
    use crate::config::TournamentKind;
    use crate::fixture::MatchId;
    use crate::state::TournamentData;

    fn category(kind: TournamentKind, teams: usize) -> Category {
        let mut cfg = config("Cat", kind, numbered_teams(teams));
        if let TournamentKind::Groups = kind {
            cfg.group_count = 2;
            cfg.advance_per_group = 1;
        }
        let data = bracket::generate(&cfg, Some(0)).unwrap();
        Category {
            form_values: cfg,
            tournament_data: data.groups.map(|groups| TournamentData { groups }),
            playoffs: data.playoffs,
            total_matches: data.total_matches,
        }
    }

    fn record(category: &mut Category, id: &str, score1: u32, score2: u32) {
        let id = MatchId::from(id);
        let playoffs = category.playoffs.as_mut().unwrap();
        let m = playoffs.matches_mut().find(|m| m.id == id).unwrap();
        m.score1 = Some(score1);
        m.score2 = Some(score2);
    }

    #[test]
    fn winners_flow_into_the_next_round() {
        let mut cat = category(TournamentKind::SingleElim, 4);
        let semi1_team1 = cat
            .playoff_matches()
            .find(|m| AsRef::<str>::as_ref(&m.id) == "Cat-Semifinal-Jogo1")
            .unwrap()
            .team1
            .clone()
            .unwrap();
        record(&mut cat, "Cat-Semifinal-Jogo1", 2, 0);
        assert_eq!(resolve_category(&mut cat), 1);
        let final_match = cat
            .playoff_matches()
            .find(|m| AsRef::<str>::as_ref(&m.id) == "Cat-Final-Jogo1")
            .unwrap();
        assert_eq!(final_match.team1, Some(semi1_team1));
        assert_eq!(final_match.team2, None);
    }

    #[test]
    fn chained_results_resolve_in_one_call() {
        // Scores for the whole bracket before any resolution; the
        // fixpoint must ripple winners through semis and final alike.
        let mut cat = category(TournamentKind::SingleElim, 4);
        record(&mut cat, "Cat-Semifinal-Jogo1", 2, 0);
        record(&mut cat, "Cat-Semifinal-Jogo2", 0, 2);
        assert_eq!(resolve_category(&mut cat), 2);
        let final_match = cat
            .playoff_matches()
            .find(|m| AsRef::<str>::as_ref(&m.id) == "Cat-Final-Jogo1")
            .unwrap();
        assert!(final_match.team1.is_some() && final_match.team2.is_some());
    }

    #[test]
    fn group_qualifiers_fill_on_completion() {
        let mut cat = category(TournamentKind::Groups, 6);
        // Decide every group match; lower-index teams win throughout.
        let results: Vec<(MatchId, bool)> = cat
            .groups()
            .flat_map(|g| g.matches.iter())
            .map(|m| (m.id.clone(), m.team1 < m.team2))
            .collect();
        for (id, team1_wins) in results {
            for group in cat.groups_mut() {
                if let Some(m) = group.matches.iter_mut().find(|m| m.id == id) {
                    m.score1 = Some(if team1_wins { 2 } else { 0 });
                    m.score2 = Some(if team1_wins { 0 } else { 2 });
                }
            }
        }
        assert_eq!(resolve_category(&mut cat), 2);
        let final_match = cat
            .playoff_matches()
            .find(|m| AsRef::<str>::as_ref(&m.id) == "Cat-Final-Jogo1")
            .unwrap();
        assert!(final_match.team1.is_some() && final_match.team2.is_some());
    }

    #[test]
    fn unfinished_group_resolves_nothing() {
        let mut cat = category(TournamentKind::Groups, 6);
        let first = cat.groups().next().unwrap().matches[0].id.clone();
        for group in cat.groups_mut() {
            if let Some(m) = group.matches.iter_mut().find(|m| m.id == first) {
                m.score1 = Some(2);
                m.score2 = Some(0);
            }
        }
        assert_eq!(resolve_category(&mut cat), 0);
    }

    #[test]
    fn resolution_never_overwrites() {
        let mut cat = category(TournamentKind::SingleElim, 4);
        record(&mut cat, "Cat-Semifinal-Jogo1", 2, 0);
        resolve_category(&mut cat);
        // Correct the score the other way; the already-resolved final
        // slot must stay as it was.
        let before = cat
            .playoff_matches()
            .find(|m| AsRef::<str>::as_ref(&m.id) == "Cat-Final-Jogo1")
            .unwrap()
            .team1
            .clone();
        record(&mut cat, "Cat-Semifinal-Jogo1", 0, 2);
        resolve_category(&mut cat);
        let after = cat
            .playoff_matches()
            .find(|m| AsRef::<str>::as_ref(&m.id) == "Cat-Final-Jogo1")
            .unwrap()
            .team1
            .clone();
        assert_eq!(before, after);
    }
}
