//! # Standings evaluator
//!
//! Standings are recomputed from the recorded scores whenever they are
//! needed. A match counts once both scores are present; the ranking is
//! wins first, then set difference, then sets won, and anything still
//! tied keeps the roster order (the sort is stable).
use crate::fixture::Side;
use crate::group::Group;
use crate::team::Team;
use serde::Serialize;
use std::collections::HashMap;

/// One team's line in the group table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub team: Team,
    pub played: u32,
    pub wins: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub set_difference: i32,
}

impl Standing {
    fn new(team: Team) -> Self {
        Standing {
            team,
            played: 0,
            wins: 0,
            sets_won: 0,
            sets_lost: 0,
            set_difference: 0,
        }
    }

    fn record(&mut self, won: bool, sets_won: u32, sets_lost: u32) {
        self.played += 1;
        if won {
            self.wins += 1;
        }
        self.sets_won += sets_won;
        self.sets_lost += sets_lost;
        self.set_difference = self.sets_won as i32 - self.sets_lost as i32;
    }
}

/// Rank a group from its played matches.
///
/// Teams without a played match keep zeroed stats. The returned order
/// is the qualification order: index 0 is the group winner.
pub fn standings(group: &Group) -> Vec<Standing> {
    // Roster order seeds the table so that the stable sort leaves
    // fully-tied teams in their pre-existing order.
    let mut table: Vec<Standing> = group
        .teams
        .iter()
        .cloned()
        .map(Standing::new)
        .collect();
    let index: HashMap<&Team, usize> = group
        .teams
        .iter()
        .zip(0..)
        .map(|(team, i)| (team, i))
        .collect();

    for game in &group.matches {
        let score = match game.score() {
            Some(score) => score,
            None => continue,
        };
        let winner = score.winning_side();
        for (team, sets_won, sets_lost, side) in [
            (&game.team1, score.score1, score.score2, Side::Team1),
            (&game.team2, score.score2, score.score1, Side::Team2),
        ] {
            if let Some(&i) = index.get(team) {
                table[i].record(winner == Some(side), sets_won, sets_lost);
            }
        }
    }

    table.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.set_difference.cmp(&a.set_difference))
            .then(b.sets_won.cmp(&a.sets_won))
    });
    table
}

/// Team at a 1-based qualification position, available only once the
/// group is finished (positions are frozen at that moment).
pub fn qualifier(group: &Group, position: u32) -> Option<Team> {
    if !group.is_finished() {
        return None;
    }
    standings(group)
        .into_iter()
        .nth(position.checked_sub(1)? as usize)
        .map(|standing| standing.team)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::MatchId;
    use crate::group::{GroupKey, GroupMatch};

    fn team(n: usize) -> Team {
        Team::try_new(format!("P{}a", n), format!("P{}b", n)).unwrap()
    }

    fn played(i: u32, t1: usize, t2: usize, s1: u32, s2: u32) -> GroupMatch {
        let mut game = GroupMatch::new(
            MatchId::from(format!("Cat-GroupA-Jogo{}", i)),
            team(t1),
            team(t2),
        );
        game.score1 = Some(s1);
        game.score2 = Some(s2);
        game
    }

    fn group(matches: Vec<GroupMatch>, teams: usize) -> Group {
        Group {
            key: GroupKey::from_index(0).unwrap(),
            teams: (0..teams).map(team).collect(),
            matches,
        }
    }

    #[test]
    fn closed_form_totals() {
        // 0 beats 1 2x0, 1 beats 2 2x1, 2 beats 0 2x1.
        let g = group(
            vec![
                played(1, 0, 1, 2, 0),
                played(2, 1, 2, 2, 1),
                played(3, 2, 0, 2, 1),
            ],
            3,
        );
        let table = standings(&g);
        for line in &table {
            assert_eq!(line.played, 2);
            assert_eq!(line.wins, 1);
            assert_eq!(
                line.set_difference,
                line.sets_won as i32 - line.sets_lost as i32
            );
        }
        // All tied on one win, so set difference decides:
        // +1 for team 0, 0 for team 2, -1 for team 1.
        let order: Vec<Team> = table.into_iter().map(|l| l.team).collect();
        assert_eq!(order, vec![team(0), team(2), team(1)]);
    }

    #[test]
    fn wins_dominate_set_difference() {
        // Team 0 wins both games narrowly, team 1 crushes its one win.
        let g = group(
            vec![
                played(1, 0, 1, 2, 1),
                played(2, 0, 2, 2, 1),
                played(3, 1, 2, 2, 0),
            ],
            3,
        );
        let table = standings(&g);
        assert_eq!(table[0].team, team(0));
        assert_eq!(table[0].wins, 2);
        assert_eq!(table[1].team, team(1));
    }

    #[test]
    fn full_tie_keeps_roster_order() {
        let g = group(vec![], 4);
        let table = standings(&g);
        let order: Vec<Team> = table.into_iter().map(|l| l.team).collect();
        assert_eq!(order, (0..4).map(team).collect::<Vec<_>>());
    }

    #[test]
    fn qualifier_positions_need_a_finished_group() {
        let mut g = group(vec![played(1, 0, 1, 2, 0)], 2);
        assert_eq!(qualifier(&g, 1), Some(team(0)));
        assert_eq!(qualifier(&g, 2), Some(team(1)));
        g.matches.push(GroupMatch::new(
            MatchId::from("Cat-GroupA-Jogo2"),
            team(0),
            team(1),
        ));
        assert_eq!(qualifier(&g, 1), None);
    }
}
