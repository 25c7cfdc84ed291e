//! Schedule-wide invariants over a mixed tournament.
//!
//! One run with groups, single and double elimination side by side,
//! split court windows and phase minimums; every hard constraint is
//! then checked over the resulting board.
use quadra_core::clock::{ClockTime, Minutes};
use quadra_core::config::{
    CategoryName, GlobalSettings, PhaseTimes, Seeding, TournamentConfig, TournamentKind,
};
use quadra_core::court::{Court, CourtName, CourtSlot};
use quadra_core::deps::DependencyGraph;
use quadra_core::fixture::{Assignment, MatchId};
use quadra_core::ops;
use quadra_core::schedule::CancelToken;
use quadra_core::state::Tournament;
use quadra_core::team::{Player, Team};
use std::collections::{BTreeMap, HashMap, HashSet};

fn at(h: u32, m: u32) -> ClockTime {
    ClockTime::new(h, m).unwrap()
}

fn teams(prefix: &str, count: usize) -> Vec<Team> {
    (0..count)
        .map(|i| {
            Team::try_new(format!("{} {}a", prefix, i + 1), format!("{} {}b", prefix, i + 1))
                .unwrap()
        })
        .collect()
}

fn mixed_tournament() -> Tournament {
    let mut tournament = Tournament::default();
    tournament.settings = GlobalSettings {
        start_time: at(8, 0),
        end_time: at(21, 0),
        estimated_match_duration: Minutes(20),
        courts: vec![
            Court::try_new(
                CourtName::from("Quadra Central"),
                1,
                vec![
                    CourtSlot::try_new(at(8, 0), at(12, 0)).unwrap(),
                    CourtSlot::try_new(at(13, 0), at(21, 0)).unwrap(),
                ],
            )
            .unwrap(),
            Court::try_new(
                CourtName::from("Quadra 2"),
                2,
                vec![CourtSlot::try_new(at(8, 0), at(19, 0)).unwrap()],
            )
            .unwrap(),
        ],
    };

    let mut groups = TournamentConfig {
        category: CategoryName::from("Feminino"),
        kind: TournamentKind::Groups,
        teams: teams("F", 12),
        group_count: 4,
        advance_per_group: 2,
        seeding: Seeding::Order,
        include_third_place: true,
        start_time: None,
        phase_start_times: PhaseTimes {
            quarters: None,
            semis: Some(at(15, 0)),
            finals: None,
        },
        priority: Some(1),
    };
    groups.phase_start_times.finals = Some(at(16, 0));
    ops::create_category(&mut tournament, groups, Some(3)).unwrap();

    let single = TournamentConfig {
        category: CategoryName::from("Masculino"),
        kind: TournamentKind::SingleElim,
        teams: teams("M", 8),
        group_count: 1,
        advance_per_group: 1,
        seeding: Seeding::Random,
        include_third_place: true,
        start_time: Some(at(9, 0)),
        phase_start_times: PhaseTimes::default(),
        priority: Some(2),
    };
    ops::create_category(&mut tournament, single, Some(3)).unwrap();

    let double = TournamentConfig {
        category: CategoryName::from("Aberto"),
        kind: TournamentKind::DoubleElim,
        teams: teams("D", 6),
        group_count: 1,
        advance_per_group: 1,
        seeding: Seeding::Order,
        include_third_place: false,
        start_time: None,
        phase_start_times: PhaseTimes::default(),
        priority: None,
    };
    ops::create_category(&mut tournament, double, Some(3)).unwrap();
    tournament
}

struct Board {
    tournament: Tournament,
    assignments: BTreeMap<MatchId, Assignment>,
    players: HashMap<MatchId, Vec<Player>>,
    duration: Minutes,
}

fn scheduled_board() -> Board {
    let mut tournament = mixed_tournament();
    let outcome = ops::reschedule_all(&mut tournament, &CancelToken::new()).unwrap();
    assert!(
        outcome.unplaced.is_empty(),
        "everything fits the day: {:?}",
        outcome.unplaced
    );
    let mut players = HashMap::new();
    for info in quadra_core::schedule::match_infos(&tournament) {
        players.insert(info.id.clone(), info.players.clone());
    }
    Board {
        assignments: tournament.assignments(),
        duration: tournament.settings.estimated_match_duration,
        tournament,
        players,
    }
}

#[test]
fn no_court_hosts_two_matches_at_once() {
    let board = scheduled_board();
    let mut seen: HashSet<(ClockTime, &CourtName)> = HashSet::new();
    for (id, assignment) in &board.assignments {
        assert!(
            seen.insert((assignment.time, &assignment.court)),
            "double booking at {} on {} (second: {})",
            assignment.time,
            assignment.court,
            id
        );
    }
}

#[test]
fn no_player_is_in_two_matches_at_once() {
    let board = scheduled_board();
    let mut on_court: HashMap<(ClockTime, &Player), &MatchId> = HashMap::new();
    for (id, assignment) in &board.assignments {
        for player in &board.players[id] {
            if let Some(other) = on_court.insert((assignment.time, player), id) {
                panic!(
                    "{} plays in {} and {} at {}",
                    player, other, id, assignment.time
                );
            }
        }
    }
}

#[test]
fn every_match_sits_inside_a_court_window() {
    let board = scheduled_board();
    for (id, assignment) in &board.assignments {
        let court = board
            .tournament
            .settings
            .court(&assignment.court)
            .unwrap_or_else(|| panic!("{} assigned to unknown court", id));
        assert!(
            court.fits(assignment.time, board.duration),
            "{} at {} does not fit a window of {}",
            id,
            assignment.time,
            assignment.court
        );
    }
}

#[test]
fn start_times_respect_global_category_and_phase() {
    let board = scheduled_board();
    for (name, category) in &board.tournament.categories {
        let category_start = category
            .form_values
            .start_time
            .unwrap_or(board.tournament.settings.start_time)
            .max(board.tournament.settings.start_time);
        for m in category.playoff_matches() {
            let Some(assignment) = board.assignments.get(&m.id) else {
                continue;
            };
            assert!(assignment.time >= category_start, "{} too early", m.id);
            if let Some(phase) = m.phase_start_time {
                assert!(assignment.time >= phase, "{} before its phase", m.id);
            }
        }
        for m in category.group_matches() {
            let assignment = &board.assignments[&m.id];
            assert!(
                assignment.time >= category_start,
                "{} before category {} start",
                m.id,
                name
            );
        }
    }
}

#[test]
fn dependencies_finish_before_dependents_start() {
    let board = scheduled_board();
    let graph = DependencyGraph::build(&board.tournament).unwrap();
    for (id, assignment) in &board.assignments {
        let Some(deps) = graph.of(id) else { continue };
        for dep in &deps.matches {
            let dep_end = board.assignments[dep].time.checked_add(board.duration).unwrap();
            assert!(
                dep_end <= assignment.time,
                "{} starts at {} before {} finishes at {}",
                id,
                assignment.time,
                dep,
                dep_end
            );
        }
        for group in &deps.groups {
            for member in graph.group_members(group) {
                let end = board.assignments[member]
                    .time
                    .checked_add(board.duration)
                    .unwrap();
                assert!(
                    end <= assignment.time,
                    "{} starts before group match {} finishes",
                    id,
                    member
                );
            }
        }
    }
}

#[test]
fn no_player_starts_three_matches_in_a_row() {
    let board = scheduled_board();
    let mut starts: HashMap<&Player, Vec<ClockTime>> = HashMap::new();
    for (id, assignment) in &board.assignments {
        for player in &board.players[id] {
            starts.entry(player).or_default().push(assignment.time);
        }
    }
    let step = board.duration;
    for (player, mut times) in starts {
        times.sort();
        for window in times.windows(3) {
            let consecutive = window[0].checked_add(step) == Some(window[1])
                && window[1].checked_add(step) == Some(window[2]);
            assert!(
                !consecutive,
                "{} starts at {}, {} and {}",
                player, window[0], window[1], window[2]
            );
        }
    }
}
