//! # Dependency graph
//!
//! Placeholders double as scheduling dependencies: a match fed by
//! `Vencedor X` cannot start before `X` has finished, and a slot fed by
//! a group position cannot start before every match of that group has
//! finished. This module extracts those edges once, validates that they
//! point at matches that exist and that the graph is acyclic, and hands
//! the scheduler a cheap lookup structure.
//!
//! Group matches themselves have no dependencies.
use crate::fixture::MatchId;
use crate::group::GroupId;
use crate::placeholder::Placeholder;
use crate::state::Tournament;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Prerequisites of a single match.
#[derive(Debug, Clone, Default)]
pub struct MatchDependencies {
    /// Matches that must have finished.
    pub matches: Vec<MatchId>,
    /// Groups whose every match must have finished.
    pub groups: Vec<GroupId>,
}

impl MatchDependencies {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.groups.is_empty()
    }
}

/// The tournament's full dependency structure.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    deps: BTreeMap<MatchId, MatchDependencies>,
    group_members: BTreeMap<GroupId, Vec<MatchId>>,
}

impl DependencyGraph {
    /// Extract and validate the graph for the whole document.
    ///
    /// # Errors
    ///
    /// Errors when a placeholder references a match or group that does
    /// not exist, or when the edges form a cycle. Brackets produced by
    /// the generator never trip either check; hand-edited documents
    /// can.
    pub fn build(tournament: &Tournament) -> Result<Self, DepsError> {
        let mut deps: BTreeMap<MatchId, MatchDependencies> = BTreeMap::new();
        let mut group_members: BTreeMap<GroupId, Vec<MatchId>> = BTreeMap::new();

        for (name, category) in &tournament.categories {
            for group in category.groups() {
                let id = GroupId::new(name.clone(), group.key);
                let members: Vec<MatchId> = group.match_ids().cloned().collect();
                for member in &members {
                    deps.insert(member.clone(), MatchDependencies::default());
                }
                group_members.insert(id, members);
            }
            for m in category.playoff_matches() {
                let mut entry = MatchDependencies::default();
                for placeholder in [&m.placeholder1, &m.placeholder2] {
                    match placeholder {
                        Placeholder::WinnerOf(dep) | Placeholder::LoserOf(dep) => {
                            entry.matches.push(dep.clone());
                        }
                        Placeholder::GroupRank(group, _) => {
                            entry.groups.push(group.clone());
                        }
                        Placeholder::Literal(_) => {}
                    }
                }
                deps.insert(m.id.clone(), entry);
            }
        }

        let graph = Self {
            deps,
            group_members,
        };
        graph.validate()?;
        Ok(graph)
    }

    fn validate(&self) -> Result<(), DepsError> {
        let mut petgraph: DiGraph<&MatchId, ()> = DiGraph::new();
        let mut nodes: HashMap<&MatchId, NodeIndex> = HashMap::new();
        for id in self.deps.keys() {
            nodes.insert(id, petgraph.add_node(id));
        }

        for (id, entry) in &self.deps {
            for dep in &entry.matches {
                if !self.deps.contains_key(dep) {
                    return Err(DepsError::UnknownMatch {
                        referenced: dep.clone(),
                        by: id.clone(),
                    });
                }
                petgraph.add_edge(nodes[dep], nodes[id], ());
            }
            for group in &entry.groups {
                let members = self
                    .group_members
                    .get(group)
                    .ok_or_else(|| DepsError::UnknownGroup {
                        referenced: group.clone(),
                        by: id.clone(),
                    })?;
                for member in members {
                    petgraph.add_edge(nodes[member], nodes[id], ());
                }
            }
        }

        if is_cyclic_directed(&petgraph) {
            return Err(DepsError::Cycle);
        }
        Ok(())
    }

    pub fn of(&self, id: &MatchId) -> Option<&MatchDependencies> {
        self.deps.get(id)
    }

    pub fn group_members(&self, group: &GroupId) -> &[MatchId] {
        self.group_members
            .get(group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DepsError {
    #[error("match '{by}' depends on unknown match '{referenced}'")]
    UnknownMatch { referenced: MatchId, by: MatchId },
    #[error("match '{by}' depends on unknown group '{referenced}'")]
    UnknownGroup { referenced: GroupId, by: MatchId },
    #[error("match dependencies form a cycle")]
    Cycle,
}
