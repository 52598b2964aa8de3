//! Archive of non-dominated feasible agents for multi-objective searches.

pub mod sorting;

use crate::fitness::Direction;
use crate::population::Agent;
use sorting::{crowding_distance, dominates, normalize};

/// Set of mutually non-dominated, feasible agents.
///
/// Insertion keeps the invariant: an agent that is infeasible, dominated by
/// a member or equal in reward to one is rejected, and members it dominates
/// are evicted. With a capacity, the most crowded member is dropped once
/// the set overflows.
#[derive(Debug, Clone)]
pub struct ParetoSet {
    directions: Vec<Direction>,
    members: Vec<Agent>,
    capacity: Option<usize>,
}

impl ParetoSet {
    pub fn new(directions: Vec<Direction>, capacity: Option<usize>) -> Self {
        Self {
            directions,
            members: Vec::new(),
            capacity,
        }
    }

    /// Offers an agent; returns whether it entered the set.
    pub fn insert(&mut self, agent: Agent) -> bool {
        if !agent.status.is_feasible() || agent.reward.iter().any(|r| !r.is_finite()) {
            return false;
        }
        let blocked = self.members.iter().any(|m| {
            m.reward == agent.reward || dominates(&m.reward, &agent.reward, &self.directions)
        });
        if blocked {
            return false;
        }
        let directions = &self.directions;
        self.members
            .retain(|m| !dominates(&agent.reward, &m.reward, directions));
        self.members.push(agent);
        self.truncate();
        true
    }

    /// Offers every member of `other`.
    pub fn merge(&mut self, other: ParetoSet) {
        for agent in other.members {
            self.insert(agent);
        }
    }

    fn truncate(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.members.len() > capacity.max(1) {
            let points = normalize(
                self.members.iter().map(|m| m.reward.as_slice()),
                &self.directions,
            );
            let crowding = crowding_distance(&points);
            let most_crowded = crowding
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i);
            match most_crowded {
                Some(i) => {
                    self.members.swap_remove(i);
                }
                None => break,
            }
        }
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn members(&self) -> &[Agent] {
        &self.members
    }

    pub fn into_members(self) -> Vec<Agent> {
        self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
