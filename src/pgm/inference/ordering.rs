use log::trace;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::pgm::common::config::EliminationHeuristic;
use crate::pgm::model::variable::VarId;

/// Undirected graph linking variables that share a factor.
///
/// Eliminating a variable connects all of its neighbours, which mirrors the
/// scope of the factor produced by summing it out.
#[derive(Clone, Debug, Default)]
pub struct InteractionGraph {
    neighbors: BTreeMap<VarId, BTreeSet<VarId>>,
    cardinalities: BTreeMap<VarId, usize>,
}

impl InteractionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clique over one factor scope, given as `(id, cardinality)` pairs.
    pub fn add_scope(&mut self, scope: &[(VarId, usize)]) {
        for &(id, cardinality) in scope {
            self.cardinalities.insert(id, cardinality);
            let entry = self.neighbors.entry(id).or_default();
            entry.extend(scope.iter().map(|(other, _)| *other).filter(|o| *o != id));
        }
    }

    pub fn contains(&self, id: VarId) -> bool {
        self.neighbors.contains_key(&id)
    }

    pub fn neighbors(&self, id: VarId) -> BTreeSet<VarId> {
        self.neighbors.get(&id).cloned().unwrap_or_default()
    }

    fn cardinality(&self, id: VarId) -> u128 {
        self.cardinalities.get(&id).copied().unwrap_or(1) as u128
    }

    fn adjacent(&self, a: VarId, b: VarId) -> bool {
        self.neighbors.get(&a).is_some_and(|n| n.contains(&b))
    }

    /// Pairs of neighbours of `id` that are not yet connected.
    fn missing_edges(&self, id: VarId) -> Vec<(VarId, VarId)> {
        let around: Vec<VarId> = self.neighbors(id).into_iter().collect();
        let mut missing = Vec::new();
        for (i, a) in around.iter().enumerate() {
            for b in &around[i + 1..] {
                if !self.adjacent(*a, *b) {
                    missing.push((*a, *b));
                }
            }
        }
        missing
    }

    pub fn cost(&self, id: VarId, heuristic: EliminationHeuristic) -> u128 {
        match heuristic {
            EliminationHeuristic::MinWeight => self
                .neighbors(id)
                .into_iter()
                .fold(self.cardinality(id), |acc, n| {
                    acc.saturating_mul(self.cardinality(n))
                }),
            EliminationHeuristic::MinNeighbors => self.neighbors(id).len() as u128,
            EliminationHeuristic::MinFill => self.missing_edges(id).len() as u128,
            EliminationHeuristic::WeightedMinFill => self
                .missing_edges(id)
                .into_iter()
                .fold(0u128, |acc, (a, b)| {
                    acc.saturating_add(self.cardinality(a).saturating_mul(self.cardinality(b)))
                }),
        }
    }

    /// Removes `id`, connecting its former neighbours pairwise. Returns them.
    pub fn eliminate(&mut self, id: VarId) -> BTreeSet<VarId> {
        let around = self.neighbors.remove(&id).unwrap_or_default();
        for n in &around {
            if let Some(set) = self.neighbors.get_mut(n) {
                set.remove(&id);
                set.extend(around.iter().copied().filter(|o| o != n));
            }
        }
        around
    }
}

/// Greedy elimination order over `candidates`.
///
/// Each step removes the candidate with the lowest cost; equal costs go to the
/// smallest `VarId`, i.e. the earliest declared variable.
pub fn greedy_order(
    mut graph: InteractionGraph,
    candidates: &BTreeSet<VarId>,
    heuristic: EliminationHeuristic,
) -> Vec<VarId> {
    let mut queue: PriorityQueue<VarId, Reverse<(u128, VarId)>> = PriorityQueue::new();
    for &id in candidates {
        queue.push(id, Reverse((graph.cost(id, heuristic), id)));
    }
    let mut order = Vec::with_capacity(candidates.len());
    while let Some((id, Reverse((cost, _)))) = queue.pop() {
        trace!("greedy_order - {:?} with cost {}", id, cost);
        order.push(id);
        let around = graph.eliminate(id);
        let mut affected = around.clone();
        if matches!(
            heuristic,
            EliminationHeuristic::MinFill | EliminationHeuristic::WeightedMinFill
        ) {
            for n in &around {
                affected.extend(graph.neighbors(*n));
            }
        }
        for n in affected {
            let cost = graph.cost(n, heuristic);
            queue.change_priority(&n, Reverse((cost, n)));
        }
    }
    order
}

/// Largest neighbourhood met while eliminating in `order`: the induced width.
pub fn induced_width(mut graph: InteractionGraph, order: &[VarId]) -> usize {
    order
        .iter()
        .map(|id| graph.eliminate(*id).len())
        .max()
        .unwrap_or(0)
}
