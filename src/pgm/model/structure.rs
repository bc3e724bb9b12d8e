use log::{debug, trace};
use std::collections::BTreeSet;

use crate::pgm::common::errors::{BayesError, Result};

use super::variable::{VarId, Variable, VariableRegistry};

/// Directed acyclic graph over the variables of a registry.
///
/// Parent and child relations are kept as index sets keyed by `VarId`, so
/// every traversal comes back in declaration order.
#[derive(Clone, Debug)]
pub struct NetworkStructure {
    registry: VariableRegistry,
    parents: Vec<BTreeSet<VarId>>,
    children: Vec<BTreeSet<VarId>>,
}

impl NetworkStructure {
    pub fn new(registry: VariableRegistry) -> Self {
        let size = registry.len();
        NetworkStructure {
            registry,
            parents: vec![BTreeSet::new(); size],
            children: vec![BTreeSet::new(); size],
        }
    }

    pub fn from_edges(registry: VariableRegistry, edges: &[(&str, &str)]) -> Result<Self> {
        let mut structure = Self::new(registry);
        for (parent, child) in edges {
            structure.add_edge(parent, child)?;
        }
        Ok(structure)
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// Adds `parent -> child`. Re-adding an existing edge is a no-op; an edge
    /// that would close a cycle is rejected and leaves the graph untouched.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<()> {
        let p = self.registry.id_of(parent)?;
        let c = self.registry.id_of(child)?;
        if self.parents[c.0].contains(&p) {
            return Ok(());
        }
        if p == c || self.reaches(c, p) {
            debug!("NetworkStructure::add_edge - rejected {} -> {}", parent, child);
            return Err(BayesError::CycleDetected {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }
        trace!("NetworkStructure::add_edge - {} -> {}", parent, child);
        self.parents[c.0].insert(p);
        self.children[p.0].insert(c);
        Ok(())
    }

    fn reaches(&self, from: VarId, to: VarId) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if seen.insert(node) {
                stack.extend(self.children[node.0].iter().copied());
            }
        }
        false
    }

    pub fn has_path(&self, from: &str, to: &str) -> Result<bool> {
        let from = self.registry.id_of(from)?;
        let to = self.registry.id_of(to)?;
        Ok(self.reaches(from, to))
    }

    pub fn parent_ids(&self, id: VarId) -> &BTreeSet<VarId> {
        &self.parents[id.0]
    }

    pub fn child_ids(&self, id: VarId) -> &BTreeSet<VarId> {
        &self.children[id.0]
    }

    fn resolve(&self, ids: impl IntoIterator<Item = VarId>) -> Vec<&Variable> {
        ids.into_iter().map(|id| self.registry.by_id(id)).collect()
    }

    pub fn parents_of(&self, name: &str) -> Result<Vec<&Variable>> {
        let id = self.registry.id_of(name)?;
        Ok(self.resolve(self.parents[id.0].iter().copied()))
    }

    pub fn children_of(&self, name: &str) -> Result<Vec<&Variable>> {
        let id = self.registry.id_of(name)?;
        Ok(self.resolve(self.children[id.0].iter().copied()))
    }

    /// All edges as `(parent, child)`, ordered by parent then child.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.registry
            .iter()
            .flat_map(|(id, parent)| {
                self.children[id.0]
                    .iter()
                    .map(move |c| (parent.name(), self.registry.by_id(*c).name()))
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.parents.iter().map(|p| p.len()).sum()
    }

    pub fn roots(&self) -> Vec<&Variable> {
        self.registry
            .iter()
            .filter(|(id, _)| self.parents[id.0].is_empty())
            .map(|(_, v)| v)
            .collect()
    }

    pub fn leaves(&self) -> Vec<&Variable> {
        self.registry
            .iter()
            .filter(|(id, _)| self.children[id.0].is_empty())
            .map(|(_, v)| v)
            .collect()
    }

    /// The given nodes together with all of their ancestors.
    pub fn ancestral_set(&self, ids: impl IntoIterator<Item = VarId>) -> BTreeSet<VarId> {
        let mut result = BTreeSet::new();
        let mut stack: Vec<VarId> = ids.into_iter().collect();
        while let Some(node) = stack.pop() {
            if result.insert(node) {
                stack.extend(self.parents[node.0].iter().copied());
            }
        }
        result
    }

    pub fn ancestors_of(&self, names: &[&str]) -> Result<Vec<&Variable>> {
        let ids = names
            .iter()
            .map(|n| self.registry.id_of(n))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.resolve(self.ancestral_set(ids)))
    }

    /// Parents first; among ready nodes the earliest declared goes first.
    pub fn topological_order(&self) -> Result<Vec<VarId>> {
        let mut remaining: Vec<usize> = self.parents.iter().map(|p| p.len()).collect();
        let mut ready: BTreeSet<VarId> = self
            .registry
            .iter()
            .filter(|(id, _)| remaining[id.0] == 0)
            .map(|(id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(self.registry.len());
        while let Some(node) = ready.pop_first() {
            order.push(node);
            for child in &self.children[node.0] {
                remaining[child.0] -= 1;
                if remaining[child.0] == 0 {
                    ready.insert(*child);
                }
            }
        }
        if order.len() < self.registry.len() {
            let stuck = self
                .registry
                .iter()
                .map(|(id, _)| id)
                .find(|id| remaining[id.0] > 0);
            if let Some(child) = stuck {
                let parent = self.parents[child.0]
                    .iter()
                    .find(|p| !order.contains(p))
                    .copied()
                    .unwrap_or(child);
                return Err(BayesError::CycleDetected {
                    parent: self.registry.by_id(parent).name().to_string(),
                    child: self.registry.by_id(child).name().to_string(),
                });
            }
        }
        Ok(order)
    }

    /// Parents, children and the children's other parents.
    pub fn markov_blanket(&self, name: &str) -> Result<Vec<&Variable>> {
        let id = self.registry.id_of(name)?;
        let mut blanket: BTreeSet<VarId> = self.parents[id.0].clone();
        for child in &self.children[id.0] {
            blanket.insert(*child);
            blanket.extend(self.parents[child.0].iter().copied());
        }
        blanket.remove(&id);
        Ok(self.resolve(blanket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> VariableRegistry {
        let mut registry = VariableRegistry::new();
        for name in names {
            registry.define_binary(name, "t", "f").unwrap();
        }
        registry
    }

    fn names(vars: Vec<&Variable>) -> Vec<&str> {
        vars.into_iter().map(|v| v.name()).collect()
    }

    #[test]
    fn rejected_edge_leaves_graph_untouched() {
        let mut structure =
            NetworkStructure::from_edges(registry(&["A", "B", "C"]), &[("A", "B"), ("B", "C")])
                .unwrap();
        let err = structure.add_edge("C", "A").unwrap_err();
        assert_eq!(
            err,
            BayesError::CycleDetected {
                parent: "C".to_string(),
                child: "A".to_string()
            }
        );
        assert!(matches!(structure.add_edge("B", "B"), Err(BayesError::CycleDetected { .. })));
        assert_eq!(structure.edges(), vec![("A", "B"), ("B", "C")]);
        assert!(structure.parents_of("A").unwrap().is_empty());
        assert!(structure.children_of("C").unwrap().is_empty());
    }

    #[test]
    fn unknown_endpoints_are_rejected() {
        let mut structure = NetworkStructure::new(registry(&["A"]));
        assert_eq!(
            structure.add_edge("A", "Z").unwrap_err(),
            BayesError::UnknownVariable("Z".to_string())
        );
        assert_eq!(structure.edge_count(), 0);
    }

    #[test]
    fn traversals_are_declaration_ordered() {
        let structure = NetworkStructure::from_edges(
            registry(&["D", "C", "B", "A", "E"]),
            &[("A", "D"), ("B", "D"), ("C", "D"), ("D", "E"), ("A", "E")],
        )
        .unwrap();
        assert_eq!(names(structure.parents_of("D").unwrap()), vec!["C", "B", "A"]);
        let order: Vec<&str> = structure
            .topological_order()
            .unwrap()
            .into_iter()
            .map(|id| structure.registry().by_id(id).name())
            .collect();
        assert_eq!(order, vec!["C", "B", "A", "D", "E"]);
        assert_eq!(names(structure.roots()), vec!["C", "B", "A"]);
        assert_eq!(names(structure.leaves()), vec!["E"]);
        assert_eq!(names(structure.markov_blanket("B").unwrap()), vec!["D", "C", "A"]);
        assert_eq!(names(structure.ancestors_of(&["D"]).unwrap()), vec!["D", "C", "B", "A"]);
        assert!(structure.has_path("B", "E").unwrap());
        assert!(!structure.has_path("E", "B").unwrap());
    }
}
