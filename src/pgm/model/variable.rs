use log::trace;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::pgm::common::errors::{BayesError, Result};

/// Stable handle for a variable: its position in declaration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

/// A discrete random variable with labelled states.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variable {
    name: String,
    states: Vec<String>,
}

impl Variable {
    fn new(name: &str, states: &[&str]) -> Result<Self> {
        let distinct: HashSet<&str> = states.iter().copied().collect();
        if distinct.len() < 2 {
            return Err(BayesError::InvalidCardinality {
                name: name.to_string(),
                distinct: distinct.len(),
            });
        }
        if distinct.len() != states.len() {
            let mut seen = HashSet::new();
            for state in states {
                if !seen.insert(*state) {
                    return Err(BayesError::DuplicateState {
                        variable: name.to_string(),
                        state: state.to_string(),
                    });
                }
            }
        }
        Ok(Variable {
            name: name.to_string(),
            states: states.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn cardinality(&self) -> usize {
        self.states.len()
    }

    pub fn state_index(&self, label: &str) -> Result<usize> {
        self.states
            .iter()
            .position(|s| s == label)
            .ok_or_else(|| BayesError::UnknownState {
                variable: self.name.clone(),
                state: label.to_string(),
            })
    }

    pub fn state_label(&self, index: usize) -> Result<&str> {
        self.states
            .get(index)
            .map(|s| s.as_str())
            .ok_or_else(|| BayesError::UnknownState {
                variable: self.name.clone(),
                state: index.to_string(),
            })
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Arena of variables. Lookups by name stay valid for the registry's lifetime.
#[derive(Clone, Debug, Default)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
    index: HashMap<String, VarId>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_variable(&mut self, name: &str, states: &[&str]) -> Result<Variable> {
        trace!("VariableRegistry::define_variable - {} {:?}", name, states);
        if self.index.contains_key(name) {
            return Err(BayesError::DuplicateVariable(name.to_string()));
        }
        let variable = Variable::new(name, states)?;
        let id = VarId(self.variables.len());
        self.index.insert(name.to_string(), id);
        self.variables.push(variable.clone());
        Ok(variable)
    }

    pub fn define_binary(&mut self, name: &str, first: &str, second: &str) -> Result<Variable> {
        self.define_variable(name, &[first, second])
    }

    pub fn id_of(&self, name: &str) -> Result<VarId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| BayesError::UnknownVariable(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<&Variable> {
        let id = self.id_of(name)?;
        Ok(&self.variables[id.0])
    }

    pub fn by_id(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables.iter().enumerate().map(|(i, v)| (VarId(i), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = VariableRegistry::new();
        registry.define_binary("Threat", "Internal", "External").unwrap();
        let err = registry.define_binary("Threat", "A", "B").unwrap_err();
        assert_eq!(err, BayesError::DuplicateVariable("Threat".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn cardinality_counts_distinct_labels() {
        let mut registry = VariableRegistry::new();
        let err = registry.define_variable("X", &["a", "a"]).unwrap_err();
        assert!(matches!(err, BayesError::InvalidCardinality { distinct: 1, .. }));
        let err = registry.define_variable("Y", &["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, BayesError::DuplicateState { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_follow_declaration_order() {
        let mut registry = VariableRegistry::new();
        registry.define_binary("B", "y", "n").unwrap();
        registry.define_variable("A", &["lo", "mid", "hi"]).unwrap();
        assert_eq!(registry.id_of("B").unwrap(), VarId(0));
        assert_eq!(registry.id_of("A").unwrap(), VarId(1));
        assert_eq!(registry.get("A").unwrap().state_index("hi").unwrap(), 2);
        assert!(registry.get("A").unwrap().state_label(3).is_err());
    }
}
