use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::pgm::common::errors::{BayesError, Result};
use crate::pgm::model::bayesian_model::BayesianModel;
use crate::pgm::model::variable::VarId;

/// An observed state, by position or by label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateRef {
    Index(usize),
    Label(String),
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateRef::Index(i) => write!(f, "#{}", i),
            StateRef::Label(l) => write!(f, "{}", l),
        }
    }
}

/// Observed variables for a single query. Never stored in a model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Evidence {
    observations: BTreeMap<String, StateRef>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, variable: &str, label: &str) -> Self {
        self.observe(variable, StateRef::Label(label.to_string()));
        self
    }

    pub fn with_index(mut self, variable: &str, index: usize) -> Self {
        self.observe(variable, StateRef::Index(index));
        self
    }

    /// Records an observation, returning the one it replaced.
    pub fn observe(&mut self, variable: &str, state: StateRef) -> Option<StateRef> {
        self.observations.insert(variable.to_string(), state)
    }

    pub fn get(&self, variable: &str) -> Option<&StateRef> {
        self.observations.get(variable)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.observations.contains_key(variable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.observations.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Maps every observation onto model ids and state indices.
    pub fn resolve(&self, model: &BayesianModel) -> Result<BTreeMap<VarId, usize>> {
        let mut resolved = BTreeMap::new();
        for (name, state) in &self.observations {
            let id = model.id_of(name)?;
            let variable = model.registry().by_id(id);
            let index = match state {
                StateRef::Label(label) => variable.state_index(label)?,
                StateRef::Index(index) => {
                    if *index >= variable.cardinality() {
                        return Err(BayesError::UnknownState {
                            variable: name.clone(),
                            state: state.to_string(),
                        });
                    }
                    *index
                }
            };
            resolved.insert(id, index);
        }
        Ok(resolved)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Evidence {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut evidence = Evidence::new();
        for (variable, label) in iter {
            evidence.observe(variable, StateRef::Label(label.to_string()));
        }
        evidence
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .observations
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Target variables plus the evidence they are conditioned on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub targets: Vec<String>,
    #[serde(default)]
    pub evidence: Evidence,
}

impl Query {
    pub fn new(targets: &[&str]) -> Self {
        Query {
            targets: targets.iter().map(|t| t.to_string()).collect(),
            evidence: Evidence::new(),
        }
    }

    pub fn given(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.as_str()).collect()
    }
}
