use anyhow::{Context, Result};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::pgm::common::interface::ScenarioMaker;
use crate::pgm::model::bayesian_model::BayesianModel;
use crate::pgm::model::cpd::TabularCpd;
use crate::pgm::model::structure::NetworkStructure;
use crate::pgm::model::variable::{Variable, VariableRegistry};

/// Seeded random DAG with random CPDs.
///
/// Variables are named `X0, X1, ...` and only ever take parents with a lower
/// index, so the graph is acyclic by construction. The same seed always
/// produces the same network.
pub struct RandomNetwork {
    pub seed: u64,
    pub variables: usize,
    pub max_parents: usize,
    pub max_states: usize,
    /// Chance that an earlier variable is offered as a parent.
    pub edge_probability: f64,
}

impl Default for RandomNetwork {
    fn default() -> Self {
        RandomNetwork {
            seed: 42,
            variables: 7,
            max_parents: 3,
            max_states: 3,
            edge_probability: 0.4,
        }
    }
}

impl RandomNetwork {
    pub fn new(seed: u64, variables: usize) -> Self {
        RandomNetwork {
            seed,
            variables,
            ..Self::default()
        }
    }

    fn random_column(rng: &mut StdRng, size: usize) -> Vec<f64> {
        let weights: Vec<f64> = (0..size).map(|_| rng.gen_range(0.05..1.0)).collect();
        let total: f64 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    }
}

impl ScenarioMaker for RandomNetwork {
    fn name(&self) -> &str {
        "random_network"
    }

    fn build_model(&self) -> Result<BayesianModel> {
        trace!(
            "RandomNetwork::build_model - Start: seed {}, {} variables",
            self.seed, self.variables
        );
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut registry = VariableRegistry::new();
        let mut variables: Vec<Variable> = Vec::with_capacity(self.variables);
        for i in 0..self.variables {
            let cardinality = rng.gen_range(2..=self.max_states.max(2));
            let states: Vec<String> = (0..cardinality).map(|s| format!("s{}", s)).collect();
            let states: Vec<&str> = states.iter().map(|s| s.as_str()).collect();
            variables.push(registry.define_variable(&format!("X{}", i), &states)?);
        }

        let mut parent_lists: Vec<Vec<usize>> = Vec::with_capacity(self.variables);
        for child in 0..self.variables {
            let mut parents = Vec::new();
            for candidate in 0..child {
                if parents.len() < self.max_parents && rng.r#gen::<f64>() < self.edge_probability {
                    parents.push(candidate);
                }
            }
            parent_lists.push(parents);
        }

        let mut structure = NetworkStructure::new(registry);
        for (child, parents) in parent_lists.iter().enumerate() {
            for parent in parents {
                structure.add_edge(variables[*parent].name(), variables[child].name())?;
            }
        }
        debug!(
            "RandomNetwork::build_model - {} edges",
            structure.edge_count()
        );

        let mut cpds = Vec::with_capacity(self.variables);
        for (child, parents) in parent_lists.iter().enumerate() {
            let child_variable = &variables[child];
            let parent_variables: Vec<&Variable> = parents.iter().map(|p| &variables[*p]).collect();
            let columns: usize = parent_variables.iter().map(|p| p.cardinality()).product();
            let mut rows = vec![Vec::with_capacity(columns); child_variable.cardinality()];
            for _ in 0..columns {
                let column = Self::random_column(&mut rng, child_variable.cardinality());
                for (row, value) in rows.iter_mut().zip(column) {
                    row.push(value);
                }
            }
            let cpd = TabularCpd::new(child_variable, &parent_variables, rows)
                .with_context(|| format!("Failed to build random CPD for '{}'", child_variable.name()))?;
            cpds.push(cpd);
        }

        let model = BayesianModel::build(structure, cpds)?.validate()?;
        trace!("RandomNetwork::build_model - End");
        Ok(model)
    }
}
