use anyhow::{Context, Result};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::pgm::common::config::EngineConfig;
use crate::pgm::common::errors;

use super::bayesian_model::BayesianModel;
use super::cpd::TabularCpd;
use super::structure::NetworkStructure;
use super::variable::{Variable, VariableRegistry};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDescription {
    pub name: String,
    pub states: Vec<String>,
}

/// A CPD in pgmpy layout: `values[child_state][parent_column]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CpdDescription {
    pub variable: String,
    #[serde(default)]
    pub parents: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CpdDescription {
    fn to_cpd(&self, registry: &VariableRegistry, tolerance: f64) -> errors::Result<TabularCpd> {
        let child = registry.get(&self.variable)?;
        let parents = self
            .parents
            .iter()
            .map(|p| registry.get(p))
            .collect::<errors::Result<Vec<&Variable>>>()?;
        TabularCpd::with_tolerance(child, &parents, self.values.clone(), tolerance)
    }
}

/// Plain-data form of a network, e.g.
///
/// ```json
/// {
///   "variables": [{"name": "Rain", "states": ["yes", "no"]}],
///   "edges": [],
///   "cpds": [{"variable": "Rain", "values": [[0.2], [0.8]]}]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescription {
    pub variables: Vec<VariableDescription>,
    #[serde(default)]
    pub edges: Vec<(String, String)>,
    pub cpds: Vec<CpdDescription>,
}

impl NetworkDescription {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse network description")
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize network description")
    }

    /// Builds and validates the model with default tolerances.
    pub fn build(&self) -> Result<BayesianModel> {
        self.build_with(&EngineConfig::default())
    }

    pub fn build_with(&self, config: &EngineConfig) -> Result<BayesianModel> {
        trace!(
            "NetworkDescription::build - Start: {} variables, {} edges, {} cpds",
            self.variables.len(),
            self.edges.len(),
            self.cpds.len()
        );
        let mut registry = VariableRegistry::new();
        for variable in &self.variables {
            let states: Vec<&str> = variable.states.iter().map(|s| s.as_str()).collect();
            registry
                .define_variable(&variable.name, &states)
                .with_context(|| format!("Failed to define variable '{}'", variable.name))?;
        }

        let mut structure = NetworkStructure::new(registry);
        for (parent, child) in &self.edges {
            structure
                .add_edge(parent, child)
                .with_context(|| format!("Failed to add edge {} -> {}", parent, child))?;
        }

        let mut cpds = Vec::with_capacity(self.cpds.len());
        for cpd in &self.cpds {
            let built = cpd
                .to_cpd(structure.registry(), config.normalization_tolerance)
                .with_context(|| format!("Failed to build CPD for '{}'", cpd.variable))?;
            cpds.push(built);
        }

        let model = BayesianModel::build(structure, cpds).context("Failed to attach CPDs")?;
        let model = model
            .validate_with(config)
            .context("Network description failed validation")?;
        debug!("NetworkDescription::build - validated {} variables", model.len());
        Ok(model)
    }

    /// Describes an existing model, CPD parents in CPD column order.
    pub fn from_model(model: &BayesianModel) -> Self {
        let variables = model
            .variables()
            .map(|v| VariableDescription {
                name: v.name().to_string(),
                states: v.states().to_vec(),
            })
            .collect();
        let edges = model
            .structure()
            .edges()
            .into_iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        let cpds = model
            .cpds()
            .map(|cpd| CpdDescription {
                variable: cpd.child_variable().name().to_string(),
                parents: cpd
                    .parent_variables()
                    .iter()
                    .map(|p| p.name().to_string())
                    .collect(),
                values: cpd.rows(),
            })
            .collect();
        NetworkDescription {
            variables,
            edges,
            cpds,
        }
    }
}
