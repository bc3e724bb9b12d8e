use serde::{Deserialize, Serialize};

use super::errors::{BayesError, Result};

pub const DEFAULT_NORMALIZATION_TOLERANCE: f64 = 1e-6;
pub const DEFAULT_ZERO_MASS_EPSILON: f64 = 1e-12;

/// Greedy heuristic used to pick the next variable to sum out.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationHeuristic {
    /// Smallest product of cardinalities over the variable and its neighbours.
    #[default]
    MinWeight,
    /// Fewest neighbours in the interaction graph.
    MinNeighbors,
    /// Fewest fill-in edges added by eliminating the variable.
    MinFill,
    /// Fill-in edges weighted by the product of their endpoint cardinalities.
    WeightedMinFill,
}

/// Numeric tolerances and algorithm switches shared by model validation and inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Allowed deviation from 1.0 when checking CPD columns.
    pub normalization_tolerance: f64,
    /// Total mass at or below this is treated as zero.
    pub zero_mass_epsilon: f64,
    pub heuristic: EliminationHeuristic,
    /// Restrict each query to the ancestors of its targets and evidence.
    pub prune_barren_nodes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            normalization_tolerance: DEFAULT_NORMALIZATION_TOLERANCE,
            zero_mass_epsilon: DEFAULT_ZERO_MASS_EPSILON,
            heuristic: EliminationHeuristic::default(),
            prune_barren_nodes: true,
        }
    }
}

impl EngineConfig {
    pub fn with_heuristic(mut self, heuristic: EliminationHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_pruning(mut self, prune_barren_nodes: bool) -> Self {
        self.prune_barren_nodes = prune_barren_nodes;
        self
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| BayesError::InvalidConfig(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<()> {
        for (name, value) in [
            ("normalization_tolerance", self.normalization_tolerance),
            ("zero_mass_epsilon", self.zero_mass_epsilon),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BayesError::InvalidConfig(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
