use anyhow::Result;

use crate::pgm::model::bayesian_model::BayesianModel;

/// A named recipe for a ready-to-query network.
pub trait ScenarioMaker {
    fn name(&self) -> &str;

    /// Builds the network and returns it validated.
    fn build_model(&self) -> Result<BayesianModel>;
}
