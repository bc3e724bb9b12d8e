use anyhow::Result;
use log::trace;

use crate::pgm::common::interface::ScenarioMaker;
use crate::pgm::model::bayesian_model::BayesianModel;
use crate::pgm::model::cpd::TabularCpd;
use crate::pgm::model::structure::NetworkStructure;
use crate::pgm::model::variable::VariableRegistry;

/// Cyber-risk network: security measures drive system vulnerability, which
/// together with the kind of external threat drives the chance of a breach.
pub struct DataBreach {}

impl ScenarioMaker for DataBreach {
    fn name(&self) -> &str {
        "data_breach"
    }

    fn build_model(&self) -> Result<BayesianModel> {
        trace!("DataBreach::build_model - Start");
        let mut registry = VariableRegistry::new();
        let threat = registry.define_binary("ExternalThreat", "Internal", "External")?;
        let measures = registry.define_binary("SecurityMeasures", "Strong", "Weak")?;
        let vulnerability = registry.define_binary("SystemVulnerability", "High", "Low")?;
        let breach = registry.define_binary("DataBreach", "Yes", "No")?;

        let structure = NetworkStructure::from_edges(
            registry,
            &[
                ("ExternalThreat", "DataBreach"),
                ("SystemVulnerability", "DataBreach"),
                ("SecurityMeasures", "SystemVulnerability"),
            ],
        )?;

        let cpds = vec![
            TabularCpd::prior(&threat, &[0.5, 0.5])?,
            TabularCpd::prior(&measures, &[0.7, 0.3])?,
            TabularCpd::new(
                &vulnerability,
                &[&measures],
                vec![vec![0.1, 0.9], vec![0.9, 0.1]],
            )?,
            TabularCpd::new(
                &breach,
                &[&vulnerability, &threat],
                vec![vec![0.01, 0.1, 0.4, 0.9], vec![0.99, 0.9, 0.6, 0.1]],
            )?,
        ];

        let model = BayesianModel::build(structure, cpds)?.validate()?;
        trace!("DataBreach::build_model - End");
        Ok(model)
    }
}
