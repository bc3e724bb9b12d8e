use anyhow::{Context, Result};

use crate::pgm::common::interface::ScenarioMaker;
use crate::pgm::model::bayesian_model::BayesianModel;
use crate::pgm::model::description::NetworkDescription;

const EXPLOIT_CHAIN: &str = r#"{
    "variables": [
        {"name": "Vulnerability", "states": ["High", "Low"]},
        {"name": "ThreatActor", "states": ["Sophisticated", "Opportunistic"]},
        {"name": "Exploit", "states": ["Successful", "Failed"]},
        {"name": "SecurityControls", "states": ["Effective", "Ineffective"]},
        {"name": "DataBreach", "states": ["Yes", "No"]}
    ],
    "edges": [
        ["Vulnerability", "Exploit"],
        ["ThreatActor", "Exploit"],
        ["Exploit", "DataBreach"],
        ["SecurityControls", "DataBreach"]
    ],
    "cpds": [
        {"variable": "Vulnerability", "values": [[0.6], [0.4]]},
        {"variable": "ThreatActor", "values": [[0.7], [0.3]]},
        {
            "variable": "Exploit",
            "parents": ["Vulnerability", "ThreatActor"],
            "values": [[0.9, 0.7, 0.6, 0.3], [0.1, 0.3, 0.4, 0.7]]
        },
        {"variable": "SecurityControls", "values": [[0.75], [0.25]]},
        {
            "variable": "DataBreach",
            "parents": ["Exploit", "SecurityControls"],
            "values": [[0.95, 0.65, 0.7, 0.3], [0.05, 0.35, 0.3, 0.7]]
        }
    ]
}"#;

/// Two-stage attack: an exploit attempt, then a breach gated by security controls.
pub struct ExploitChain {}

impl ExploitChain {
    pub fn description() -> Result<NetworkDescription> {
        NetworkDescription::from_json_str(EXPLOIT_CHAIN)
    }
}

impl ScenarioMaker for ExploitChain {
    fn name(&self) -> &str {
        "exploit_chain"
    }

    fn build_model(&self) -> Result<BayesianModel> {
        Self::description()?
            .build()
            .context("Failed to build the exploit_chain scenario")
    }
}
