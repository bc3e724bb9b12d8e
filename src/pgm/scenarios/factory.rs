use anyhow::{Result, anyhow};
use std::rc::Rc;

use crate::pgm::common::interface::ScenarioMaker;

use super::{data_breach::DataBreach, exploit_chain::ExploitChain, random_network::RandomNetwork};

pub struct ScenarioMakerFactory;

impl ScenarioMakerFactory {
    pub const NAMES: [&'static str; 3] = ["data_breach", "exploit_chain", "random_network"];

    pub fn new_shared(namespace: &str) -> Result<Rc<dyn ScenarioMaker>> {
        match namespace {
            "data_breach" => Ok(Rc::new(DataBreach {})),
            "exploit_chain" => Ok(Rc::new(ExploitChain {})),
            "random_network" => Ok(Rc::new(RandomNetwork::default())),
            _ => Err(anyhow!("Unknown ScenarioMaker type: {}", namespace)),
        }
    }
}
