pub mod data_breach;
pub mod exploit_chain;
pub mod factory;
pub mod random_network;

pub use factory::ScenarioMakerFactory;
