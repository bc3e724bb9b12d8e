pub mod config;
pub mod errors;
pub mod interface;
pub mod logging;

pub use config::{EliminationHeuristic, EngineConfig};
pub use errors::{BayesError, Result};
pub use interface::ScenarioMaker;
pub use logging::init_logging;
