pub mod common;
pub mod inference;
pub mod model;
pub mod scenarios; // fixtures shared by the tests

/// Exports the main types for easy access
pub use common::{BayesError, EliminationHeuristic, EngineConfig, Result, ScenarioMaker, init_logging};
pub use inference::{Evidence, Query, StateRef, VariableElimination};
pub use model::{
    BayesianModel, Factor, NetworkDescription, NetworkStructure, TabularCpd, VarId, Variable,
    VariableRegistry,
};
