pub mod pgm;

pub use pgm::{
    BayesError, BayesianModel, EliminationHeuristic, EngineConfig, Evidence, Factor,
    NetworkDescription, NetworkStructure, Query, TabularCpd, VariableElimination,
    VariableRegistry, init_logging,
};
