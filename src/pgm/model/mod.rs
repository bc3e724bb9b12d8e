pub mod bayesian_model;
pub mod cpd;
pub mod description;
pub mod factor;
pub mod structure;
pub mod variable;

pub use bayesian_model::BayesianModel;
pub use cpd::TabularCpd;
pub use description::{CpdDescription, NetworkDescription, VariableDescription};
pub use factor::Factor;
pub use structure::NetworkStructure;
pub use variable::{VarId, Variable, VariableRegistry};
