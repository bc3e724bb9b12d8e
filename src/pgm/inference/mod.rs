pub mod evidence;
pub mod ordering;
pub mod variable_elimination;

pub use evidence::{Evidence, Query, StateRef};
pub use variable_elimination::{VariableElimination, query};
