use thiserror::Error;

/// Every failure the network core can report.
///
/// Construction errors surface while variables, factors and CPDs are built,
/// structural errors surface from `BayesianModel::validate`, and query errors
/// surface per call to the inference engine without invalidating the model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BayesError {
    #[error("variable '{0}' is already defined")]
    DuplicateVariable(String),

    #[error("variable '{name}' needs at least 2 distinct states, got {distinct}")]
    InvalidCardinality { name: String, distinct: usize },

    #[error("variable '{variable}' lists state '{state}' more than once")]
    DuplicateState { variable: String, state: String },

    #[error("shape mismatch for {context}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid entry {value} at flat index {index} in {context}")]
    NegativeValue {
        context: String,
        index: usize,
        value: f64,
    },

    #[error("CPD for '{variable}' sums to {sum} for parent assignment [{assignment}]")]
    UnnormalizedCpd {
        variable: String,
        assignment: String,
        sum: f64,
    },

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("unknown state '{state}' for variable '{variable}'")]
    UnknownState { variable: String, state: String },

    #[error("edge {parent} -> {child} would create a directed cycle")]
    CycleDetected { parent: String, child: String },

    #[error("no CPD defined for variable '{0}'")]
    MissingCpd(String),

    #[error("more than one CPD defined for variable '{0}'")]
    DuplicateCpd(String),

    #[error("CPD for '{variable}' has parents {cpd:?} but the structure has {structure:?}")]
    ParentMismatch {
        variable: String,
        structure: Vec<String>,
        cpd: Vec<String>,
    },

    #[error("CPD states for '{variable}' are {cpd:?} but the registry has {registry:?}")]
    StateMismatch {
        variable: String,
        registry: Vec<String>,
        cpd: Vec<String>,
    },

    #[error("factors disagree on the states of '{variable}': {left:?} vs {right:?}")]
    ConflictingVariable {
        variable: String,
        left: Vec<String>,
        right: Vec<String>,
    },

    #[error("variable '{variable}' is not in the scope of factor [{scope}]")]
    VariableNotInScope { variable: String, scope: String },

    #[error("model has not been validated")]
    ModelNotValidated,

    #[error("factor has zero probability mass: {0}")]
    ZeroMassFactor(String),

    #[error("query has no target variables")]
    EmptyQuery,

    #[error("variable '{0}' is both a query target and observed evidence")]
    EvidenceOverlapsTarget(String),

    #[error("invalid elimination order: {0}")]
    InvalidEliminationOrder(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BayesError>;
