//! Error types for stand scheduling.
//!
//! Configuration and data-shape problems are detected once, when a
//! [`StandData`](crate::data::StandData) or
//! [`Scheduler`](crate::anneal::Scheduler) is built. Nothing inside the
//! search loop can fail.

use thiserror::Error;

/// Caller-supplied parameters that cannot be scheduled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(
        "objective arrays disagree: {strategies} strategies, {weights} weights, \
         {names} names, {targets} targets"
    )]
    LengthMismatch {
        strategies: usize,
        weights: usize,
        names: usize,
        targets: usize,
    },

    #[error("objective count {objectives} does not match {variables} outcome variables")]
    ObjectiveCount { objectives: usize, variables: usize },

    #[error("variable '{variable}' uses evenflow_target without a target trajectory")]
    MissingTarget { variable: String },

    #[error("variable '{variable}' target has {found} periods, horizon is {expected}")]
    TargetLength {
        variable: String,
        expected: usize,
        found: usize,
    },

    #[error("variable '{variable}' target has non-finite value at period {period}")]
    NonFiniteTarget { variable: String, period: usize },

    #[error("variable '{variable}' has negative weight {weight}")]
    NegativeWeight { variable: String, weight: f64 },

    #[error("variable '{variable}' has non-finite weight {weight}")]
    NonFiniteWeight { variable: String, weight: f64 },

    #[error("temperatures must satisfy temp_max > temp_min > 0, got min={min} max={max}")]
    Temperature { min: f64, max: f64 },

    #[error("adjacency references unknown stand id {0}")]
    UnknownStand(u64),

    #[error("adjacency rule references variable {variable}, array has {variables}")]
    RuleVariable { variable: usize, variables: usize },

    #[error("adjacency penalty weight must be finite and non-negative, got {0}")]
    PenaltyWeight(f64),

    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("at least one run is required")]
    NoRuns,
}

/// Input arrays whose dimensions do not agree with each other.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataShapeError {
    #[error("outcome buffer has {found} values, shape {shape:?} needs {expected}")]
    BufferLength {
        shape: [usize; 4],
        expected: usize,
        found: usize,
    },

    #[error("nested outcome data is ragged at {axis} (expected {expected}, found {found})")]
    Ragged {
        axis: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{axis} lists {found} stands, outcome array has {expected}")]
    StandCount {
        axis: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("stand id {id} appears more than once in the axis map")]
    DuplicateStand { id: u64 },

    #[error("axis map lists {found} mgmt regimes, outcome array has {expected}")]
    MgmtCount { expected: usize, found: usize },

    #[error("stand {stand} has no feasible mgmt regime")]
    EmptyFeasibleSet { stand: usize },

    #[error("stand {stand} lists mgmt {mgmt}, array has {mgmts} regimes")]
    MgmtOutOfRange {
        stand: usize,
        mgmt: usize,
        mgmts: usize,
    },

    #[error("stand {stand} lists mgmt {mgmt} more than once")]
    DuplicateMgmt { stand: usize, mgmt: usize },
}

/// Main error type for scheduling operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("data shape error: {0}")]
    DataShape(#[from] DataShapeError),

    #[error("artifact store error: {0}")]
    Cache(String),
}

/// Result type alias for scheduling operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;
