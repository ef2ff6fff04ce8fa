use thiserror::Error;

use super::diagnose::InfeasibilityDiagnostic;
use super::runner::RunState;
use super::solver::SolveStatus;

/// The scenario admits no schedule satisfying every constraint.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("scenario is infeasible: {}", .diagnostic.reason)]
pub struct InfeasibleScenarioError {
    pub diagnostic: InfeasibilityDiagnostic,
}

/// The backend failed without proving feasibility or infeasibility.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("solver returned {status}: {message}")]
pub struct SolverError {
    pub status: SolveStatus,
    pub message: String,
}

/// Solver output that does not form a valid schedule
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionInconsistencyError {
    #[error("solution has {found} values but the model has {expected} variables")]
    LengthMismatch { expected: usize, found: usize },

    #[error("binary variable {variable} has fractional value {value}")]
    FractionalBinary { variable: String, value: f64 },

    #[error("pickup of {block} drops from {before} at period {period} to {after}")]
    NonMonotonicPickup {
        block: String,
        period: usize,
        before: f64,
        after: f64,
    },

    #[error("dispatch variable {variable} is negative ({value})")]
    NegativeDispatch { variable: String, value: f64 },
}

/// Failure of a [`ScenarioRunner`](super::runner::ScenarioRunner) run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("inconsistent solver output: {0}")]
    Extraction(#[from] ExtractionInconsistencyError),

    #[error("run() called in state {found}; only a freshly built runner can be run")]
    InvalidState { found: RunState },
}
