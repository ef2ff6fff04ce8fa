//! Blackstart Block-Loading Sequencing
//!
//! Decides which demand blocks to energize in which period of a restoration
//! horizon, given generator capacity, ramp limits, startup delays and block
//! priorities.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BLOCK-LOADING SEQUENCING                                                │
//! │  ────────────────────────                                                │
//! │                                                                          │
//! │  Given:                                                                  │
//! │    • Generators with capacity, ramp rate and startup period             │
//! │    • Load blocks with demand, priority and pickup window                │
//! │    • A discrete time horizon                                            │
//! │                                                                          │
//! │  Decide:                                                                 │
//! │    • When each block is energized (binary, monotone in time)            │
//! │    • Generator dispatch (continuous) and commitment (binary)            │
//! │                                                                          │
//! │  Minimize:                                                               │
//! │    Priority-weighted restoration delay (+ weighted operating cost)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Scenario ──build_model──> MilpModel ──SolverAdapter──> RawSolution
//!          ──extract_schedule──> Schedule
//! ```
//!
//! [`ScenarioRunner`] drives the pipeline and turns infeasibility into a typed
//! outcome carrying an [`InfeasibilityDiagnostic`].
//!
//! ## Minimum Stable Output
//!
//! For units with a non-zero minimum, output is linked to a commitment binary
//! with big-M equal to capacity:
//!
//! ```text
//! min_stable_g · on[g,t] ≤ dispatch[g,t] ≤ capacity_g · on[g,t]
//! ```

mod diagnose;
mod error;
mod extract;
mod model;
mod runner;
mod schedule;
mod solver;
mod validation;

pub use diagnose::{
    diagnose, static_checks, static_diagnosis, DiagnosticFinding, InfeasibilityDiagnostic,
};
pub use error::{ExtractionInconsistencyError, InfeasibleScenarioError, RunError, SolverError};
pub use extract::extract_schedule;
pub use model::{
    build_model, ConstraintClass, LinearConstraint, MilpModel, ModelIndex, Relation,
    SequencingOptions, VarDef, VarKind,
};
pub use runner::{RunOutcome, RunState, ScenarioRunner};
pub use schedule::{PeriodSnapshot, Schedule};
pub use solver::{
    GoodLpAdapter, RawSolution, SolveStatus, SolverAdapter, SolverBackend, SolverConfig,
    SOLVE_GRACE,
};
pub use validation::{check_invariants, InvariantKind, InvariantViolation};
