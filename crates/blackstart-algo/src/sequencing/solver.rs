//! Solver boundary
//!
//! [`SolverAdapter`] is the only seam between the formulation and a concrete
//! MILP engine. [`GoodLpAdapter`] maps a [`MilpModel`] onto `good_lp` and runs
//! it with the backend selected in [`SolverConfig`].

use std::fmt;
use std::str::FromStr;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use good_lp::{
    constraint, variable, Constraint, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable, WithTimeLimit,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use web_time::Instant;

use super::model::{LinearConstraint, MilpModel, Relation, VarKind};

/// Termination status reported by a solver adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal solution
    Optimal,
    /// Integer-feasible incumbent, optimality not proven (e.g. time limit reached)
    Feasible,
    Infeasible,
    Unbounded,
    /// Solver failure, timeout, or unavailable backend
    SolverError,
}

impl SolveStatus {
    /// Whether the status carries a usable assignment
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Feasible => write!(f, "feasible"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::SolverError => write!(f, "solver_error"),
        }
    }
}

/// Unprocessed solver output. One value per model variable, in model order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    pub status: SolveStatus,
    /// Empty unless `status.has_solution()`
    pub values: Vec<f64>,
    pub objective: Option<f64>,
    pub solve_time: Duration,
    /// Verbatim message from the backend
    pub message: String,
}

impl RawSolution {
    pub fn failed(status: SolveStatus, message: impl Into<String>, solve_time: Duration) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: None,
            solve_time,
            message: message.into(),
        }
    }
}

/// Available MILP backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
    /// Pure-Rust branch and bound
    #[default]
    MicroLp,
    /// HiGHS (native)
    Highs,
}

impl SolverBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverBackend::MicroLp => "microlp",
            SolverBackend::Highs => "highs",
        }
    }

    /// Whether the backend was compiled into this build
    pub fn is_available(&self) -> bool {
        match self {
            SolverBackend::MicroLp => cfg!(feature = "solver-microlp"),
            SolverBackend::Highs => cfg!(feature = "solver-highs"),
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "microlp" => Ok(SolverBackend::MicroLp),
            "highs" => Ok(SolverBackend::Highs),
            other => Err(format!(
                "unknown solver backend '{}' (expected microlp or highs)",
                other
            )),
        }
    }
}

/// Extra wall-clock time granted beyond the backend's own limit before the
/// caller stops waiting for the worker thread.
pub const SOLVE_GRACE: Duration = Duration::from_secs(2);

/// Per-call solver settings
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Wall-clock limit for a single solve, passed to the backend
    pub time_limit: Option<Duration>,
    /// Relative MIP gap tolerance
    pub mip_gap: f64,
    /// Whether to enable verbose solver output
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::default(),
            time_limit: Some(Duration::from_secs(60)),
            mip_gap: 1e-4,
            verbose: false,
        }
    }
}

/// A MILP engine behind a narrow, object-safe interface.
pub trait SolverAdapter: Send + Sync {
    /// Unique identifier (e.g., "good_lp")
    fn id(&self) -> &str;

    /// Solve `model`. Failures are reported through [`RawSolution::status`].
    fn solve(&self, model: &MilpModel, config: &SolverConfig) -> RawSolution;
}

/// Adapter running models through `good_lp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpAdapter;

impl SolverAdapter for GoodLpAdapter {
    fn id(&self) -> &str {
        "good_lp"
    }

    fn solve(&self, model: &MilpModel, config: &SolverConfig) -> RawSolution {
        if !config.backend.is_available() {
            return RawSolution::failed(
                SolveStatus::SolverError,
                format!(
                    "solver backend '{}' is not compiled into this build",
                    config.backend
                ),
                Duration::ZERO,
            );
        }

        debug!(
            backend = %config.backend,
            variables = model.num_variables(),
            constraints = model.constraints.len(),
            "starting MILP solve"
        );
        let start = Instant::now();
        let shared = Arc::new(model.clone());
        let job_config = config.clone();
        let wait = config.time_limit.map(|limit| limit + SOLVE_GRACE);
        let received = run_with_deadline(wait, move || solve_with_backend(&shared, &job_config));
        let solve_time = start.elapsed();

        match received {
            Err(message) => {
                warn!(backend = %config.backend, ?solve_time, %message, "solver did not report back");
                RawSolution::failed(SolveStatus::SolverError, message, solve_time)
            }
            Ok(Ok((values, reported))) => {
                let status = status_from_backend(reported);
                if status == SolveStatus::Feasible {
                    warn!(backend = %config.backend, ?solve_time, "solver stopped at its time limit");
                }
                RawSolution {
                    status,
                    objective: Some(model.objective_value(&values)),
                    values,
                    solve_time,
                    message: status.to_string(),
                }
            }
            Ok(Err(err)) => {
                let status = match err {
                    ResolutionError::Infeasible => SolveStatus::Infeasible,
                    ResolutionError::Unbounded => SolveStatus::Unbounded,
                    _ => SolveStatus::SolverError,
                };
                RawSolution::failed(status, err.to_string(), solve_time)
            }
        }
    }
}

/// Run `job` on a worker thread and wait at most `wait` for its result.
///
/// The worker cannot be cancelled; after a timeout it finishes in the
/// background and its result is dropped.
fn run_with_deadline<T, F>(wait: Option<Duration>, job: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("milp-solve".to_string())
        .spawn(move || {
            // Receiver is gone when the caller stopped waiting.
            let _ = tx.send(job());
        })
        .map_err(|err| format!("failed to spawn solver thread: {}", err))?;

    match wait {
        Some(wait) => rx.recv_timeout(wait).map_err(|err| match err {
            mpsc::RecvTimeoutError::Timeout => "time limit exceeded".to_string(),
            mpsc::RecvTimeoutError::Disconnected => "solver thread panicked".to_string(),
        }),
        None => rx
            .recv()
            .map_err(|_| "solver thread panicked".to_string()),
    }
}

/// A gap-limited incumbent is optimal within the configured tolerance; a
/// time-limited one is only feasible.
fn status_from_backend(status: SolutionStatus) -> SolveStatus {
    match status {
        SolutionStatus::Optimal | SolutionStatus::GapLimit => SolveStatus::Optimal,
        SolutionStatus::TimeLimit => SolveStatus::Feasible,
    }
}

fn solve_with_backend(
    model: &MilpModel,
    config: &SolverConfig,
) -> Result<(Vec<f64>, SolutionStatus), ResolutionError> {
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = model
        .variables
        .iter()
        .map(|def| {
            let mut definition = variable().name(def.name.clone()).min(def.lower).max(def.upper);
            if def.kind == VarKind::Binary {
                definition = definition.integer();
            }
            vars.add(definition)
        })
        .collect();
    let objective: Expression = model
        .objective
        .iter()
        .map(|&(var, coef)| coef * handles[var])
        .sum();

    match config.backend {
        #[cfg(feature = "solver-microlp")]
        SolverBackend::MicroLp => {
            let mut problem = vars
                .minimise(objective)
                .using(good_lp::solvers::microlp::microlp);
            if let Some(limit) = config.time_limit {
                problem = problem.with_time_limit(limit.as_secs_f64());
            }
            finish(problem, model, &handles)
        }
        #[cfg(feature = "solver-highs")]
        SolverBackend::Highs => {
            let mut problem = vars
                .minimise(objective)
                .using(good_lp::solvers::highs::highs)
                .set_option("mip_rel_gap", config.mip_gap);
            problem.set_verbose(config.verbose);
            if let Some(limit) = config.time_limit {
                problem = problem.with_time_limit(limit.as_secs_f64());
            }
            finish(problem, model, &handles)
        }
        #[allow(unreachable_patterns)]
        other => Err(ResolutionError::Str(format!(
            "solver backend '{}' is not compiled into this build",
            other
        ))),
    }
}

fn finish<M>(
    mut problem: M,
    model: &MilpModel,
    handles: &[Variable],
) -> Result<(Vec<f64>, SolutionStatus), ResolutionError>
where
    M: SolverModel<Error = ResolutionError>,
{
    for c in &model.constraints {
        problem = problem.with(to_constraint(c, handles));
    }
    let solution = problem.solve()?;
    let values = handles.iter().map(|&var| solution.value(var)).collect();
    Ok((values, solution.status()))
}

fn to_constraint(c: &LinearConstraint, handles: &[Variable]) -> Constraint {
    let lhs: Expression = c
        .terms
        .iter()
        .map(|&(var, coef)| coef * handles[var])
        .sum();
    let rhs = c.rhs;
    match c.relation {
        Relation::LessEq => constraint!(lhs <= rhs),
        Relation::GreaterEq => constraint!(lhs >= rhs),
        Relation::Equal => constraint!(lhs == rhs),
    }
}
