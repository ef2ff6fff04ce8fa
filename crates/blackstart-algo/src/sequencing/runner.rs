//! One scenario, one optimization run

use std::fmt;
use std::sync::Arc;

use blackstart_core::{Scenario, ScenarioValidationError};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::diagnose::{diagnose, static_diagnosis};
use super::error::{InfeasibleScenarioError, RunError, SolverError};
use super::extract::extract_schedule;
use super::model::{build_model, MilpModel, SequencingOptions};
use super::schedule::Schedule;
use super::solver::{SolveStatus, SolverAdapter, SolverConfig};

/// Lifecycle of a [`ScenarioRunner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Built,
    Solving,
    Solved,
    Infeasible,
    Error,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Built => "built",
            RunState::Solving => "solving",
            RunState::Solved => "solved",
            RunState::Infeasible => "infeasible",
            RunState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Typed result of a completed run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Solved(Schedule),
    Infeasible(InfeasibleScenarioError),
}

impl RunOutcome {
    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            RunOutcome::Solved(schedule) => Some(schedule),
            RunOutcome::Infeasible(_) => None,
        }
    }
}

/// Drives `Built → Solving → {Solved, Infeasible, Error}` for a single scenario.
///
/// A runner is single-use. Parallel studies use one runner per scenario.
pub struct ScenarioRunner {
    scenario: Scenario,
    options: SequencingOptions,
    adapter: Arc<dyn SolverAdapter>,
    config: SolverConfig,
    model: MilpModel,
    state: RunState,
}

impl ScenarioRunner {
    /// Build the model; the runner starts in [`RunState::Built`]
    pub fn new(
        scenario: Scenario,
        options: SequencingOptions,
        adapter: Arc<dyn SolverAdapter>,
        config: SolverConfig,
    ) -> Result<Self, ScenarioValidationError> {
        let model = build_model(&scenario, &options)?;
        Ok(Self {
            scenario,
            options,
            adapter,
            config,
            model,
            state: RunState::Built,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn model(&self) -> &MilpModel {
        &self.model
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn run(&mut self) -> Result<RunOutcome, RunError> {
        if self.state != RunState::Built {
            return Err(RunError::InvalidState { found: self.state });
        }
        self.transition(RunState::Solving);

        let raw = self.adapter.solve(&self.model, &self.config);
        info!(
            adapter = self.adapter.id(),
            status = %raw.status,
            solve_time = ?raw.solve_time,
            "solver finished"
        );

        match raw.status {
            SolveStatus::Optimal | SolveStatus::Feasible => {
                match extract_schedule(&self.scenario, &self.model, &raw, self.options.tolerance)
                {
                    Ok(schedule) => {
                        self.transition(RunState::Solved);
                        Ok(RunOutcome::Solved(schedule))
                    }
                    Err(err) => {
                        self.transition(RunState::Error);
                        Err(err.into())
                    }
                }
            }
            SolveStatus::Infeasible => {
                let diagnostic = if self.options.diagnose {
                    diagnose(
                        &self.scenario,
                        &self.model,
                        &self.options,
                        self.adapter.as_ref(),
                        &self.config,
                    )
                } else {
                    static_diagnosis(&self.scenario, &self.options)
                };
                self.transition(RunState::Infeasible);
                Ok(RunOutcome::Infeasible(InfeasibleScenarioError { diagnostic }))
            }
            SolveStatus::Unbounded | SolveStatus::SolverError => {
                error!(status = %raw.status, message = %raw.message, "solver failed");
                self.transition(RunState::Error);
                Err(SolverError {
                    status: raw.status,
                    message: raw.message,
                }
                .into())
            }
        }
    }

    fn transition(&mut self, next: RunState) {
        info!(from = %self.state, to = %next, "runner state change");
        self.state = next;
    }
}
