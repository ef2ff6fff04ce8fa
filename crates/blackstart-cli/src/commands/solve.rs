//! `blackstart solve`

use anyhow::{anyhow, Context, Result};
use blackstart_algo::{
    GoodLpAdapter, RunOutcome, ScenarioRunner, Schedule, SolverBackend,
};
use blackstart_cli::BlackstartConfig;
use blackstart_core::Scenario;
use blackstart_scenarios::{load_scenario_file, resolve_scenario};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<SolverBackend>,
    pub time_limit: Option<f64>,
    pub cost_weight: Option<f64>,
    pub allow_partial: bool,
    pub no_diagnose: bool,
}

/// Schedule output with block and generator names resolved
#[derive(Debug, Serialize)]
struct ScheduleOutput {
    scenario_id: Option<String>,
    status: String,
    objective: f64,
    solve_time_seconds: f64,
    energization: BTreeMap<String, Option<usize>>,
    periods: Vec<PeriodOutput>,
}

#[derive(Debug, Serialize)]
struct PeriodOutput {
    period: usize,
    blocks_energized: Vec<String>,
    cumulative_demand_mw: f64,
    renewable_mw: f64,
    dispatch: BTreeMap<String, f64>,
}

pub fn handle(
    scenario_path: &Path,
    out: Option<&Path>,
    overrides: &Overrides,
    config: &BlackstartConfig,
) -> Result<()> {
    let file = load_scenario_file(scenario_path)?;
    let scenario = resolve_scenario(&file)?;

    let mut solver = config.solver_config()?;
    if let Some(backend) = overrides.backend {
        solver.backend = backend;
    }
    if let Some(limit) = overrides.time_limit {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(anyhow!("--time-limit must be positive, got {}", limit));
        }
        solver.time_limit = Some(Duration::from_secs_f64(limit));
    }
    let mut options = config.sequencing_options();
    if let Some(weight) = overrides.cost_weight {
        options.cost_weight = weight;
    }
    if overrides.allow_partial {
        options.require_full_restoration = false;
    }
    if overrides.no_diagnose {
        options.diagnose = false;
    }

    let mut runner = ScenarioRunner::new(scenario, options, Arc::new(GoodLpAdapter), solver)
        .context("building sequencing model")?;
    let outcome = runner.run()?;
    let schedule = match outcome {
        RunOutcome::Solved(schedule) => schedule,
        RunOutcome::Infeasible(err) => {
            for finding in &err.diagnostic.findings {
                warn!("{}", finding);
            }
            if !err.diagnostic.relaxable.is_empty() {
                let classes: Vec<&str> =
                    err.diagnostic.relaxable.iter().map(|c| c.as_str()).collect();
                warn!("removing any of [{}] restores feasibility", classes.join(", "));
            }
            return Err(err.into());
        }
    };

    let output = to_output(file.scenario_id.clone(), &schedule, runner.scenario());
    let json = serde_json::to_string_pretty(&output).context("serializing schedule")?;
    match out {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("writing schedule '{}'", path.display()))?;
            print!("{}", schedule.summary(runner.scenario()));
            println!("Schedule written to {}", path.display());
        }
        None => println!("{}", json),
    }
    info!(objective = schedule.objective, "solve complete");
    Ok(())
}

fn to_output(scenario_id: Option<String>, schedule: &Schedule, scenario: &Scenario) -> ScheduleOutput {
    let block_name = |id| {
        scenario
            .block(id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let generator_name = |id| {
        scenario
            .generator(id)
            .map(|g| g.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    ScheduleOutput {
        scenario_id,
        status: schedule.status.to_string(),
        objective: schedule.objective,
        solve_time_seconds: schedule.solve_time_seconds,
        energization: schedule
            .energization
            .iter()
            .map(|(id, period)| (block_name(*id), *period))
            .collect(),
        periods: schedule
            .periods
            .iter()
            .map(|p| PeriodOutput {
                period: p.period,
                blocks_energized: p.blocks_energized.iter().map(|id| block_name(*id)).collect(),
                cumulative_demand_mw: p.cumulative_demand_mw,
                renewable_mw: p.renewable_mw,
                dispatch: p
                    .dispatch
                    .iter()
                    .map(|(id, mw)| (generator_name(*id), *mw))
                    .collect(),
            })
            .collect(),
    }
}
