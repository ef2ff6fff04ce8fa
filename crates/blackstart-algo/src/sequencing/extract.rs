//! Raw solver values → [`Schedule`]

use std::collections::BTreeMap;

use blackstart_core::Scenario;
use tracing::error;

use super::error::ExtractionInconsistencyError;
use super::model::{MilpModel, VarKind};
use super::schedule::{PeriodSnapshot, Schedule};
use super::solver::RawSolution;

/// Build the schedule from a solution that carries values.
///
/// Binary values must lie within `tolerance` of 0 or 1, and every pickup
/// trajectory must be non-decreasing. The energization period of a block is
/// the first period whose pickup value rounds to 1.
pub fn extract_schedule(
    scenario: &Scenario,
    model: &MilpModel,
    raw: &RawSolution,
    tolerance: f64,
) -> Result<Schedule, ExtractionInconsistencyError> {
    check_values(scenario, model, &raw.values, tolerance).inspect_err(|err| {
        error!(
            error = %err,
            status = %raw.status,
            raw = %dump(model, &raw.values),
            "solver output failed consistency checks"
        );
    })?;

    let values = &raw.values;
    let periods = model.index.periods;
    let is_on = |var: usize| values[var] >= 0.5;

    let mut energization = BTreeMap::new();
    for (block, pickup) in scenario.blocks().iter().zip(&model.index.pickup) {
        energization.insert(block.id, pickup.iter().position(|&var| is_on(var)));
    }

    let mut snapshots = Vec::with_capacity(periods);
    let mut cumulative = 0.0;
    for t in 0..periods {
        let mut blocks_energized = Vec::new();
        for block in scenario.blocks() {
            if energization.get(&block.id).copied().flatten() == Some(t) {
                blocks_energized.push(block.id);
                cumulative += block.demand_mw;
            }
        }
        let dispatch = scenario
            .generators()
            .iter()
            .zip(&model.index.dispatch)
            .map(|(generator, vars)| (generator.id, values[vars[t]].max(0.0)))
            .collect();
        snapshots.push(PeriodSnapshot {
            period: t,
            blocks_energized,
            cumulative_demand_mw: cumulative,
            renewable_mw: scenario.renewable_mw(t),
            dispatch,
        });
    }

    Ok(Schedule {
        periods: snapshots,
        energization,
        objective: raw
            .objective
            .unwrap_or_else(|| model.objective_value(values)),
        status: raw.status,
        solve_time_seconds: raw.solve_time.as_secs_f64(),
    })
}

fn check_values(
    scenario: &Scenario,
    model: &MilpModel,
    values: &[f64],
    tolerance: f64,
) -> Result<(), ExtractionInconsistencyError> {
    if values.len() != model.num_variables() {
        return Err(ExtractionInconsistencyError::LengthMismatch {
            expected: model.num_variables(),
            found: values.len(),
        });
    }

    for (def, &value) in model.variables.iter().zip(values) {
        if def.kind == VarKind::Binary && value.abs() > tolerance && (value - 1.0).abs() > tolerance
        {
            return Err(ExtractionInconsistencyError::FractionalBinary {
                variable: def.name.clone(),
                value,
            });
        }
    }

    for (block, pickup) in scenario.blocks().iter().zip(&model.index.pickup) {
        for (t, pair) in pickup.windows(2).enumerate() {
            let (before, after) = (values[pair[0]], values[pair[1]]);
            if before > after + tolerance {
                return Err(ExtractionInconsistencyError::NonMonotonicPickup {
                    block: block.name.clone(),
                    period: t,
                    before,
                    after,
                });
            }
        }
    }

    for vars in &model.index.dispatch {
        for &var in vars {
            if values[var] < -tolerance {
                return Err(ExtractionInconsistencyError::NegativeDispatch {
                    variable: model.variables[var].name.clone(),
                    value: values[var],
                });
            }
        }
    }
    Ok(())
}

fn dump(model: &MilpModel, values: &[f64]) -> String {
    let mut out = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        let name = model
            .variables
            .get(idx)
            .map(|v| v.name.as_str())
            .unwrap_or("?");
        out.push(format!("{}={}", name, value));
    }
    out.join(" ")
}
