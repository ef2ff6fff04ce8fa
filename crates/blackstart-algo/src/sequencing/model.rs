//! Solver-neutral MILP formulation of the block-loading problem
//!
//! ## Variables
//!
//! | Name | Domain | Meaning |
//! |------|--------|---------|
//! | `pickup[b,t]` | {0,1} | block b is energized by period t (fixed to 0 before its earliest period) |
//! | `dispatch[g,t]` | [0, capacity] | generator output (upper bound 0 before its startup period) |
//! | `on[g,t]` | {0,1} | commitment, only for units with a minimum stable output or a start-up cost |
//! | `start[g,t]` | {0,1} | start-up indicator, only for units with a start-up cost or minimum on/off times |
//!
//! ## Objective (minimize)
//!
//! ```text
//! Σ_b priority_b · Σ_{t ≥ earliest_b} (1 − pickup[b,t])
//!   + w · (Σ_{g,t} marginal_g · dispatch[g,t] · Δh + Σ_{g,t} startup_cost_g · start[g,t])
//! ```
//!
//! The first term equals `priority · (energization − earliest)` for every restored
//! block, so high-priority blocks are pulled forward. The constant part is kept
//! in [`MilpModel::objective_offset`] and not handed to the solver.

use std::fmt;

use blackstart_core::{Scenario, ScenarioValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Integrality of a model variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Binary,
    Continuous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
}

/// Constraint family, used for infeasibility diagnosis by relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintClass {
    Monotonicity,
    Deadline,
    FullRestoration,
    CapacityBalance,
    Ramp,
    MinStableOutput,
    PickupLimit,
    RestorationTarget,
    Startup,
    MinUpTime,
    MinDownTime,
}

impl ConstraintClass {
    /// Order in which classes are dropped when diagnosing an infeasible model
    pub const RELAXATION_ORDER: [ConstraintClass; 10] = [
        ConstraintClass::Deadline,
        ConstraintClass::FullRestoration,
        ConstraintClass::RestorationTarget,
        ConstraintClass::CapacityBalance,
        ConstraintClass::Ramp,
        ConstraintClass::PickupLimit,
        ConstraintClass::MinStableOutput,
        ConstraintClass::MinUpTime,
        ConstraintClass::MinDownTime,
        ConstraintClass::Startup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintClass::Monotonicity => "monotonicity",
            ConstraintClass::Deadline => "deadline",
            ConstraintClass::FullRestoration => "full_restoration",
            ConstraintClass::CapacityBalance => "capacity_balance",
            ConstraintClass::Ramp => "ramp",
            ConstraintClass::MinStableOutput => "min_stable_output",
            ConstraintClass::PickupLimit => "pickup_limit",
            ConstraintClass::RestorationTarget => "restoration_target",
            ConstraintClass::Startup => "startup",
            ConstraintClass::MinUpTime => "min_up_time",
            ConstraintClass::MinDownTime => "min_down_time",
        }
    }

    /// Operator-facing explanation when this class is the cause of infeasibility
    pub fn reason(&self) -> &'static str {
        match self {
            ConstraintClass::Monotonicity => "energized blocks cannot be dropped again",
            ConstraintClass::Deadline => "block deadlines cannot all be met",
            ConstraintClass::FullRestoration => {
                "not every block can be restored within the horizon"
            }
            ConstraintClass::CapacityBalance => {
                "insufficient generation to cover demand that must be energized"
            }
            ConstraintClass::Ramp => "generator ramp limits are too slow for the required pickups",
            ConstraintClass::MinStableOutput => {
                "minimum stable output forces more generation than can be absorbed"
            }
            ConstraintClass::PickupLimit => "per-period pickup limit is too tight",
            ConstraintClass::RestorationTarget => "restoration targets cannot be reached",
            ConstraintClass::Startup => "start-up logic cannot be satisfied",
            ConstraintClass::MinUpTime => "generators cannot stay online for their minimum on-time",
            ConstraintClass::MinDownTime => "generators cannot cool down in time to restart",
        }
    }
}

impl fmt::Display for ConstraintClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

/// `Σ coef · var  (relation)  rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub class: ConstraintClass,
    pub terms: Vec<(usize, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coef)| coef * values.get(var).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs(values);
        match self.relation {
            Relation::LessEq => lhs <= self.rhs + tolerance,
            Relation::GreaterEq => lhs >= self.rhs - tolerance,
            Relation::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// Positions of the decision variables inside [`MilpModel::variables`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelIndex {
    pub periods: usize,
    /// `pickup[block][period]`
    pub pickup: Vec<Vec<usize>>,
    /// `dispatch[generator][period]`
    pub dispatch: Vec<Vec<usize>>,
    /// `on[generator][period]`, present only for committed units
    pub on: Vec<Option<Vec<usize>>>,
    /// `start[generator][period]`, present only for units that track start-ups
    pub start: Vec<Option<Vec<usize>>>,
}

/// Options that shape the formulation without being part of the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencingOptions {
    /// Force every block to be energized by the last period
    pub require_full_restoration: bool,
    /// Weight of the operating cost term relative to the restoration delay term
    pub cost_weight: f64,
    /// Integrality and constraint tolerance used during extraction
    pub tolerance: f64,
    /// Run relaxation diagnosis when the model is infeasible
    pub diagnose: bool,
}

impl Default for SequencingOptions {
    fn default() -> Self {
        Self {
            require_full_restoration: true,
            cost_weight: 0.0,
            tolerance: 1e-6,
            diagnose: true,
        }
    }
}

impl SequencingOptions {
    pub fn validate(&self) -> Result<(), ScenarioValidationError> {
        if !self.cost_weight.is_finite() || self.cost_weight < 0.0 {
            return Err(ScenarioValidationError::InvalidOption {
                option: "cost_weight",
                reason: format!("must be a non-negative number, got {}", self.cost_weight),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 || self.tolerance >= 0.5 {
            return Err(ScenarioValidationError::InvalidOption {
                option: "tolerance",
                reason: format!("must lie in (0, 0.5), got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

/// Complete minimization model, independent of any solver backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MilpModel {
    pub variables: Vec<VarDef>,
    pub constraints: Vec<LinearConstraint>,
    pub objective: Vec<(usize, f64)>,
    pub objective_offset: f64,
    pub index: ModelIndex,
}

impl MilpModel {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_binaries(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.kind == VarKind::Binary)
            .count()
    }

    pub fn count_class(&self, class: ConstraintClass) -> usize {
        self.constraints.iter().filter(|c| c.class == class).count()
    }

    /// Objective value (including the constant offset) at `values`
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective_offset
            + self
                .objective
                .iter()
                .map(|&(var, coef)| coef * values.get(var).copied().unwrap_or(0.0))
                .sum::<f64>()
    }

    /// Copy of this model with every constraint of `class` removed
    pub fn without_class(&self, class: ConstraintClass) -> MilpModel {
        MilpModel {
            constraints: self
                .constraints
                .iter()
                .filter(|c| c.class != class)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Constraints or bounds violated by `values` beyond `tolerance`
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut out = Vec::new();
        for (idx, var) in self.variables.iter().enumerate() {
            let value = values.get(idx).copied().unwrap_or(0.0);
            if value < var.lower - tolerance || value > var.upper + tolerance {
                out.push(format!(
                    "{} = {} outside [{}, {}]",
                    var.name, value, var.lower, var.upper
                ));
            }
        }
        for constraint in &self.constraints {
            if !constraint.is_satisfied(values, tolerance) {
                out.push(format!(
                    "{} ({}) lhs {} vs rhs {}",
                    constraint.name,
                    constraint.class,
                    constraint.lhs(values),
                    constraint.rhs
                ));
            }
        }
        out
    }
}

struct ModelBuilder {
    variables: Vec<VarDef>,
    constraints: Vec<LinearConstraint>,
}

impl ModelBuilder {
    fn var(&mut self, name: String, kind: VarKind, lower: f64, upper: f64) -> usize {
        self.variables.push(VarDef {
            name,
            kind,
            lower,
            upper,
        });
        self.variables.len() - 1
    }

    fn push(
        &mut self,
        name: String,
        class: ConstraintClass,
        terms: Vec<(usize, f64)>,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name,
            class,
            terms,
            relation,
            rhs,
        });
    }
}

/// Translate a validated scenario into a [`MilpModel`].
///
/// Deterministic: the same scenario and options always yield the same
/// variable and constraint ordering.
pub fn build_model(
    scenario: &Scenario,
    options: &SequencingOptions,
) -> Result<MilpModel, ScenarioValidationError> {
    options.validate()?;

    let periods = scenario.periods();
    let last = periods - 1;
    let mut b = ModelBuilder {
        variables: Vec::new(),
        constraints: Vec::new(),
    };
    let mut index = ModelIndex {
        periods,
        ..ModelIndex::default()
    };

    for block in scenario.blocks() {
        let vars = (0..periods)
            .map(|t| {
                let upper = if t < block.earliest_period { 0.0 } else { 1.0 };
                b.var(
                    format!("pickup[{},{}]", block.id, t),
                    VarKind::Binary,
                    0.0,
                    upper,
                )
            })
            .collect();
        index.pickup.push(vars);
    }

    for generator in scenario.generators() {
        if generator.startup_period >= periods {
            warn!(
                generator = %generator.name,
                startup_period = generator.startup_period,
                periods,
                "generator cannot come online within the horizon"
            );
        }
        let dispatch = (0..periods)
            .map(|t| {
                let upper = if generator.is_available_at(t) {
                    generator.capacity_mw
                } else {
                    0.0
                };
                b.var(
                    format!("dispatch[{},{}]", generator.id, t),
                    VarKind::Continuous,
                    0.0,
                    upper,
                )
            })
            .collect();
        index.dispatch.push(dispatch);

        let on = generator.needs_commitment().then(|| {
            (0..periods)
                .map(|t| {
                    let upper = if generator.is_available_at(t) { 1.0 } else { 0.0 };
                    b.var(
                        format!("on[{},{}]", generator.id, t),
                        VarKind::Binary,
                        0.0,
                        upper,
                    )
                })
                .collect::<Vec<_>>()
        });
        index.on.push(on);

        let start = generator.tracks_starts().then(|| {
            (0..periods)
                .map(|t| {
                    b.var(
                        format!("start[{},{}]", generator.id, t),
                        VarKind::Binary,
                        0.0,
                        1.0,
                    )
                })
                .collect::<Vec<_>>()
        });
        index.start.push(start);
    }

    // Block constraints
    for (block, pickup) in scenario.blocks().iter().zip(&index.pickup) {
        for t in 0..last {
            b.push(
                format!("monotone[{},{}]", block.id, t),
                ConstraintClass::Monotonicity,
                vec![(pickup[t], 1.0), (pickup[t + 1], -1.0)],
                Relation::LessEq,
                0.0,
            );
        }
        if let Some(deadline) = block.deadline {
            b.push(
                format!("deadline[{}]", block.id),
                ConstraintClass::Deadline,
                vec![(pickup[deadline], 1.0)],
                Relation::GreaterEq,
                1.0,
            );
        }
        if options.require_full_restoration {
            b.push(
                format!("restored[{}]", block.id),
                ConstraintClass::FullRestoration,
                vec![(pickup[last], 1.0)],
                Relation::GreaterEq,
                1.0,
            );
        }
    }

    // Σ dispatch − Σ demand·pickup ≥ −renewable
    for t in 0..periods {
        let mut terms: Vec<(usize, f64)> = index.dispatch.iter().map(|d| (d[t], 1.0)).collect();
        terms.extend(
            scenario
                .blocks()
                .iter()
                .zip(&index.pickup)
                .map(|(block, p)| (p[t], -block.demand_mw)),
        );
        b.push(
            format!("balance[{}]", t),
            ConstraintClass::CapacityBalance,
            terms,
            Relation::GreaterEq,
            -scenario.renewable_mw(t),
        );
    }

    for (g, generator) in scenario.generators().iter().enumerate() {
        let dispatch = &index.dispatch[g];
        let ramp = generator.ramp_mw_per_period;
        let startup_ramp = generator.startup_ramp_mw();
        for t in 1..periods {
            let mut terms = vec![(dispatch[t], 1.0), (dispatch[t - 1], -1.0)];
            let rhs = match &index.on[g] {
                // Δdispatch ≤ ramp·on[t−1] + startup_ramp·(1 − on[t−1])
                Some(on) if startup_ramp > ramp => {
                    terms.push((on[t - 1], startup_ramp - ramp));
                    startup_ramp
                }
                _ => ramp,
            };
            b.push(
                format!("ramp[{},{}]", generator.id, t),
                ConstraintClass::Ramp,
                terms,
                Relation::LessEq,
                rhs,
            );
        }

        if let Some(on) = &index.on[g] {
            for t in 0..periods {
                b.push(
                    format!("commit_max[{},{}]", generator.id, t),
                    ConstraintClass::MinStableOutput,
                    vec![(dispatch[t], 1.0), (on[t], -generator.capacity_mw)],
                    Relation::LessEq,
                    0.0,
                );
                if generator.min_stable_mw > 0.0 {
                    b.push(
                        format!("commit_min[{},{}]", generator.id, t),
                        ConstraintClass::MinStableOutput,
                        vec![(dispatch[t], 1.0), (on[t], -generator.min_stable_mw)],
                        Relation::GreaterEq,
                        0.0,
                    );
                }
            }
            if let Some(start) = &index.start[g] {
                // start[t] − on[t] + on[t−1] ≥ 0, with on[−1] = 0
                for t in 0..periods {
                    let mut terms = vec![(start[t], 1.0), (on[t], -1.0)];
                    if t > 0 {
                        terms.push((on[t - 1], 1.0));
                    }
                    b.push(
                        format!("startup[{},{}]", generator.id, t),
                        ConstraintClass::Startup,
                        terms,
                        Relation::GreaterEq,
                        0.0,
                    );
                }

                // Σ_{τ = t−U+1..t} start[τ] ≤ on[t]
                let up = generator.min_on_periods;
                if up > 1 {
                    for t in 0..periods {
                        let mut terms: Vec<(usize, f64)> = start
                            [(t + 1).saturating_sub(up)..=t]
                            .iter()
                            .map(|&var| (var, 1.0))
                            .collect();
                        terms.push((on[t], -1.0));
                        b.push(
                            format!("min_up[{},{}]", generator.id, t),
                            ConstraintClass::MinUpTime,
                            terms,
                            Relation::LessEq,
                            0.0,
                        );
                    }
                }

                // Σ_{τ = t−D+1..t} start[τ] + on[t−D] ≤ 1, units start the horizon cold
                let down = generator.min_off_periods;
                if down > 1 {
                    for t in down..periods {
                        let mut terms: Vec<(usize, f64)> = start[t + 1 - down..=t]
                            .iter()
                            .map(|&var| (var, 1.0))
                            .collect();
                        terms.push((on[t - down], 1.0));
                        b.push(
                            format!("min_down[{},{}]", generator.id, t),
                            ConstraintClass::MinDownTime,
                            terms,
                            Relation::LessEq,
                            1.0,
                        );
                    }
                }
            }
        }
    }

    // Σ demand·(pickup[t] − pickup[t−1]) ≤ limit, with pickup[−1] = 0
    if let Some(limit) = scenario.max_pickup_mw_per_period() {
        for t in 0..periods {
            let mut terms = Vec::new();
            for (block, p) in scenario.blocks().iter().zip(&index.pickup) {
                terms.push((p[t], block.demand_mw));
                if t > 0 {
                    terms.push((p[t - 1], -block.demand_mw));
                }
            }
            b.push(
                format!("pickup_limit[{}]", t),
                ConstraintClass::PickupLimit,
                terms,
                Relation::LessEq,
                limit,
            );
        }
    }

    for (i, target) in scenario.targets().iter().enumerate() {
        let terms = scenario
            .blocks()
            .iter()
            .zip(&index.pickup)
            .map(|(block, p)| (p[target.period], block.demand_mw))
            .collect();
        b.push(
            format!("target[{}]", i),
            ConstraintClass::RestorationTarget,
            terms,
            Relation::GreaterEq,
            target.min_restored_mw,
        );
    }

    // Objective
    let mut objective = Vec::new();
    let mut objective_offset = 0.0;
    for (block, pickup) in scenario.blocks().iter().zip(&index.pickup) {
        if block.priority == 0.0 {
            continue;
        }
        objective_offset += block.priority * (periods - block.earliest_period) as f64;
        for &var in &pickup[block.earliest_period..] {
            objective.push((var, -block.priority));
        }
    }
    if options.cost_weight > 0.0 {
        let hours = scenario.horizon().period_hours;
        for (g, generator) in scenario.generators().iter().enumerate() {
            if generator.marginal_cost > 0.0 {
                let coef = options.cost_weight * generator.marginal_cost * hours;
                objective.extend(index.dispatch[g].iter().map(|&var| (var, coef)));
            }
            if let Some(start) = &index.start[g] {
                let coef = options.cost_weight * generator.startup_cost;
                objective.extend(start.iter().map(|&var| (var, coef)));
            }
        }
    }

    let model = MilpModel {
        variables: b.variables,
        constraints: b.constraints,
        objective,
        objective_offset,
        index,
    };
    debug!(
        variables = model.num_variables(),
        binaries = model.num_binaries(),
        constraints = model.constraints.len(),
        "built block-loading model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackstart_core::{Generator, LoadBlock, ScenarioBuilder, TimeHorizon};

    fn scenario() -> Scenario {
        ScenarioBuilder::new(TimeHorizon::new(4, 1.0))
            .generator(Generator::new("G1", 50.0, 20.0))
            .generator(
                Generator::new("G2", 30.0, 10.0)
                    .with_min_stable(5.0)
                    .with_startup_period(1)
                    .with_costs(40.0, 500.0),
            )
            .block(LoadBlock::new("L1", 20.0).with_priority(3.0))
            .block(
                LoadBlock::new("L2", 25.0)
                    .with_earliest_period(1)
                    .with_deadline(2),
            )
            .max_pickup_per_period(30.0)
            .target(2, 40.0)
            .build()
            .unwrap()
    }

    #[test]
    fn variable_layout_matches_scenario() {
        let model = build_model(&scenario(), &SequencingOptions::default()).unwrap();
        // 2 blocks·4 pickup, 2 gens·4 dispatch, 4 on + 4 start for G2
        assert_eq!(model.num_variables(), 8 + 8 + 4 + 4);
        assert_eq!(model.num_binaries(), 8 + 4 + 4);
        assert!(model.index.on[0].is_none());
        assert!(model.index.start[1].is_some());

        // Before earliest period, pickup is fixed to zero
        let p = model.index.pickup[1][0];
        assert_eq!(model.variables[p].upper, 0.0);
        // Before startup, dispatch and commitment are fixed to zero
        let d = model.index.dispatch[1][0];
        assert_eq!(model.variables[d].upper, 0.0);
        let on = model.index.on[1].as_ref().unwrap()[0];
        assert_eq!(model.variables[on].upper, 0.0);
    }

    #[test]
    fn constraint_classes_are_counted() {
        let model = build_model(&scenario(), &SequencingOptions::default()).unwrap();
        assert_eq!(model.count_class(ConstraintClass::Monotonicity), 2 * 3);
        assert_eq!(model.count_class(ConstraintClass::Deadline), 1);
        assert_eq!(model.count_class(ConstraintClass::FullRestoration), 2);
        assert_eq!(model.count_class(ConstraintClass::CapacityBalance), 4);
        assert_eq!(model.count_class(ConstraintClass::Ramp), 2 * 3);
        assert_eq!(model.count_class(ConstraintClass::MinStableOutput), 2 * 4);
        assert_eq!(model.count_class(ConstraintClass::Startup), 4);
        assert_eq!(model.count_class(ConstraintClass::PickupLimit), 4);
        assert_eq!(model.count_class(ConstraintClass::RestorationTarget), 1);
    }

    #[test]
    fn cold_unit_may_synchronise_to_minimum_stable_output() {
        let scenario = ScenarioBuilder::new(TimeHorizon::new(4, 1.0))
            .generator(
                Generator::new("Steam", 100.0, 10.0)
                    .with_min_stable(30.0)
                    .with_startup_period(1),
            )
            .block(LoadBlock::new("L1", 10.0))
            .build()
            .unwrap();
        let model = build_model(&scenario, &SequencingOptions::default()).unwrap();
        let dispatch = &model.index.dispatch[0];
        let on = model.index.on[0].as_ref().unwrap();

        // Off at period 0, synchronised at 30 MW in period 1, then +10 MW per period
        let mut values = vec![0.0; model.num_variables()];
        for (t, output) in [0.0, 30.0, 40.0, 50.0].into_iter().enumerate() {
            values[dispatch[t]] = output;
            values[on[t]] = if output > 0.0 { 1.0 } else { 0.0 };
        }
        for t in 0..4 {
            values[model.index.pickup[0][t]] = 1.0;
        }
        values[model.index.pickup[0][0]] = 0.0;
        assert!(model.violations(&values, 1e-9).is_empty());

        // Once committed, the ordinary ramp limit applies again
        values[dispatch[2]] = 45.0;
        let violations = model.violations(&values, 1e-9);
        assert!(violations.iter().any(|v| v.starts_with("ramp[G0,2]")));
    }

    #[test]
    fn minimum_on_and_off_times_add_window_constraints() {
        let scenario = ScenarioBuilder::new(TimeHorizon::new(5, 1.0))
            .generator(Generator::new("Gas", 40.0, 40.0).with_min_up_down(3, 2))
            .block(LoadBlock::new("L1", 10.0))
            .build()
            .unwrap();
        let model = build_model(&scenario, &SequencingOptions::default()).unwrap();
        assert!(model.index.start[0].is_some());
        assert_eq!(model.count_class(ConstraintClass::MinUpTime), 5);
        // Windows that reach before period 0 are skipped
        assert_eq!(model.count_class(ConstraintClass::MinDownTime), 3);

        let on = model.index.on[0].as_ref().unwrap();
        let start = model.index.start[0].as_ref().unwrap();
        // Start at 0, shut down at 1: breaks the minimum on-time
        let mut values = vec![0.0; model.num_variables()];
        values[on[0]] = 1.0;
        values[start[0]] = 1.0;
        let violations = model.violations(&values, 1e-9);
        assert!(violations.iter().any(|v| v.starts_with("min_up[G0,1]")));

        // On 0..=2, off at 3, restart at 4: breaks the minimum off-time
        let mut values = vec![0.0; model.num_variables()];
        for t in [0, 1, 2, 4] {
            values[on[t]] = 1.0;
        }
        values[start[0]] = 1.0;
        values[start[4]] = 1.0;
        let violations = model.violations(&values, 1e-9);
        assert!(violations.iter().any(|v| v.starts_with("min_down[G0,4]")));
        assert!(!violations.iter().any(|v| v.starts_with("min_up")));
    }

    #[test]
    fn partial_restoration_drops_final_period_constraints() {
        let options = SequencingOptions {
            require_full_restoration: false,
            ..SequencingOptions::default()
        };
        let model = build_model(&scenario(), &options).unwrap();
        assert_eq!(model.count_class(ConstraintClass::FullRestoration), 0);
    }

    #[test]
    fn objective_counts_delay_from_earliest_period() {
        let scenario = scenario();
        let model = build_model(&scenario, &SequencingOptions::default()).unwrap();
        // L1 eligible for 4 periods at priority 3, L2 for 3 periods at priority 1
        assert_eq!(model.objective_offset, 3.0 * 4.0 + 3.0);

        // Energize L1 at 0 and L2 at 2 → delay 3·0 + 1·1
        let mut values = vec![0.0; model.num_variables()];
        for t in 0..4 {
            values[model.index.pickup[0][t]] = 1.0;
        }
        for t in 2..4 {
            values[model.index.pickup[1][t]] = 1.0;
        }
        assert!((model.objective_value(&values) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cost_weight_adds_operating_terms() {
        let options = SequencingOptions {
            cost_weight: 0.5,
            ..SequencingOptions::default()
        };
        let model = build_model(&scenario(), &options).unwrap();
        let d = model.index.dispatch[1][2];
        let coef = model
            .objective
            .iter()
            .find(|(var, _)| *var == d)
            .map(|(_, c)| *c)
            .unwrap();
        assert!((coef - 0.5 * 40.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_invalid_options() {
        let options = SequencingOptions {
            cost_weight: -1.0,
            ..SequencingOptions::default()
        };
        let err = build_model(&scenario(), &options).unwrap_err();
        assert!(matches!(
            err,
            ScenarioValidationError::InvalidOption { option: "cost_weight", .. }
        ));
    }

    #[test]
    fn without_class_removes_only_that_class() {
        let model = build_model(&scenario(), &SequencingOptions::default()).unwrap();
        let relaxed = model.without_class(ConstraintClass::Ramp);
        assert_eq!(relaxed.count_class(ConstraintClass::Ramp), 0);
        assert_eq!(
            relaxed.constraints.len(),
            model.constraints.len() - model.count_class(ConstraintClass::Ramp)
        );
        assert_eq!(relaxed.variables, model.variables);
    }

    #[test]
    fn violations_report_broken_constraints() {
        let model = build_model(&scenario(), &SequencingOptions::default()).unwrap();
        let values = vec![0.0; model.num_variables()];
        let violations = model.violations(&values, 1e-6);
        assert!(violations.iter().any(|v| v.starts_with("deadline[B1]")));
        assert!(violations.iter().any(|v| v.starts_with("target[0]")));
    }
}
