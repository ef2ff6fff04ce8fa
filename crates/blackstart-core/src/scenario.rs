//! Scenario elements and the validating builder
//!
//! A [`Scenario`] is immutable once built. All fields are private and every
//! constructor path runs the same invariant checks, so downstream code can
//! rely on them without re-checking.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{BlockId, GenId, ScenarioValidationError};

/// Discrete scheduling horizon `{0, 1, ..., periods - 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeHorizon {
    /// Number of periods (T)
    pub periods: usize,
    /// Duration of one period in hours
    pub period_hours: f64,
}

impl TimeHorizon {
    pub fn new(periods: usize, period_hours: f64) -> Self {
        Self {
            periods,
            period_hours,
        }
    }

    /// Index of the final period
    pub fn last_period(&self) -> usize {
        self.periods.saturating_sub(1)
    }

    fn validate(&self) -> Result<(), ScenarioValidationError> {
        if self.periods == 0 {
            return Err(ScenarioValidationError::EmptyHorizon);
        }
        if !self.period_hours.is_finite() || self.period_hours <= 0.0 {
            return Err(ScenarioValidationError::InvalidPeriodLength(
                self.period_hours,
            ));
        }
        Ok(())
    }
}

/// A generating unit available during restoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    /// Assigned by the scenario builder (position in the generator list)
    pub id: GenId,
    pub name: String,
    /// Maximum output (MW)
    pub capacity_mw: f64,
    /// Minimum stable output when committed (MW, 0 = no minimum)
    pub min_stable_mw: f64,
    /// Maximum output increase between consecutive periods (MW)
    pub ramp_mw_per_period: f64,
    /// Earliest period the unit can produce power
    pub startup_period: usize,
    /// Variable cost ($/MWh)
    pub marginal_cost: f64,
    /// Fixed cost per start ($)
    pub startup_cost: f64,
    /// Periods the unit must stay committed after each start (0 or 1 = no minimum)
    #[serde(default)]
    pub min_on_periods: usize,
    /// Periods the unit must stay off after shutting down before it may restart
    #[serde(default)]
    pub min_off_periods: usize,
}

impl Generator {
    /// Create a generator that is online from period 0 with no minimum output and no costs
    pub fn new(name: impl Into<String>, capacity_mw: f64, ramp_mw_per_period: f64) -> Self {
        Self {
            id: GenId::new(0),
            name: name.into(),
            capacity_mw,
            min_stable_mw: 0.0,
            ramp_mw_per_period,
            startup_period: 0,
            marginal_cost: 0.0,
            startup_cost: 0.0,
            min_on_periods: 0,
            min_off_periods: 0,
        }
    }

    pub fn with_min_stable(mut self, min_stable_mw: f64) -> Self {
        self.min_stable_mw = min_stable_mw;
        self
    }

    pub fn with_startup_period(mut self, period: usize) -> Self {
        self.startup_period = period;
        self
    }

    pub fn with_costs(mut self, marginal_cost: f64, startup_cost: f64) -> Self {
        self.marginal_cost = marginal_cost;
        self.startup_cost = startup_cost;
        self
    }

    pub fn with_min_up_down(mut self, min_on_periods: usize, min_off_periods: usize) -> Self {
        self.min_on_periods = min_on_periods;
        self.min_off_periods = min_off_periods;
        self
    }

    /// Whether minimum on- or off-time rules constrain this unit
    pub fn has_min_up_down(&self) -> bool {
        self.min_on_periods > 1 || self.min_off_periods > 1
    }

    /// Whether the unit needs an explicit on/off commitment decision
    pub fn needs_commitment(&self) -> bool {
        self.min_stable_mw > 0.0 || self.startup_cost > 0.0 || self.has_min_up_down()
    }

    /// Whether start-up events must be tracked explicitly
    pub fn tracks_starts(&self) -> bool {
        self.startup_cost > 0.0 || self.has_min_up_down()
    }

    /// Largest output step out of the off state.
    ///
    /// A unit whose minimum stable output exceeds its ramp limit synchronises
    /// straight to its minimum.
    pub fn startup_ramp_mw(&self) -> f64 {
        self.ramp_mw_per_period.max(self.min_stable_mw)
    }

    /// Whether the startup delay has elapsed at `period`
    pub fn is_available_at(&self, period: usize) -> bool {
        period >= self.startup_period
    }

    /// Highest output reachable at `period` from a cold start.
    ///
    /// Units online from period 0 may start anywhere up to capacity. Units with
    /// a startup delay leave zero output at `startup_period - 1`, reach
    /// [`startup_ramp_mw`](Self::startup_ramp_mw) in their first online period
    /// and are then bound by their ramp limit.
    pub fn max_output_at(&self, period: usize) -> f64 {
        if !self.is_available_at(period) {
            return 0.0;
        }
        if self.startup_period == 0 {
            return self.capacity_mw;
        }
        let steps = (period - self.startup_period) as f64;
        (self.startup_ramp_mw() + steps * self.ramp_mw_per_period).min(self.capacity_mw)
    }

    fn validate(&self) -> Result<(), ScenarioValidationError> {
        let fields = [
            ("capacity_mw", self.capacity_mw),
            ("min_stable_mw", self.min_stable_mw),
            ("ramp_mw_per_period", self.ramp_mw_per_period),
            ("marginal_cost", self.marginal_cost),
            ("startup_cost", self.startup_cost),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ScenarioValidationError::NonFinite {
                    entity: format!("generator '{}'", self.name),
                    field,
                });
            }
        }
        let fail = |reason: String| ScenarioValidationError::Generator {
            name: self.name.clone(),
            reason,
        };
        if self.min_stable_mw < 0.0 {
            return Err(fail(format!(
                "minimum stable output {} MW is negative",
                self.min_stable_mw
            )));
        }
        if self.capacity_mw < self.min_stable_mw {
            return Err(fail(format!(
                "capacity {} MW is below minimum stable output {} MW",
                self.capacity_mw, self.min_stable_mw
            )));
        }
        if self.ramp_mw_per_period <= 0.0 {
            return Err(fail(format!(
                "ramp limit must be positive, got {} MW/period",
                self.ramp_mw_per_period
            )));
        }
        if self.marginal_cost < 0.0 || self.startup_cost < 0.0 {
            return Err(fail("cost coefficients must be non-negative".to_string()));
        }
        Ok(())
    }
}

/// A discrete block of demand to be re-energized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBlock {
    /// Assigned by the scenario builder (position in the block list)
    pub id: BlockId,
    pub name: String,
    /// Demand picked up when the block is energized (MW)
    pub demand_mw: f64,
    /// Restoration priority weight (higher = restore sooner)
    pub priority: f64,
    /// First period the block may be energized
    pub earliest_period: usize,
    /// Period by which the block must be energized
    pub deadline: Option<usize>,
}

impl LoadBlock {
    /// Create a block with priority 1, eligible from period 0 and without a deadline
    pub fn new(name: impl Into<String>, demand_mw: f64) -> Self {
        Self {
            id: BlockId::new(0),
            name: name.into(),
            demand_mw,
            priority: 1.0,
            earliest_period: 0,
            deadline: None,
        }
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_earliest_period(mut self, period: usize) -> Self {
        self.earliest_period = period;
        self
    }

    pub fn with_deadline(mut self, period: usize) -> Self {
        self.deadline = Some(period);
        self
    }

    fn validate(&self, horizon: &TimeHorizon) -> Result<(), ScenarioValidationError> {
        for (field, value) in [("demand_mw", self.demand_mw), ("priority", self.priority)] {
            if !value.is_finite() {
                return Err(ScenarioValidationError::NonFinite {
                    entity: format!("load block '{}'", self.name),
                    field,
                });
            }
        }
        if self.demand_mw <= 0.0 {
            return Err(ScenarioValidationError::LoadBlock {
                name: self.name.clone(),
                reason: format!("demand must be positive, got {} MW", self.demand_mw),
            });
        }
        if self.priority < 0.0 {
            return Err(ScenarioValidationError::LoadBlock {
                name: self.name.clone(),
                reason: format!("priority must be non-negative, got {}", self.priority),
            });
        }
        if self.earliest_period >= horizon.periods {
            return Err(ScenarioValidationError::PeriodOutOfHorizon {
                entity: format!("load block '{}'", self.name),
                field: "earliest period",
                period: self.earliest_period,
                periods: horizon.periods,
            });
        }
        if let Some(deadline) = self.deadline {
            if deadline < self.earliest_period {
                return Err(ScenarioValidationError::DeadlineBeforeEligible {
                    block: self.name.clone(),
                    deadline,
                    earliest: self.earliest_period,
                });
            }
            if deadline >= horizon.periods {
                return Err(ScenarioValidationError::PeriodOutOfHorizon {
                    entity: format!("load block '{}'", self.name),
                    field: "deadline",
                    period: deadline,
                    periods: horizon.periods,
                });
            }
        }
        Ok(())
    }
}

/// Minimum cumulative demand that must be energized by a given period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestorationTarget {
    pub period: usize,
    pub min_restored_mw: f64,
}

impl RestorationTarget {
    pub fn new(period: usize, min_restored_mw: f64) -> Self {
        Self {
            period,
            min_restored_mw,
        }
    }

    fn validate(&self, horizon: &TimeHorizon) -> Result<(), ScenarioValidationError> {
        let fail = |reason: &str| ScenarioValidationError::Target {
            period: self.period,
            reason: reason.to_string(),
        };
        if self.period >= horizon.periods {
            return Err(fail("period is outside the horizon"));
        }
        if !self.min_restored_mw.is_finite() || self.min_restored_mw < 0.0 {
            return Err(fail("restored demand must be a non-negative number"));
        }
        Ok(())
    }
}

/// Validated restoration scenario.
///
/// Owned by a single optimization run; there are no mutating methods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    horizon: TimeHorizon,
    generators: Vec<Generator>,
    blocks: Vec<LoadBlock>,
    renewable_mw: Vec<f64>,
    max_pickup_mw_per_period: Option<f64>,
    targets: Vec<RestorationTarget>,
}

impl Scenario {
    /// Build a scenario without renewables, pickup limit, or targets
    pub fn new(
        horizon: TimeHorizon,
        generators: Vec<Generator>,
        blocks: Vec<LoadBlock>,
    ) -> Result<Self, ScenarioValidationError> {
        let mut builder = ScenarioBuilder::new(horizon);
        builder.generators = generators;
        builder.blocks = blocks;
        builder.build()
    }

    pub fn horizon(&self) -> &TimeHorizon {
        &self.horizon
    }

    pub fn periods(&self) -> usize {
        self.horizon.periods
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    pub fn blocks(&self) -> &[LoadBlock] {
        &self.blocks
    }

    pub fn generator(&self, id: GenId) -> Option<&Generator> {
        self.generators.get(id.value())
    }

    pub fn block(&self, id: BlockId) -> Option<&LoadBlock> {
        self.blocks.get(id.value())
    }

    /// Renewable profile (empty when the scenario has no renewable infeed)
    pub fn renewable_profile(&self) -> &[f64] {
        &self.renewable_mw
    }

    /// Non-dispatchable infeed at `period` (MW)
    pub fn renewable_mw(&self, period: usize) -> f64 {
        self.renewable_mw.get(period).copied().unwrap_or(0.0)
    }

    pub fn max_pickup_mw_per_period(&self) -> Option<f64> {
        self.max_pickup_mw_per_period
    }

    pub fn targets(&self) -> &[RestorationTarget] {
        &self.targets
    }

    pub fn total_demand_mw(&self) -> f64 {
        self.blocks.iter().map(|b| b.demand_mw).sum()
    }

    pub fn total_capacity_mw(&self) -> f64 {
        self.generators.iter().map(|g| g.capacity_mw).sum()
    }

    /// Upper bound on power available at `period` from all sources
    pub fn max_supply_at(&self, period: usize) -> f64 {
        self.generators
            .iter()
            .map(|g| g.max_output_at(period))
            .sum::<f64>()
            + self.renewable_mw(period)
    }
}

/// Builder for constructing validated scenarios
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    horizon: TimeHorizon,
    generators: Vec<Generator>,
    blocks: Vec<LoadBlock>,
    renewable_mw: Vec<f64>,
    max_pickup_mw_per_period: Option<f64>,
    targets: Vec<RestorationTarget>,
}

impl ScenarioBuilder {
    pub fn new(horizon: TimeHorizon) -> Self {
        Self {
            horizon,
            generators: Vec::new(),
            blocks: Vec::new(),
            renewable_mw: Vec::new(),
            max_pickup_mw_per_period: None,
            targets: Vec::new(),
        }
    }

    /// Add a generator; its id is assigned from its position at build time
    pub fn generator(mut self, generator: Generator) -> Self {
        self.generators.push(generator);
        self
    }

    /// Add a load block; its id is assigned from its position at build time
    pub fn block(mut self, block: LoadBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Set the non-dispatchable infeed, one value per period
    pub fn renewable_profile(mut self, renewable_mw: Vec<f64>) -> Self {
        self.renewable_mw = renewable_mw;
        self
    }

    /// Cap the demand newly energized within a single period
    pub fn max_pickup_per_period(mut self, limit_mw: f64) -> Self {
        self.max_pickup_mw_per_period = Some(limit_mw);
        self
    }

    pub fn target(mut self, period: usize, min_restored_mw: f64) -> Self {
        self.targets
            .push(RestorationTarget::new(period, min_restored_mw));
        self
    }

    /// Validate every element and freeze the scenario
    pub fn build(mut self) -> Result<Scenario, ScenarioValidationError> {
        self.horizon.validate()?;

        let mut names = HashSet::new();
        for (idx, generator) in self.generators.iter_mut().enumerate() {
            generator.id = GenId::new(idx);
            generator.validate()?;
            if !names.insert(generator.name.clone()) {
                return Err(ScenarioValidationError::DuplicateName {
                    kind: "generator",
                    name: generator.name.clone(),
                });
            }
        }

        if self.blocks.is_empty() {
            return Err(ScenarioValidationError::NoLoadBlocks);
        }
        let mut names = HashSet::new();
        for (idx, block) in self.blocks.iter_mut().enumerate() {
            block.id = BlockId::new(idx);
            block.validate(&self.horizon)?;
            if !names.insert(block.name.clone()) {
                return Err(ScenarioValidationError::DuplicateName {
                    kind: "load block",
                    name: block.name.clone(),
                });
            }
        }

        if !self.renewable_mw.is_empty() {
            if self.renewable_mw.len() != self.horizon.periods {
                return Err(ScenarioValidationError::RenewableProfileLength {
                    expected: self.horizon.periods,
                    found: self.renewable_mw.len(),
                });
            }
            for (period, &value) in self.renewable_mw.iter().enumerate() {
                if !value.is_finite() {
                    return Err(ScenarioValidationError::NonFinite {
                        entity: format!("renewable profile period {}", period),
                        field: "renewable_mw",
                    });
                }
                if value < 0.0 {
                    return Err(ScenarioValidationError::NegativeRenewable { period, value });
                }
            }
        }

        if let Some(limit) = self.max_pickup_mw_per_period {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ScenarioValidationError::InvalidPickupLimit(limit));
            }
        }

        for target in &self.targets {
            target.validate(&self.horizon)?;
        }

        Ok(Scenario {
            horizon: self.horizon,
            generators: self.generators,
            blocks: self.blocks,
            renewable_mw: self.renewable_mw,
            max_pickup_mw_per_period: self.max_pickup_mw_per_period,
            targets: self.targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizon() -> TimeHorizon {
        TimeHorizon::new(5, 1.0)
    }

    fn valid_builder() -> ScenarioBuilder {
        ScenarioBuilder::new(horizon())
            .generator(Generator::new("G1", 50.0, 20.0))
            .generator(Generator::new("G2", 30.0, 10.0))
            .block(LoadBlock::new("L1", 20.0).with_priority(3.0))
            .block(LoadBlock::new("L2", 25.0))
    }

    #[test]
    fn builder_assigns_positional_ids() {
        let scenario = valid_builder().build().unwrap();
        assert_eq!(scenario.generators()[1].id, GenId::new(1));
        assert_eq!(scenario.blocks()[0].id, BlockId::new(0));
        assert_eq!(scenario.block(BlockId::new(1)).unwrap().name, "L2");
        assert_eq!(scenario.total_capacity_mw(), 80.0);
    }

    #[test]
    fn rejects_empty_horizon() {
        let err = Scenario::new(
            TimeHorizon::new(0, 1.0),
            vec![],
            vec![LoadBlock::new("L", 1.0)],
        )
        .unwrap_err();
        assert_eq!(err, ScenarioValidationError::EmptyHorizon);
    }

    #[test]
    fn rejects_capacity_below_min_stable() {
        let err = valid_builder()
            .generator(Generator::new("Bad", 10.0, 5.0).with_min_stable(12.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ScenarioValidationError::Generator { ref name, .. } if name == "Bad"));
    }

    #[test]
    fn rejects_non_positive_ramp() {
        let err = valid_builder()
            .generator(Generator::new("Stuck", 10.0, 0.0))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ramp limit must be positive"));
    }

    #[test]
    fn rejects_non_positive_demand_and_negative_priority() {
        let err = valid_builder()
            .block(LoadBlock::new("Zero", 0.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ScenarioValidationError::LoadBlock { .. }));

        let err = valid_builder()
            .block(LoadBlock::new("Neg", 5.0).with_priority(-1.0))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("priority"));
    }

    #[test]
    fn rejects_deadline_before_eligibility() {
        let err = valid_builder()
            .block(LoadBlock::new("Late", 5.0).with_earliest_period(3).with_deadline(2))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioValidationError::DeadlineBeforeEligible {
                block: "Late".into(),
                deadline: 2,
                earliest: 3,
            }
        );
    }

    #[test]
    fn rejects_periods_outside_horizon() {
        let err = valid_builder()
            .block(LoadBlock::new("Never", 5.0).with_earliest_period(5))
            .build()
            .unwrap_err();
        assert!(matches!(err, ScenarioValidationError::PeriodOutOfHorizon { .. }));

        let err = valid_builder().target(9, 10.0).build().unwrap_err();
        assert!(matches!(err, ScenarioValidationError::Target { period: 9, .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = valid_builder()
            .block(LoadBlock::new("L1", 5.0))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioValidationError::DuplicateName {
                kind: "load block",
                name: "L1".into()
            }
        );
    }

    #[test]
    fn rejects_mismatched_renewable_profile() {
        let err = valid_builder()
            .renewable_profile(vec![1.0, 2.0])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioValidationError::RenewableProfileLength {
                expected: 5,
                found: 2
            }
        );
    }

    #[test]
    fn rejects_nan_fields() {
        let err = valid_builder()
            .generator(Generator::new("NaN", f64::NAN, 1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ScenarioValidationError::NonFinite { field: "capacity_mw", .. }));
    }

    #[test]
    fn max_output_follows_startup_delay_and_ramp() {
        let hot = Generator::new("Hot", 50.0, 20.0);
        assert_eq!(hot.max_output_at(0), 50.0);

        let cold = Generator::new("Cold", 50.0, 20.0).with_startup_period(2);
        assert_eq!(cold.max_output_at(1), 0.0);
        assert_eq!(cold.max_output_at(2), 20.0);
        assert_eq!(cold.max_output_at(3), 40.0);
        assert_eq!(cold.max_output_at(4), 50.0);
    }

    #[test]
    fn cold_unit_synchronises_to_minimum_stable_output() {
        let steam = Generator::new("Steam", 100.0, 10.0)
            .with_min_stable(30.0)
            .with_startup_period(1);
        assert_eq!(steam.startup_ramp_mw(), 30.0);
        assert_eq!(steam.max_output_at(0), 0.0);
        assert_eq!(steam.max_output_at(1), 30.0);
        assert_eq!(steam.max_output_at(2), 40.0);

        let light = Generator::new("Light", 100.0, 10.0).with_min_stable(5.0);
        assert_eq!(light.startup_ramp_mw(), 10.0);
    }

    #[test]
    fn max_supply_includes_renewables() {
        let scenario = valid_builder()
            .renewable_profile(vec![0.0, 5.0, 5.0, 5.0, 5.0])
            .build()
            .unwrap();
        assert_eq!(scenario.max_supply_at(0), 80.0);
        assert_eq!(scenario.max_supply_at(1), 85.0);
    }

    #[test]
    fn commitment_needed_only_with_min_stable_or_startup_cost() {
        assert!(!Generator::new("A", 10.0, 1.0).needs_commitment());
        assert!(Generator::new("B", 10.0, 1.0)
            .with_min_stable(2.0)
            .needs_commitment());
        assert!(Generator::new("C", 10.0, 1.0)
            .with_costs(0.0, 100.0)
            .needs_commitment());
        let d = Generator::new("D", 10.0, 1.0).with_min_up_down(3, 0);
        assert!(d.needs_commitment());
        assert!(d.tracks_starts());
        assert!(!Generator::new("E", 10.0, 1.0)
            .with_min_up_down(1, 1)
            .needs_commitment());
    }
}
