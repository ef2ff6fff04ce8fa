//! Post-solve checks of a [`Schedule`] against the physical limits of its scenario.
//!
//! Independent of the model formulation: a schedule produced by any adapter
//! (or edited by hand) can be checked here.

use std::fmt;

use blackstart_core::Scenario;
use serde::{Deserialize, Serialize};

use super::schedule::Schedule;

/// Kind of schedule violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantKind {
    /// Supply does not cover energized demand
    Capacity,
    /// Output rises faster than the ramp limit
    Ramp,
    /// Output outside `[0, capacity]`, or before the startup period
    GeneratorLimit,
    /// Output strictly between zero and the minimum stable level
    MinStable,
    /// Block energized before it was eligible, or after its deadline
    PickupWindow,
    /// More demand energized in one period than the pickup limit allows
    PickupLimit,
    /// Restoration target missed
    Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantViolation {
    pub kind: InvariantKind,
    pub period: usize,
    pub detail: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at period {}: {}", self.kind, self.period, self.detail)
    }
}

/// Every violated invariant, in period order within each kind
pub fn check_invariants(
    schedule: &Schedule,
    scenario: &Scenario,
    tolerance: f64,
) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    let mut push = |kind, period, detail: String| {
        out.push(InvariantViolation {
            kind,
            period,
            detail,
        })
    };

    for snapshot in &schedule.periods {
        let supply = snapshot.total_supply_mw();
        if supply < snapshot.cumulative_demand_mw - tolerance {
            push(
                InvariantKind::Capacity,
                snapshot.period,
                format!(
                    "supply {:.4} MW below energized demand {:.4} MW",
                    supply, snapshot.cumulative_demand_mw
                ),
            );
        }
    }

    for generator in scenario.generators() {
        let mut previous = 0.0;
        for t in 0..scenario.periods() {
            let output = schedule.dispatch_at(generator.id, t);
            if output > generator.capacity_mw + tolerance || output < -tolerance {
                push(
                    InvariantKind::GeneratorLimit,
                    t,
                    format!("{} outputs {:.4} MW", generator.name, output),
                );
            }
            if !generator.is_available_at(t) && output > tolerance {
                push(
                    InvariantKind::GeneratorLimit,
                    t,
                    format!(
                        "{} outputs {:.4} MW before its startup period {}",
                        generator.name, output, generator.startup_period
                    ),
                );
            }
            if output > tolerance && output < generator.min_stable_mw - tolerance {
                push(
                    InvariantKind::MinStable,
                    t,
                    format!(
                        "{} at {:.4} MW, minimum stable output {:.4} MW",
                        generator.name, output, generator.min_stable_mw
                    ),
                );
            }
            // A unit leaving the off state may step straight to its minimum stable output
            let limit = if previous <= tolerance {
                generator.startup_ramp_mw()
            } else {
                generator.ramp_mw_per_period
            };
            if t > 0 && output - previous > limit + tolerance {
                push(
                    InvariantKind::Ramp,
                    t,
                    format!(
                        "{} ramps {:.4} MW, limit {:.4} MW",
                        generator.name,
                        output - previous,
                        limit
                    ),
                );
            }
            previous = output;
        }
    }

    for block in scenario.blocks() {
        let Some(period) = schedule.energization_period(block.id) else {
            if let Some(deadline) = block.deadline {
                push(
                    InvariantKind::PickupWindow,
                    deadline,
                    format!("{} never energized", block.name),
                );
            }
            continue;
        };
        if period < block.earliest_period {
            push(
                InvariantKind::PickupWindow,
                period,
                format!(
                    "{} energized before earliest period {}",
                    block.name, block.earliest_period
                ),
            );
        }
        if let Some(deadline) = block.deadline.filter(|d| period > *d) {
            push(
                InvariantKind::PickupWindow,
                period,
                format!("{} energized after deadline {}", block.name, deadline),
            );
        }
    }

    if let Some(limit) = scenario.max_pickup_mw_per_period() {
        for snapshot in &schedule.periods {
            let picked: f64 = snapshot
                .blocks_energized
                .iter()
                .filter_map(|id| scenario.block(*id))
                .map(|b| b.demand_mw)
                .sum();
            if picked > limit + tolerance {
                push(
                    InvariantKind::PickupLimit,
                    snapshot.period,
                    format!("{:.4} MW energized, limit {:.4} MW", picked, limit),
                );
            }
        }
    }

    for target in scenario.targets() {
        let restored = schedule.restored_demand_at(target.period);
        if restored < target.min_restored_mw - tolerance {
            push(
                InvariantKind::Target,
                target.period,
                format!(
                    "{:.4} MW restored, target {:.4} MW",
                    restored, target.min_restored_mw
                ),
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::schedule::PeriodSnapshot;
    use crate::sequencing::solver::SolveStatus;
    use blackstart_core::{BlockId, GenId, Generator, LoadBlock, ScenarioBuilder, TimeHorizon};
    use std::collections::BTreeMap;

    fn scenario() -> Scenario {
        ScenarioBuilder::new(TimeHorizon::new(3, 1.0))
            .generator(Generator::new("G", 30.0, 10.0).with_min_stable(5.0))
            .block(LoadBlock::new("A", 8.0))
            .block(LoadBlock::new("B", 12.0).with_deadline(1))
            .build()
            .unwrap()
    }

    fn schedule(output: [f64; 3], a: Option<usize>, b: Option<usize>) -> Schedule {
        let energization: BTreeMap<_, _> =
            [(BlockId::new(0), a), (BlockId::new(1), b)].into_iter().collect();
        let demand = [8.0, 12.0];
        let mut cumulative = 0.0;
        let periods = (0..3)
            .map(|t| {
                let mut energized = Vec::new();
                for (id, period) in &energization {
                    if *period == Some(t) {
                        energized.push(*id);
                        cumulative += demand[id.value()];
                    }
                }
                PeriodSnapshot {
                    period: t,
                    blocks_energized: energized,
                    cumulative_demand_mw: cumulative,
                    renewable_mw: 0.0,
                    dispatch: [(GenId::new(0), output[t])].into_iter().collect(),
                }
            })
            .collect();
        Schedule {
            periods,
            energization,
            objective: 0.0,
            status: SolveStatus::Optimal,
            solve_time_seconds: 0.0,
        }
    }

    #[test]
    fn consistent_schedule_has_no_violations() {
        let s = schedule([10.0, 20.0, 20.0], Some(0), Some(1));
        assert!(check_invariants(&s, &scenario(), 1e-6).is_empty());
    }

    #[test]
    fn detects_ramp_and_capacity_violations() {
        let s = schedule([8.0, 10.0, 25.0], Some(0), Some(1));
        let kinds: Vec<_> = check_invariants(&s, &scenario(), 1e-6)
            .into_iter()
            .map(|v| (v.kind, v.period))
            .collect();
        assert!(kinds.contains(&(InvariantKind::Capacity, 1)));
        assert!(kinds.contains(&(InvariantKind::Ramp, 2)));
    }

    #[test]
    fn synchronising_step_is_not_a_ramp_violation() {
        let scenario = ScenarioBuilder::new(TimeHorizon::new(3, 1.0))
            .generator(
                Generator::new("G", 60.0, 10.0)
                    .with_min_stable(20.0)
                    .with_startup_period(1),
            )
            .block(LoadBlock::new("A", 8.0).with_earliest_period(1))
            .block(LoadBlock::new("B", 12.0).with_earliest_period(1))
            .build()
            .unwrap();
        let ok = schedule([0.0, 20.0, 30.0], Some(1), Some(1));
        assert!(check_invariants(&ok, &scenario, 1e-6).is_empty());

        let too_fast = schedule([0.0, 20.0, 35.0], Some(1), Some(1));
        let kinds: Vec<_> = check_invariants(&too_fast, &scenario, 1e-6)
            .into_iter()
            .map(|v| (v.kind, v.period))
            .collect();
        assert_eq!(kinds, vec![(InvariantKind::Ramp, 2)]);
    }

    #[test]
    fn detects_min_stable_and_missed_deadline() {
        let s = schedule([2.0, 8.0, 8.0], Some(0), None);
        let kinds: Vec<_> = check_invariants(&s, &scenario(), 1e-6)
            .into_iter()
            .map(|v| v.kind)
            .collect();
        assert!(kinds.contains(&InvariantKind::MinStable));
        assert!(kinds.contains(&InvariantKind::PickupWindow));
    }
}
