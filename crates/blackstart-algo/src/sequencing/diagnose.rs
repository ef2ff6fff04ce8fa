//! Best-effort explanation of infeasible scenarios
//!
//! Two passes: cheap necessary-condition checks on the scenario data, then
//! relaxation, which re-solves the model with one constraint class removed at a
//! time in [`ConstraintClass::RELAXATION_ORDER`]. Every class whose removal
//! restores feasibility is reported.

use std::fmt;

use blackstart_core::Scenario;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::{ConstraintClass, MilpModel, SequencingOptions};
use super::solver::{SolverAdapter, SolverConfig};

const SLACK_MW: f64 = 1e-6;

/// A necessary condition violated by the scenario data itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticFinding {
    /// Demand that must be energized by `period` exceeds the power that can
    /// possibly be available then
    InsufficientCapacity {
        period: usize,
        required_mw: f64,
        available_mw: f64,
    },
    /// A block that must be restored is larger than the per-period pickup limit
    BlockExceedsPickupLimit {
        block: String,
        demand_mw: f64,
        limit_mw: f64,
    },
    /// A target asks for more demand than is eligible by its period
    TargetUnreachable {
        period: usize,
        target_mw: f64,
        eligible_mw: f64,
    },
}

impl DiagnosticFinding {
    pub fn class(&self) -> ConstraintClass {
        match self {
            DiagnosticFinding::InsufficientCapacity { .. } => ConstraintClass::CapacityBalance,
            DiagnosticFinding::BlockExceedsPickupLimit { .. } => ConstraintClass::PickupLimit,
            DiagnosticFinding::TargetUnreachable { .. } => ConstraintClass::RestorationTarget,
        }
    }
}

impl fmt::Display for DiagnosticFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticFinding::InsufficientCapacity {
                period,
                required_mw,
                available_mw,
            } => write!(
                f,
                "{}: period {} requires {:.1} MW but at most {:.1} MW is available",
                self.class().reason(),
                period,
                required_mw,
                available_mw
            ),
            DiagnosticFinding::BlockExceedsPickupLimit {
                block,
                demand_mw,
                limit_mw,
            } => write!(
                f,
                "{}: block '{}' ({:.1} MW) exceeds the {:.1} MW limit",
                self.class().reason(),
                block,
                demand_mw,
                limit_mw
            ),
            DiagnosticFinding::TargetUnreachable {
                period,
                target_mw,
                eligible_mw,
            } => write!(
                f,
                "{}: target of {:.1} MW at period {} but only {:.1} MW is eligible",
                self.class().reason(),
                target_mw,
                period,
                eligible_mw
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfeasibilityDiagnostic {
    /// Most likely cause
    pub primary: Option<ConstraintClass>,
    pub reason: String,
    pub findings: Vec<DiagnosticFinding>,
    /// Classes whose removal makes the model feasible, in relaxation order
    pub relaxable: Vec<ConstraintClass>,
}

impl InfeasibilityDiagnostic {
    fn from_parts(findings: Vec<DiagnosticFinding>, relaxable: Vec<ConstraintClass>) -> Self {
        let (primary, reason) = match (findings.first(), relaxable.first()) {
            (Some(finding), _) => (Some(finding.class()), finding.to_string()),
            (None, Some(class)) => (Some(*class), class.reason().to_string()),
            (None, None) => (
                None,
                "no single constraint class explains the infeasibility".to_string(),
            ),
        };
        Self {
            primary,
            reason,
            findings,
            relaxable,
        }
    }
}

/// Necessary-condition checks that need no solver
pub fn static_checks(scenario: &Scenario, options: &SequencingOptions) -> Vec<DiagnosticFinding> {
    let periods = scenario.periods();
    let last = periods - 1;
    let forced_by = |deadline: Option<usize>| -> Option<usize> {
        match (deadline, options.require_full_restoration) {
            (Some(d), _) => Some(d),
            (None, true) => Some(last),
            (None, false) => None,
        }
    };

    let mut findings = Vec::new();

    for t in 0..periods {
        let required: f64 = scenario
            .blocks()
            .iter()
            .filter(|b| forced_by(b.deadline).is_some_and(|p| p <= t))
            .map(|b| b.demand_mw)
            .sum();
        let available = scenario.max_supply_at(t);
        if required > available + SLACK_MW {
            findings.push(DiagnosticFinding::InsufficientCapacity {
                period: t,
                required_mw: required,
                available_mw: available,
            });
            break;
        }
    }

    if let Some(limit) = scenario.max_pickup_mw_per_period() {
        for block in scenario.blocks() {
            if block.demand_mw > limit + SLACK_MW && forced_by(block.deadline).is_some() {
                findings.push(DiagnosticFinding::BlockExceedsPickupLimit {
                    block: block.name.clone(),
                    demand_mw: block.demand_mw,
                    limit_mw: limit,
                });
            }
        }
    }

    for target in scenario.targets() {
        let eligible: f64 = scenario
            .blocks()
            .iter()
            .filter(|b| b.earliest_period <= target.period)
            .map(|b| b.demand_mw)
            .sum();
        if target.min_restored_mw > eligible + SLACK_MW {
            findings.push(DiagnosticFinding::TargetUnreachable {
                period: target.period,
                target_mw: target.min_restored_mw,
                eligible_mw: eligible,
            });
            continue;
        }
        let available = scenario.max_supply_at(target.period);
        if target.min_restored_mw > available + SLACK_MW {
            findings.push(DiagnosticFinding::InsufficientCapacity {
                period: target.period,
                required_mw: target.min_restored_mw,
                available_mw: available,
            });
        }
    }

    findings
}

/// Static checks only
pub fn static_diagnosis(scenario: &Scenario, options: &SequencingOptions) -> InfeasibilityDiagnostic {
    InfeasibilityDiagnostic::from_parts(static_checks(scenario, options), Vec::new())
}

/// Static checks followed by one relaxed re-solve per present constraint class
pub fn diagnose(
    scenario: &Scenario,
    model: &MilpModel,
    options: &SequencingOptions,
    adapter: &dyn SolverAdapter,
    config: &SolverConfig,
) -> InfeasibilityDiagnostic {
    let findings = static_checks(scenario, options);
    let mut relaxable = Vec::new();
    for class in ConstraintClass::RELAXATION_ORDER {
        if model.count_class(class) == 0 {
            continue;
        }
        let raw = adapter.solve(&model.without_class(class), config);
        debug!(%class, status = %raw.status, "relaxed re-solve");
        if raw.status.has_solution() {
            relaxable.push(class);
        }
    }
    let diagnostic = InfeasibilityDiagnostic::from_parts(findings, relaxable);
    info!(
        primary = diagnostic.primary.map(|c| c.as_str()).unwrap_or("unknown"),
        reason = %diagnostic.reason,
        "diagnosed infeasible scenario"
    );
    diagnostic
}
