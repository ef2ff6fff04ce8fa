//! Block-energization schedule returned to callers

use std::collections::BTreeMap;
use std::fmt::Write;

use blackstart_core::{BlockId, GenId, Scenario};
use serde::{Deserialize, Serialize};

use super::solver::SolveStatus;

/// System state at the end of one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    pub period: usize,
    /// Blocks energized for the first time in this period
    pub blocks_energized: Vec<BlockId>,
    /// Total demand energized so far (MW)
    pub cumulative_demand_mw: f64,
    pub renewable_mw: f64,
    /// Output per generator (MW)
    pub dispatch: BTreeMap<GenId, f64>,
}

impl PeriodSnapshot {
    pub fn total_dispatch_mw(&self) -> f64 {
        self.dispatch.values().sum()
    }

    /// Dispatchable plus renewable supply
    pub fn total_supply_mw(&self) -> f64 {
        self.total_dispatch_mw() + self.renewable_mw
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub periods: Vec<PeriodSnapshot>,
    /// Energization period per block; `None` if the block stays dark
    pub energization: BTreeMap<BlockId, Option<usize>>,
    /// Objective value including the constant delay offset
    pub objective: f64,
    pub status: SolveStatus,
    pub solve_time_seconds: f64,
}

impl Schedule {
    pub fn energization_period(&self, block: BlockId) -> Option<usize> {
        self.energization.get(&block).copied().flatten()
    }

    pub fn unrestored_blocks(&self) -> Vec<BlockId> {
        self.energization
            .iter()
            .filter(|(_, period)| period.is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn dispatch_at(&self, generator: GenId, period: usize) -> f64 {
        self.periods
            .get(period)
            .and_then(|p| p.dispatch.get(&generator))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn restored_demand_at(&self, period: usize) -> f64 {
        self.periods
            .get(period)
            .map(|p| p.cumulative_demand_mw)
            .unwrap_or(0.0)
    }

    /// Human-readable summary
    pub fn summary(&self, scenario: &Scenario) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "Block-Loading Schedule");
        let _ = writeln!(s, "======================");
        let _ = writeln!(s, "Status: {}", self.status);
        let _ = writeln!(s, "Objective: {:.4}", self.objective);
        let _ = writeln!(s, "Solve time: {:.3} s", self.solve_time_seconds);
        let _ = writeln!(s);
        let _ = writeln!(s, "{:>6} {:>12} {:>12}  Energized", "Period", "Demand MW", "Supply MW");
        for snapshot in &self.periods {
            let names: Vec<&str> = snapshot
                .blocks_energized
                .iter()
                .filter_map(|id| scenario.block(*id))
                .map(|b| b.name.as_str())
                .collect();
            let _ = writeln!(
                s,
                "{:>6} {:>12.2} {:>12.2}  {}",
                snapshot.period,
                snapshot.cumulative_demand_mw,
                snapshot.total_supply_mw(),
                names.join(", ")
            );
        }
        let dark = self.unrestored_blocks();
        if !dark.is_empty() {
            let names: Vec<&str> = dark
                .iter()
                .filter_map(|id| scenario.block(*id))
                .map(|b| b.name.as_str())
                .collect();
            let _ = writeln!(s);
            let _ = writeln!(s, "Not restored: {}", names.join(", "));
        }
        s
    }
}
