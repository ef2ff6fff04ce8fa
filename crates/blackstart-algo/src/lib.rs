//! # blackstart-algo: Restoration Sequencing Algorithms
//!
//! Optimization of blackstart block loading: energize demand blocks as early as
//! their priorities demand without exceeding generator capacity or ramp limits.
//!
//! ## Block-Loading MILP
//!
//! | Component | Role |
//! |-----------|------|
//! | [`build_model`] | Scenario → solver-neutral [`MilpModel`] |
//! | [`SolverAdapter`] | Narrow boundary to a MILP engine ([`GoodLpAdapter`]) |
//! | [`extract_schedule`] | Raw values → [`Schedule`] |
//! | [`ScenarioRunner`] | State machine tying the pieces together |
//! | [`diagnose`] | Explains infeasible scenarios by relaxation |
//! | [`check_invariants`] | Independent post-solve schedule checks |
//!
//! ### Solver Backends
//!
//! - `solver-microlp` (default): pure Rust, no native dependencies
//! - `solver-highs`: HiGHS through `good_lp`
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use blackstart_algo::{GoodLpAdapter, RunOutcome, ScenarioRunner, SequencingOptions, SolverConfig};
//! use blackstart_core::{Generator, LoadBlock, ScenarioBuilder, TimeHorizon};
//!
//! let scenario = ScenarioBuilder::new(TimeHorizon::new(3, 1.0))
//!     .generator(Generator::new("Hydro", 40.0, 20.0))
//!     .block(LoadBlock::new("Hospital", 15.0).with_priority(5.0))
//!     .build()?;
//!
//! let mut runner = ScenarioRunner::new(
//!     scenario,
//!     SequencingOptions::default(),
//!     Arc::new(GoodLpAdapter),
//!     SolverConfig::default(),
//! )?;
//! match runner.run()? {
//!     RunOutcome::Solved(schedule) => println!("objective {}", schedule.objective),
//!     RunOutcome::Infeasible(err) => println!("{}", err),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod sequencing;

pub use sequencing::*;
