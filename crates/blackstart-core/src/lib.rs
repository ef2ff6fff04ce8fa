//! # blackstart-core: Restoration Scenario Data Model
//!
//! Provides the immutable, invariant-checked description of a blackstart
//! restoration study: the generators available to re-energize the system, the
//! demand blocks waiting to be picked up, and the discrete time horizon both are
//! scheduled against.
//!
//! ## Design Philosophy
//!
//! Every value reaching the optimization layer has already been validated.
//! Loose input records (files, APIs) are converted at the boundary through
//! [`ScenarioBuilder`], which rejects the first violated invariant with a
//! [`ScenarioValidationError`] instead of coercing it.
//!
//! ## Quick Start
//!
//! ```
//! use blackstart_core::*;
//!
//! let scenario = ScenarioBuilder::new(TimeHorizon::new(5, 0.5))
//!     .generator(Generator::new("Hydro A", 50.0, 20.0))
//!     .generator(Generator::new("Diesel B", 30.0, 10.0).with_min_stable(5.0))
//!     .block(LoadBlock::new("Hospital feeder", 20.0).with_priority(3.0))
//!     .block(LoadBlock::new("Industrial park", 25.0).with_priority(1.0))
//!     .build()
//!     .expect("valid scenario");
//!
//! assert_eq!(scenario.generators().len(), 2);
//! assert_eq!(scenario.total_demand_mw(), 45.0);
//! ```
//!
//! ## Core Data Structures
//!
//! - [`Generator`] - Blackstart-capable or cranked unit with ramp and commitment data
//! - [`LoadBlock`] - Discrete demand block with priority and pickup window
//! - [`TimeHorizon`] - Number and length of scheduling periods
//! - [`RestorationTarget`] - Minimum cumulative demand restored by a period
//! - [`Scenario`] - Validated aggregate owned by a single optimization run

pub mod error;
pub mod scenario;

pub use error::ScenarioValidationError;
pub use scenario::{
    Generator, LoadBlock, RestorationTarget, Scenario, ScenarioBuilder, TimeHorizon,
};

use serde::{Deserialize, Serialize};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(usize);

impl GenId {
    #[inline]
    pub fn new(value: usize) -> Self {
        GenId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl BlockId {
    #[inline]
    pub fn new(value: usize) -> Self {
        BlockId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for GenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "G{}", self.0)
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "B{}", self.0)
    }
}
