//! Validation errors for restoration scenarios
//!
//! [`ScenarioValidationError`] is raised before any model is built. Each
//! variant names the offending element so callers can point users at the
//! record to fix.

use thiserror::Error;

/// Malformed or inconsistent scenario input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioValidationError {
    /// The time horizon has no periods
    #[error("time horizon must contain at least one period")]
    EmptyHorizon,

    /// Period duration is zero, negative, or not finite
    #[error("period duration must be a positive number of hours, got {0}")]
    InvalidPeriodLength(f64),

    /// A numeric field is NaN or infinite
    #[error("{entity}: field `{field}` must be finite")]
    NonFinite { entity: String, field: &'static str },

    /// Generator violates `capacity >= min_stable >= 0` or `ramp > 0`
    #[error("generator '{name}': {reason}")]
    Generator { name: String, reason: String },

    /// Load block violates `demand > 0` or `priority >= 0`
    #[error("load block '{name}': {reason}")]
    LoadBlock { name: String, reason: String },

    /// Deadline falls before the block becomes eligible
    #[error("load block '{block}': deadline period {deadline} precedes earliest eligible period {earliest}")]
    DeadlineBeforeEligible {
        block: String,
        deadline: usize,
        earliest: usize,
    },

    /// A period index lies outside `0..periods`
    #[error("{entity}: {field} {period} is outside the horizon of {periods} period(s)")]
    PeriodOutOfHorizon {
        entity: String,
        field: &'static str,
        period: usize,
        periods: usize,
    },

    /// Two elements of the same kind share a name
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    /// Renewable profile length does not match the horizon
    #[error("renewable profile has {found} value(s) but the horizon has {expected} period(s)")]
    RenewableProfileLength { expected: usize, found: usize },

    /// Renewable infeed is negative
    #[error("renewable infeed at period {period} is negative ({value} MW)")]
    NegativeRenewable { period: usize, value: f64 },

    /// Per-period pickup limit is not positive
    #[error("pickup limit must be positive, got {0} MW")]
    InvalidPickupLimit(f64),

    /// Restoration target is malformed
    #[error("restoration target at period {period}: {reason}")]
    Target { period: usize, reason: String },

    /// The scenario contains no load blocks
    #[error("scenario must contain at least one load block")]
    NoLoadBlocks,

    /// A model-building option is out of range
    #[error("invalid option '{option}': {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_element() {
        let err = ScenarioValidationError::DeadlineBeforeEligible {
            block: "Feeder 7".into(),
            deadline: 2,
            earliest: 3,
        };
        let text = err.to_string();
        assert!(text.contains("Feeder 7"));
        assert!(text.contains("deadline period 2"));
        assert!(text.contains("earliest eligible period 3"));
    }

    #[test]
    fn horizon_error_display() {
        assert!(ScenarioValidationError::EmptyHorizon
            .to_string()
            .contains("at least one period"));
    }
}
