//! `blackstart.toml` configuration
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Command-line flags override file values.

use anyhow::{anyhow, Context, Result};
use blackstart_algo::{SequencingOptions, SolverBackend, SolverConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BlackstartConfig {
    #[serde(default)]
    pub solver: SolverSection,
    #[serde(default)]
    pub sequencing: SequencingSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverSection {
    #[serde(default)]
    pub backend: SolverBackend,
    /// Solver timeout in seconds (0 = no timeout)
    #[serde(default = "default_time_limit")]
    pub time_limit_seconds: f64,
    #[serde(default = "default_mip_gap")]
    pub mip_gap: f64,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            backend: SolverBackend::default(),
            time_limit_seconds: default_time_limit(),
            mip_gap: default_mip_gap(),
            verbose: false,
        }
    }
}

fn default_time_limit() -> f64 {
    60.0
}

fn default_mip_gap() -> f64 {
    1e-4
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequencingSection {
    #[serde(default = "default_true")]
    pub require_full_restoration: bool,
    #[serde(default)]
    pub cost_weight: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_true")]
    pub diagnose: bool,
}

impl Default for SequencingSection {
    fn default() -> Self {
        Self {
            require_full_restoration: true,
            cost_weight: 0.0,
            tolerance: default_tolerance(),
            diagnose: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tolerance() -> f64 {
    1e-6
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BlackstartConfig {
    pub fn solver_config(&self) -> Result<SolverConfig> {
        let limit = self.solver.time_limit_seconds;
        if !limit.is_finite() || limit < 0.0 {
            return Err(anyhow!("time limit must be a non-negative number, got {}", limit));
        }
        Ok(SolverConfig {
            backend: self.solver.backend,
            time_limit: (limit > 0.0).then(|| Duration::from_secs_f64(limit)),
            mip_gap: self.solver.mip_gap,
            verbose: self.solver.verbose,
        })
    }

    pub fn sequencing_options(&self) -> SequencingOptions {
        SequencingOptions {
            require_full_restoration: self.sequencing.require_full_restoration,
            cost_weight: self.sequencing.cost_weight,
            tolerance: self.sequencing.tolerance,
            diagnose: self.sequencing.diagnose,
        }
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| anyhow!("invalid log level '{}'", self.logging.level))
    }
}

/// Load the configuration file, or defaults when no path is given
pub fn load_config(path: Option<&Path>) -> Result<BlackstartConfig> {
    let Some(path) = path else {
        return Ok(BlackstartConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config '{}'", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing config '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: BlackstartConfig = toml::from_str("").unwrap();
        assert_eq!(config, BlackstartConfig::default());
        assert!(config.sequencing_options().require_full_restoration);
        assert_eq!(
            config.solver_config().unwrap().time_limit,
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn sections_override_defaults() {
        let config: BlackstartConfig = toml::from_str(
            r#"
[solver]
backend = "highs"
time_limit_seconds = 0.0

[sequencing]
require_full_restoration = false
cost_weight = 0.25

[logging]
level = "debug"
"#,
        )
        .unwrap();
        let solver = config.solver_config().unwrap();
        assert_eq!(solver.backend, SolverBackend::Highs);
        assert_eq!(solver.time_limit, None);
        let options = config.sequencing_options();
        assert!(!options.require_full_restoration);
        assert_eq!(options.cost_weight, 0.25);
        assert!(options.diagnose);
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = BlackstartConfig::default();
        config.logging.level = "loud".into();
        assert!(config.log_level().is_err());
    }
}
