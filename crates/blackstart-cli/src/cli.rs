use clap::{Parser, Subcommand};
use std::path::PathBuf;

use blackstart_algo::SolverBackend;

#[derive(Parser, Debug)]
#[command(name = "blackstart", version, about = "Blackstart block-loading sequencer")]
pub struct Cli {
    /// Set the logging level (overrides the config file)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute an optimal block-energization schedule for one scenario
    Solve {
        /// Scenario file (JSON or YAML)
        scenario: PathBuf,
        /// Write the schedule JSON here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// MILP backend: microlp or highs
        #[arg(long)]
        backend: Option<SolverBackend>,
        /// Solver time limit in seconds
        #[arg(long)]
        time_limit: Option<f64>,
        /// Weight of operating cost relative to restoration delay
        #[arg(long)]
        cost_weight: Option<f64>,
        /// Allow blocks to remain unrestored at the end of the horizon
        #[arg(long)]
        allow_partial: bool,
        /// Skip relaxation diagnosis when the scenario is infeasible
        #[arg(long)]
        no_diagnose: bool,
    },
    /// Load and validate a scenario or scenario set without solving
    Validate {
        /// Scenario or scenario-set file (JSON or YAML)
        scenario: PathBuf,
    },
    /// Solve every scenario of a set in parallel
    Batch {
        /// Scenario-set file (JSON or YAML)
        set: PathBuf,
        /// Output directory for schedules and the batch manifest
        #[arg(long)]
        out: PathBuf,
        /// Number of worker threads (0 = all CPUs)
        #[arg(long, default_value_t = 0)]
        threads: usize,
        /// MILP backend: microlp or highs
        #[arg(long)]
        backend: Option<SolverBackend>,
    },
}
