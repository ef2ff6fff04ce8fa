use blackstart_cli::{load_config, Cli, Commands};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    let level = match cli.log_level.map(Ok).unwrap_or_else(|| config.log_level()) {
        Ok(level) => level,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    // Logs go to stderr so schedules printed on stdout stay machine-readable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: could not install log subscriber: {err}");
    }

    let result = match &cli.command {
        Commands::Solve {
            scenario,
            out,
            backend,
            time_limit,
            cost_weight,
            allow_partial,
            no_diagnose,
        } => {
            info!("Solving scenario {}", scenario.display());
            let overrides = commands::solve::Overrides {
                backend: *backend,
                time_limit: *time_limit,
                cost_weight: *cost_weight,
                allow_partial: *allow_partial,
                no_diagnose: *no_diagnose,
            };
            commands::solve::handle(scenario, out.as_deref(), &overrides, &config)
        }
        Commands::Validate { scenario } => {
            info!("Validating scenario {}", scenario.display());
            commands::validate::handle(scenario)
        }
        Commands::Batch {
            set,
            out,
            threads,
            backend,
        } => {
            info!("Running batch {}", set.display());
            commands::batch::handle(set, out, *threads, *backend, &config)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
