use anyhow::{anyhow, Result};
use blackstart_algo::{GoodLpAdapter, SolverBackend};
use blackstart_batch::{jobs_from_scenarios, run_batch, BatchRunnerConfig};
use blackstart_cli::BlackstartConfig;
use blackstart_scenarios::{load_scenario_set, resolve_set};
use std::path::Path;
use std::sync::Arc;

pub fn handle(
    set_path: &Path,
    out: &Path,
    threads: usize,
    backend: Option<SolverBackend>,
    config: &BlackstartConfig,
) -> Result<()> {
    let set = load_scenario_set(set_path)?;
    let scenarios = resolve_set(&set)?;
    let mut solver = config.solver_config()?;
    if let Some(backend) = backend {
        solver.backend = backend;
    }

    let summary = run_batch(&BatchRunnerConfig {
        jobs: jobs_from_scenarios(&scenarios),
        output_root: out.to_path_buf(),
        options: config.sequencing_options(),
        solver,
        adapter: Arc::new(GoodLpAdapter),
        threads,
    })?;

    println!(
        "Batch complete: {} solved, {} infeasible, {} failed",
        summary.solved, summary.infeasible, summary.failed
    );
    for record in &summary.jobs {
        let detail = record
            .error
            .as_deref()
            .or(record.diagnostic.as_deref())
            .unwrap_or("");
        println!("  {:<24} {:<10} {}", record.job_id, record.status.as_str(), detail);
    }
    println!("Manifest: {}", summary.manifest_path.display());

    if summary.failed > 0 {
        return Err(anyhow!("{} batch job(s) failed", summary.failed));
    }
    Ok(())
}
