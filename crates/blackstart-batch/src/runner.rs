use crate::job::{BatchJob, BatchJobRecord, JobStatus};
use crate::manifest::{write_batch_manifest, BatchManifest};
use anyhow::{anyhow, Context, Result};
use blackstart_algo::{RunOutcome, ScenarioRunner, SequencingOptions, SolverAdapter, SolverConfig};
use chrono::Utc;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Settings shared by every job of a batch
pub struct BatchRunnerConfig {
    pub jobs: Vec<BatchJob>,
    pub output_root: PathBuf,
    pub options: SequencingOptions,
    pub solver: SolverConfig,
    pub adapter: Arc<dyn SolverAdapter>,
    /// Worker threads; 0 uses every CPU
    pub threads: usize,
}

/// Counts and manifest location returned after the run
pub struct BatchSummary {
    pub solved: usize,
    pub infeasible: usize,
    pub failed: usize,
    pub manifest_path: PathBuf,
    pub jobs: Vec<BatchJobRecord>,
}

pub fn run_batch(config: &BatchRunnerConfig) -> Result<BatchSummary> {
    fs::create_dir_all(&config.output_root).with_context(|| {
        format!(
            "creating batch output root '{}'",
            config.output_root.display()
        )
    })?;

    let thread_count = if config.threads == 0 {
        num_cpus::get()
    } else {
        config.threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building Rayon thread pool for batch runs")?;

    info!(jobs = config.jobs.len(), threads = thread_count, "starting batch");
    let job_records: Vec<BatchJobRecord> = pool.install(|| {
        config
            .jobs
            .par_iter()
            .map(|job| run_job(job, config))
            .collect()
    });

    let count = |status: JobStatus| job_records.iter().filter(|r| r.status == status).count();
    let solved = count(JobStatus::Solved);
    let infeasible = count(JobStatus::Infeasible);
    let failed = count(JobStatus::Error);

    let manifest = BatchManifest {
        created_at: Utc::now(),
        solver: config.solver.backend.to_string(),
        num_jobs: job_records.len(),
        solved,
        infeasible,
        failed,
        jobs: job_records.clone(),
    };
    let manifest_path = config.output_root.join("batch_manifest.json");
    write_batch_manifest(&manifest_path, &manifest)?;
    info!(solved, infeasible, failed, manifest = %manifest_path.display(), "batch finished");
    Ok(BatchSummary {
        solved,
        infeasible,
        failed,
        manifest_path,
        jobs: job_records,
    })
}

/// Solve one scenario and write its schedule (or diagnostic) under
/// `output_root/<job_id>/`. Failures are recorded, never propagated.
fn run_job(job: &BatchJob, config: &BatchRunnerConfig) -> BatchJobRecord {
    let mut record = BatchJobRecord {
        job_id: job.job_id.clone(),
        scenario_id: job.scenario_id.clone(),
        status: JobStatus::Error,
        error: None,
        diagnostic: None,
        objective: None,
        solve_time_seconds: None,
        output: None,
    };
    let job_dir = config.output_root.join(&job.job_id);

    let result = (|| -> Result<()> {
        if !is_plain_name(&job.job_id) {
            return Err(anyhow!(
                "job id '{}' is not a plain directory name",
                job.job_id
            ));
        }
        let mut runner = ScenarioRunner::new(
            job.scenario.clone(),
            config.options.clone(),
            config.adapter.clone(),
            config.solver.clone(),
        )
        .context("building sequencing model")?;
        match runner.run().context("running sequencing model")? {
            RunOutcome::Solved(schedule) => {
                let path = job_dir.join("schedule.json");
                write_json(&path, &schedule)?;
                record.status = JobStatus::Solved;
                record.objective = Some(schedule.objective);
                record.solve_time_seconds = Some(schedule.solve_time_seconds);
                record.output = Some(path.display().to_string());
            }
            RunOutcome::Infeasible(err) => {
                let path = job_dir.join("diagnostic.json");
                write_json(&path, &err.diagnostic)?;
                record.status = JobStatus::Infeasible;
                record.diagnostic = Some(err.diagnostic.reason.clone());
                record.output = Some(path.display().to_string());
            }
        }
        Ok(())
    })();

    if let Err(err) = result {
        warn!(job = %job.job_id, error = %format!("{:#}", err), "batch job failed");
        record.status = JobStatus::Error;
        record.error = Some(format!("{:#}", err));
    }
    record
}

fn is_plain_name(id: &str) -> bool {
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !id.contains(['/', '\\'])
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating job directory '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("serializing job output")?;
    fs::write(path, json).with_context(|| format!("writing '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::load_batch_manifest;
    use blackstart_algo::{MilpModel, RawSolution, SolveStatus};
    use blackstart_core::{Generator, LoadBlock, Scenario, ScenarioBuilder, TimeHorizon};
    use std::time::Duration;
    use tempfile::tempdir;

    /// Sets every variable to its upper bound; horizons longer than two
    /// periods fail.
    struct UpperBoundAdapter;

    impl SolverAdapter for UpperBoundAdapter {
        fn id(&self) -> &str {
            "upper-bound"
        }

        fn solve(&self, model: &MilpModel, _config: &SolverConfig) -> RawSolution {
            if model.index.periods > 2 {
                return RawSolution::failed(SolveStatus::SolverError, "too long", Duration::ZERO);
            }
            let values: Vec<f64> = model.variables.iter().map(|v| v.upper).collect();
            RawSolution {
                status: SolveStatus::Optimal,
                objective: Some(model.objective_value(&values)),
                values,
                solve_time: Duration::ZERO,
                message: "ok".into(),
            }
        }
    }

    fn job(id: &str, periods: usize) -> BatchJob {
        let scenario: Scenario = ScenarioBuilder::new(TimeHorizon::new(periods, 1.0))
            .generator(Generator::new("G", 10.0, 10.0))
            .block(LoadBlock::new("L", 5.0))
            .build()
            .unwrap();
        BatchJob {
            job_id: id.into(),
            scenario_id: id.into(),
            description: None,
            scenario,
        }
    }

    #[test]
    fn batch_records_each_job_and_writes_manifest() {
        let dir = tempdir().unwrap();
        let config = BatchRunnerConfig {
            jobs: vec![job("short", 2), job("long", 5)],
            output_root: dir.path().to_path_buf(),
            options: SequencingOptions::default(),
            solver: SolverConfig::default(),
            adapter: Arc::new(UpperBoundAdapter),
            threads: 2,
        };
        let summary = run_batch(&config).unwrap();
        assert_eq!(summary.solved, 1);
        assert_eq!(summary.failed, 1);
        assert!(dir.path().join("short").join("schedule.json").exists());

        let manifest = load_batch_manifest(&summary.manifest_path).unwrap();
        assert_eq!(manifest.num_jobs, 2);
        let long = manifest.jobs.iter().find(|r| r.job_id == "long").unwrap();
        assert_eq!(long.status, JobStatus::Error);
        assert!(long.error.as_deref().unwrap().contains("too long"));
    }

    #[test]
    fn job_ids_cannot_escape_the_output_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("out");
        let config = BatchRunnerConfig {
            jobs: vec![job("../escape", 2)],
            output_root: root,
            options: SequencingOptions::default(),
            solver: SolverConfig::default(),
            adapter: Arc::new(UpperBoundAdapter),
            threads: 1,
        };
        let summary = run_batch(&config).unwrap();
        assert_eq!(summary.failed, 1);
        assert!(!dir.path().join("escape").exists());
        assert!(summary.jobs[0]
            .error
            .as_deref()
            .unwrap()
            .contains("not a plain directory name"));
    }

    #[test]
    fn plain_names_are_accepted() {
        assert!(is_plain_name("island-a"));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("a/b"));
        assert!(!is_plain_name(""));
    }
}
