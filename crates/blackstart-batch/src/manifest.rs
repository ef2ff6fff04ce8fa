use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::Path;

use crate::job::BatchJobRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchManifest {
    pub created_at: DateTime<Utc>,
    pub solver: String,
    pub num_jobs: usize,
    pub solved: usize,
    pub infeasible: usize,
    pub failed: usize,
    pub jobs: Vec<BatchJobRecord>,
}

pub fn write_batch_manifest(path: &Path, manifest: &BatchManifest) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating manifest directory '{}'", parent.display()))?;
    }
    let json =
        serde_json::to_string_pretty(manifest).context("serializing batch manifest to JSON")?;
    fs::write(path, json)
        .with_context(|| format!("writing batch manifest '{}'", path.display()))?;
    Ok(())
}

pub fn load_batch_manifest(path: &Path) -> Result<BatchManifest> {
    let file = File::open(path)
        .with_context(|| format!("opening batch manifest '{}'", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("parsing batch manifest '{}'", path.display()))
}
