use anyhow::{anyhow, Context, Result};
use blackstart_core::{Generator, LoadBlock, Scenario, ScenarioBuilder, TimeHorizon};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A single restoration study as written in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub scenario_id: Option<String>,
    pub description: Option<String>,
    pub horizon: HorizonSpec,
    #[serde(default)]
    pub generators: Vec<GeneratorSpec>,
    #[serde(default)]
    pub blocks: Vec<LoadBlockSpec>,
    #[serde(default)]
    pub renewable_mw: Vec<f64>,
    pub max_pickup_mw_per_period: Option<f64>,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonSpec {
    pub periods: usize,
    #[serde(default = "default_period_hours")]
    pub period_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSpec {
    pub name: String,
    pub capacity_mw: f64,
    #[serde(default)]
    pub min_stable_mw: f64,
    pub ramp_mw_per_period: f64,
    #[serde(default)]
    pub startup_period: usize,
    #[serde(default)]
    pub marginal_cost: f64,
    #[serde(default)]
    pub startup_cost: f64,
    #[serde(default)]
    pub min_on_periods: usize,
    #[serde(default)]
    pub min_off_periods: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBlockSpec {
    pub name: String,
    pub demand_mw: f64,
    #[serde(default = "default_priority")]
    pub priority: f64,
    #[serde(default)]
    pub earliest_period: usize,
    pub deadline: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub period: usize,
    pub min_restored_mw: f64,
}

/// Several independent studies sharing one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub version: Option<u32>,
    pub scenarios: Vec<ScenarioFile>,
}

/// A validated scenario together with its file-level identity.
#[derive(Debug, Clone)]
pub struct NamedScenario {
    pub scenario_id: String,
    pub description: Option<String>,
    pub scenario: Scenario,
}

fn default_period_hours() -> f64 {
    1.0
}

fn default_priority() -> f64 {
    1.0
}

fn read_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {} '{}'", what, path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).with_context(|| format!("parsing {} yaml", what))
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).with_context(|| format!("parsing {} json", what))
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .with_context(|| format!("parsing {}", what)),
    }
}

pub fn load_scenario_file(path: &Path) -> Result<ScenarioFile> {
    read_document(path, "scenario file")
}

/// Load a scenario set; a file holding a single scenario becomes a one-entry
/// set whose id defaults to the file stem.
pub fn load_scenario_set(path: &Path) -> Result<ScenarioSet> {
    let set_err = match read_document::<ScenarioSet>(path, "scenario set") {
        Ok(set) => return Ok(set),
        Err(err) => err,
    };
    if has_scenarios_key(path) {
        return Err(set_err);
    }
    let mut single = load_scenario_file(path)?;
    if single.scenario_id.is_none() {
        single.scenario_id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string);
    }
    Ok(ScenarioSet {
        version: None,
        scenarios: vec![single],
    })
}

fn has_scenarios_key(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .and_then(|data| serde_yaml::from_str::<serde_yaml::Value>(&data).ok())
        .is_some_and(|doc| doc.get("scenarios").is_some())
}

/// Convert a permissive record into a validated [`Scenario`].
///
/// Ids are assigned by position. Every value goes through the core
/// invariant checks; nothing is clamped or defaulted past the serde defaults.
pub fn resolve_scenario(file: &ScenarioFile) -> Result<Scenario> {
    let mut builder = ScenarioBuilder::new(TimeHorizon::new(
        file.horizon.periods,
        file.horizon.period_hours,
    ));
    for spec in &file.generators {
        builder = builder.generator(
            Generator::new(spec.name.clone(), spec.capacity_mw, spec.ramp_mw_per_period)
                .with_min_stable(spec.min_stable_mw)
                .with_startup_period(spec.startup_period)
                .with_costs(spec.marginal_cost, spec.startup_cost)
                .with_min_up_down(spec.min_on_periods, spec.min_off_periods),
        );
    }
    for spec in &file.blocks {
        let mut block = LoadBlock::new(spec.name.clone(), spec.demand_mw)
            .with_priority(spec.priority)
            .with_earliest_period(spec.earliest_period);
        if let Some(deadline) = spec.deadline {
            block = block.with_deadline(deadline);
        }
        builder = builder.block(block);
    }
    if !file.renewable_mw.is_empty() {
        builder = builder.renewable_profile(file.renewable_mw.clone());
    }
    if let Some(limit) = file.max_pickup_mw_per_period {
        builder = builder.max_pickup_per_period(limit);
    }
    for target in &file.targets {
        builder = builder.target(target.period, target.min_restored_mw);
    }
    let label = file.scenario_id.as_deref().unwrap_or("<unnamed>");
    builder
        .build()
        .with_context(|| format!("validating scenario '{}'", label))
}

pub fn resolve_set(set: &ScenarioSet) -> Result<Vec<NamedScenario>> {
    if set.scenarios.is_empty() {
        return Err(anyhow!("scenario set contains no scenarios"));
    }
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(set.scenarios.len());
    for (idx, file) in set.scenarios.iter().enumerate() {
        let scenario_id = match file.scenario_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            Some(_) => return Err(anyhow!("scenario_id cannot be empty")),
            None => return Err(anyhow!("scenario #{} is missing a scenario_id", idx)),
        };
        // Ids name output directories in batch runs
        if scenario_id.contains(['/', '\\']) || scenario_id == "." || scenario_id == ".." {
            return Err(anyhow!(
                "scenario_id '{}' must not contain path separators",
                scenario_id
            ));
        }
        if !seen.insert(scenario_id.clone()) {
            return Err(anyhow!("duplicate scenario_id '{}' in set", scenario_id));
        }
        let scenario = resolve_scenario(file)?;
        resolved.push(NamedScenario {
            scenario_id,
            description: file.description.clone(),
            scenario,
        });
    }
    Ok(resolved)
}

pub fn validate(set: &ScenarioSet) -> Result<()> {
    resolve_set(set).map(|_| ())
}
