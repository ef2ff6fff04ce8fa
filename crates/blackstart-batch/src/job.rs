use blackstart_core::Scenario;
use blackstart_scenarios::NamedScenario;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Solved,
    Infeasible,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Solved => "solved",
            JobStatus::Infeasible => "infeasible",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub job_id: String,
    pub scenario_id: String,
    pub description: Option<String>,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJobRecord {
    pub job_id: String,
    pub scenario_id: String,
    pub status: JobStatus,
    pub error: Option<String>,
    /// Infeasibility explanation for `infeasible` jobs
    pub diagnostic: Option<String>,
    pub objective: Option<f64>,
    pub solve_time_seconds: Option<f64>,
    pub output: Option<String>,
}

/// Job ids are the scenario ids, which the set loader already keeps unique.
pub fn jobs_from_scenarios(scenarios: &[NamedScenario]) -> Vec<BatchJob> {
    scenarios
        .iter()
        .map(|named| BatchJob {
            job_id: named.scenario_id.clone(),
            scenario_id: named.scenario_id.clone(),
            description: named.description.clone(),
            scenario: named.scenario.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackstart_core::{Generator, LoadBlock, ScenarioBuilder, TimeHorizon};

    #[test]
    fn jobs_from_scenarios_keeps_identifiers() {
        let scenario = ScenarioBuilder::new(TimeHorizon::new(2, 1.0))
            .generator(Generator::new("G", 10.0, 10.0))
            .block(LoadBlock::new("L", 5.0))
            .build()
            .unwrap();
        let named = vec![NamedScenario {
            scenario_id: "s1".into(),
            description: Some("first".into()),
            scenario,
        }];
        let jobs = jobs_from_scenarios(&named);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id, "s1");
        assert_eq!(jobs[0].description.as_deref(), Some("first"));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Infeasible).unwrap(),
            "\"infeasible\""
        );
    }
}
