//! Runner state transitions driven by a scripted adapter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blackstart_algo::{
    ExtractionInconsistencyError, MilpModel, RawSolution, RunError, RunOutcome, RunState,
    ScenarioRunner, SequencingOptions, SolveStatus, SolverAdapter, SolverConfig, VarKind,
};
use blackstart_core::{BlockId, Generator, LoadBlock, Scenario, ScenarioBuilder, TimeHorizon};

#[derive(Debug, Clone, Copy)]
enum Script {
    /// Every variable at its upper bound
    UpperBounds,
    /// Upper bounds, but the first binary at 0.5
    Fractional,
    /// Report a status with no values
    Status(SolveStatus),
}

struct MockAdapter {
    script: Script,
    calls: AtomicUsize,
}

impl MockAdapter {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }
}

impl SolverAdapter for MockAdapter {
    fn id(&self) -> &str {
        "mock"
    }

    fn solve(&self, model: &MilpModel, _config: &SolverConfig) -> RawSolution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut values: Vec<f64> = model.variables.iter().map(|v| v.upper).collect();
        match self.script {
            Script::UpperBounds => {}
            Script::Fractional => {
                if let Some(idx) = model.variables.iter().position(|v| v.kind == VarKind::Binary) {
                    values[idx] = 0.5;
                }
            }
            Script::Status(status) => {
                return RawSolution::failed(status, format!("scripted {}", status), Duration::ZERO)
            }
        }
        RawSolution {
            status: SolveStatus::Optimal,
            objective: None,
            values,
            solve_time: Duration::from_millis(1),
            message: "scripted".into(),
        }
    }
}

fn scenario() -> Scenario {
    ScenarioBuilder::new(TimeHorizon::new(3, 1.0))
        .generator(Generator::new("G", 40.0, 40.0))
        .block(LoadBlock::new("A", 10.0))
        .block(LoadBlock::new("B", 10.0).with_earliest_period(1))
        .build()
        .unwrap()
}

fn runner(adapter: Arc<MockAdapter>, options: SequencingOptions) -> ScenarioRunner {
    ScenarioRunner::new(scenario(), options, adapter, SolverConfig::default()).unwrap()
}

#[test]
fn solved_run_reaches_solved_state_once() {
    let adapter = MockAdapter::new(Script::UpperBounds);
    let mut runner = runner(adapter.clone(), SequencingOptions::default());
    assert_eq!(runner.state(), RunState::Built);

    let outcome = runner.run().unwrap();
    assert_eq!(runner.state(), RunState::Solved);
    let schedule = outcome.schedule().unwrap();
    assert_eq!(schedule.energization_period(BlockId::new(0)), Some(0));
    assert_eq!(schedule.energization_period(BlockId::new(1)), Some(1));

    let err = runner.run().unwrap_err();
    assert_eq!(
        err,
        RunError::InvalidState {
            found: RunState::Solved
        }
    );
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn solver_error_moves_to_error_state() {
    let adapter = MockAdapter::new(Script::Status(SolveStatus::SolverError));
    let mut runner = runner(adapter, SequencingOptions::default());
    match runner.run() {
        Err(RunError::Solver(err)) => {
            assert_eq!(err.status, SolveStatus::SolverError);
            assert_eq!(err.message, "scripted solver_error");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(runner.state(), RunState::Error);
}

#[test]
fn unbounded_is_a_solver_error() {
    let adapter = MockAdapter::new(Script::Status(SolveStatus::Unbounded));
    let mut runner = runner(adapter, SequencingOptions::default());
    assert!(matches!(
        runner.run(),
        Err(RunError::Solver(ref err)) if err.status == SolveStatus::Unbounded
    ));
    assert_eq!(runner.state(), RunState::Error);
}

#[test]
fn fractional_values_are_an_extraction_error() {
    let adapter = MockAdapter::new(Script::Fractional);
    let mut runner = runner(adapter, SequencingOptions::default());
    assert!(matches!(
        runner.run(),
        Err(RunError::Extraction(
            ExtractionInconsistencyError::FractionalBinary { .. }
        ))
    ));
    assert_eq!(runner.state(), RunState::Error);
}

#[test]
fn infeasible_without_diagnosis_skips_relaxation() {
    let adapter = MockAdapter::new(Script::Status(SolveStatus::Infeasible));
    let options = SequencingOptions {
        diagnose: false,
        ..SequencingOptions::default()
    };
    let mut runner = runner(adapter.clone(), options);
    let outcome = runner.run().unwrap();
    assert_eq!(runner.state(), RunState::Infeasible);
    match outcome {
        RunOutcome::Infeasible(err) => assert!(err.diagnostic.relaxable.is_empty()),
        RunOutcome::Solved(_) => panic!("expected infeasible"),
    }
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn infeasible_with_diagnosis_resolves_each_present_class() {
    let adapter = MockAdapter::new(Script::Status(SolveStatus::Infeasible));
    let mut runner = runner(adapter.clone(), SequencingOptions::default());
    let outcome = runner.run().unwrap();
    assert!(matches!(outcome, RunOutcome::Infeasible(_)));
    // FullRestoration, CapacityBalance and Ramp are present; one re-solve each
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1 + 3);
}
