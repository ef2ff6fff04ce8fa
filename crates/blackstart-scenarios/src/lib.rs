pub mod spec;

pub use spec::{
    load_scenario_file, load_scenario_set, resolve_scenario, resolve_set, validate,
    GeneratorSpec, HorizonSpec, LoadBlockSpec, NamedScenario, ScenarioFile, ScenarioSet,
    TargetSpec,
};
