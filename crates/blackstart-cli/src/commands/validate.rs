use anyhow::Result;
use blackstart_scenarios::{load_scenario_set, resolve_set};
use std::path::Path;

pub fn handle(path: &Path) -> Result<()> {
    let set = load_scenario_set(path)?;
    let resolved = resolve_set(&set)?;
    for named in &resolved {
        let scenario = &named.scenario;
        println!(
            "Scenario '{}' is valid: {} generators, {} blocks, {} periods, {:.1} MW demand, {:.1} MW capacity",
            named.scenario_id,
            scenario.generators().len(),
            scenario.blocks().len(),
            scenario.periods(),
            scenario.total_demand_mw(),
            scenario.total_capacity_mw(),
        );
    }
    Ok(())
}
