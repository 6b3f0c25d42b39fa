//! Input contract checks run before any computation.

use crate::config::SectorRule;
use crate::error::{EngineError, EngineResult};
use crate::models::{FamilyInput, MAX_CHILDREN, WorkerInput, is_valid_level};

/// Checks the parts of the input that do not depend on a sector.
pub fn check_shape(worker: &WorkerInput, family: &FamilyInput) -> EngineResult<()> {
    if worker.category.trim().is_empty() {
        return Err(EngineError::invalid_input("category", "must not be empty"));
    }
    if !is_valid_level(&worker.level) {
        return Err(EngineError::invalid_input(
            "level",
            format!("'{}' does not match LEVEL_<roman numeral>", worker.level),
        ));
    }
    if family.children > MAX_CHILDREN {
        return Err(EngineError::invalid_input(
            "children",
            format!("{} is outside 0..={MAX_CHILDREN}", family.children),
        ));
    }
    Ok(())
}

/// Checks the worker against the resolved sector: category, wage table and
/// the uniform/PPE item whitelist.
pub fn check_against_sector(worker: &WorkerInput, sector: &SectorRule) -> EngineResult<()> {
    if !sector.accepts_category(&worker.category) {
        return Err(EngineError::invalid_input(
            "category",
            format!("'{}' is not a {} category", worker.category, sector.name),
        ));
    }
    if !sector.has_table(&worker.wage_table) {
        return Err(EngineError::invalid_input(
            "wage_table",
            format!("'{}' is not a {} wage table", worker.wage_table, sector.name),
        ));
    }

    let whitelist = sector.complements.uniform.whitelist();
    if let Some(item) = worker
        .uniform_items
        .iter()
        .find(|item| !whitelist.contains(item.as_str()))
    {
        return Err(EngineError::invalid_input(
            "uniform_items",
            format!("'{item}' is not an allowed item for {}", sector.name),
        ));
    }
    Ok(())
}
