//! Published reference schedules used to cross-check registered brackets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EngineResult;

use super::loader::{parse_yaml, read_file};
use super::types::TaxBracket;

fn default_rate_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_boundary_tolerance() -> Decimal {
    Decimal::new(1, 0)
}

/// A bracket schedule transcribed from an official source, with the
/// tolerances a registered schedule may deviate by.
///
/// # Example
///
/// ```
/// use payroll_engine::config::ReferenceSchedule;
/// use rust_decimal::Decimal;
///
/// let reference = ReferenceSchedule::from_yaml(
///     "source: BOE\nbrackets:\n  - { up_to: 12450, rate: 19 }\n  - { rate: 24 }\n",
/// )
/// .unwrap();
/// assert_eq!(reference.brackets.len(), 2);
/// assert_eq!(reference.rate_tolerance, Decimal::new(1, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceSchedule {
    /// Where the schedule was transcribed from.
    #[serde(default)]
    pub source: String,
    /// Brackets in ascending order, unbounded last.
    pub brackets: Vec<TaxBracket>,
    /// Largest accepted rate difference, in percentage points.
    #[serde(default = "default_rate_tolerance")]
    pub rate_tolerance: Decimal,
    /// Largest accepted boundary difference, in currency units.
    #[serde(default = "default_boundary_tolerance")]
    pub boundary_tolerance: Decimal,
}

impl ReferenceSchedule {
    /// Parses a reference schedule from YAML.
    pub fn from_yaml(yaml: &str) -> EngineResult<Self> {
        parse_yaml(yaml, "reference schedule")
    }

    /// Loads a reference schedule file.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = read_file(path)?;
        parse_yaml(&content, &path.display().to_string())
    }
}
