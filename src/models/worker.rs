//! Worker, family and jurisdiction inputs.
//!
//! These are the immutable per-call inputs of a payroll computation.

use serde::{Deserialize, Serialize};

/// Upper bound accepted for the number of dependent children.
pub const MAX_CHILDREN: u8 = 10;

/// The working-day arrangement, which selects transport allowance variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// A single uninterrupted working day.
    #[default]
    Continuous,
    /// A working day split into two blocks.
    Split,
}

/// The kind of establishment the worker is employed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Establishment {
    /// Restaurants, bars, cafeterias and anything that is not a hotel.
    #[default]
    Restaurant,
    /// Hotels.
    Hotel,
}

/// Everything about the worker that drives the pay side of the computation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::WorkerInput;
///
/// let worker: WorkerInput = serde_json::from_str(r#"{
///     "category": "cocinero",
///     "wage_table": "TABLA_I",
///     "level": "LEVEL_III"
/// }"#).unwrap();
/// assert!(!worker.applies_transport);
/// assert!(worker.uniform_items.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInput {
    /// Professional category (e.g. "cocinero", "camarero", "limpiador").
    pub category: String,
    /// Wage table identifier (e.g. "TABLA_I").
    pub wage_table: String,
    /// Level within the wage table, `LEVEL_<roman numeral>`.
    pub level: String,
    /// Continuous or split working day.
    #[serde(default)]
    pub shift_type: ShiftType,
    /// Establishment type.
    #[serde(default)]
    pub establishment: Establishment,
    /// True when the workplace lies in the urban zone.
    #[serde(default)]
    pub urban_zone: bool,
    /// Training bonus applies.
    #[serde(default)]
    pub applies_training_bonus: bool,
    /// Transport allowance applies.
    #[serde(default)]
    pub applies_transport: bool,
    /// Meal allowance applies.
    #[serde(default)]
    pub applies_meal_allowance: bool,
    /// Night-shift bonus applies.
    #[serde(default)]
    pub applies_night_shift: bool,
    /// Hazard bonus applies.
    #[serde(default)]
    pub applies_hazard_pay: bool,
    /// Workwear allowance applies even without an itemized selection.
    #[serde(default)]
    pub applies_uniform: bool,
    /// Selected protective equipment or uniform items.
    #[serde(default)]
    pub uniform_items: Vec<String>,
}

impl WorkerInput {
    /// Creates a worker with every optional concept switched off.
    pub fn new(
        category: impl Into<String>,
        wage_table: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            wage_table: wage_table.into(),
            level: level.into(),
            shift_type: ShiftType::default(),
            establishment: Establishment::default(),
            urban_zone: false,
            applies_training_bonus: false,
            applies_transport: false,
            applies_meal_allowance: false,
            applies_night_shift: false,
            applies_hazard_pay: false,
            applies_uniform: false,
            uniform_items: Vec::new(),
        }
    }

    /// The key used to look up category/level expectations, e.g. `cocinero_LEVEL_III`.
    pub fn category_key(&self) -> String {
        format!("{}_{}", self.category, self.level)
    }

    /// True when a workwear allowance should be computed at all.
    pub fn wants_uniform(&self) -> bool {
        self.applies_uniform || !self.uniform_items.is_empty()
    }
}

/// Family data used for the income-tax minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FamilyInput {
    /// Number of dependent children, 0 to 10.
    #[serde(default)]
    pub children: u8,
}

impl FamilyInput {
    /// Creates family input for the given number of children.
    pub fn with_children(children: u8) -> Self {
        Self { children }
    }
}

/// Optional sector-level context used only by sector checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SectorOptions {
    /// Overtime hours worked in the month.
    #[serde(default)]
    pub overtime_hours: u32,
    /// Night hours worked in the month.
    #[serde(default)]
    pub night_hours: u32,
    /// Public holidays worked in the month.
    #[serde(default)]
    pub holidays_worked: u32,
}

/// The (region, sector) pair selecting which rules apply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jurisdiction {
    /// Region identifier.
    pub region: String,
    /// Sector identifier; the policy default applies when absent.
    #[serde(default)]
    pub sector: Option<String>,
}

impl Jurisdiction {
    /// A jurisdiction naming only a region.
    pub fn region(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            sector: None,
        }
    }

    /// A jurisdiction naming both region and sector.
    pub fn new(region: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            sector: Some(sector.into()),
        }
    }
}

/// Returns true if `level` is `LEVEL_` followed by a well-formed roman numeral.
pub fn is_valid_level(level: &str) -> bool {
    match level.strip_prefix("LEVEL_") {
        Some(numeral) => roman_value(numeral).is_some(),
        None => false,
    }
}

/// Parses a canonical roman numeral between 1 and 3999.
fn roman_value(numeral: &str) -> Option<u32> {
    if numeral.is_empty() {
        return None;
    }
    let digit = |c: char| match c {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    };
    let values: Vec<u32> = numeral.chars().map(digit).collect::<Option<_>>()?;
    let mut total = 0;
    for (i, value) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(next) if next > value => total -= *value as i64,
            _ => total += *value as i64,
        }
    }
    let total = u32::try_from(total).ok().filter(|t| (1..4000).contains(t))?;
    (to_roman(total) == numeral).then_some(total)
}

fn to_roman(mut value: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (amount, symbol) in TABLE {
        while value >= amount {
            out.push_str(symbol);
            value -= amount;
        }
    }
    out
}
