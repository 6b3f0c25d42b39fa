//! Rule-set types.
//!
//! These are the canonical, already-normalized shapes the calculation code
//! reads. Raw file shapes live in the loader and never leave it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{ContributionConcept, Establishment, ShiftType};

/// One bracket of a progressive schedule.
///
/// `up_to: None` marks the unbounded terminal bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Upper bound of the bracket, absent for the terminal bracket.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Marginal rate in percent.
    pub rate: Decimal,
}

impl TaxBracket {
    /// A bounded bracket.
    pub fn bounded(up_to: Decimal, rate: Decimal) -> Self {
        Self {
            up_to: Some(up_to),
            rate,
        }
    }

    /// The unbounded terminal bracket.
    pub fn unbounded(rate: Decimal) -> Self {
        Self { up_to: None, rate }
    }

    /// True for the terminal bracket.
    pub fn is_unbounded(&self) -> bool {
        self.up_to.is_none()
    }
}

/// Family minimum step amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMinimums {
    /// Amount for the first child.
    pub first_child: Decimal,
    /// Amount for the second child.
    pub second_child: Decimal,
    /// Amount for the third child.
    pub third_child: Decimal,
    /// Amount for every child beyond the third.
    pub each_additional: Decimal,
}

/// Personal and family minimums plus the deductible-expenses constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxMinimums {
    /// Personal minimum.
    pub personal: Decimal,
    /// Deductible-expenses constant.
    pub deductible_expenses: Decimal,
    /// Family minimum steps.
    pub family: FamilyMinimums,
}

/// Employee contribution rates in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRates {
    /// Common contingencies.
    pub common_contingencies: Decimal,
    /// Unemployment.
    pub unemployment: Decimal,
    /// Vocational training.
    pub training: Decimal,
    /// Intergenerational equity fund.
    pub intergenerational_equity: Decimal,
}

impl EmployeeRates {
    /// Rates paired with their concept, in report order.
    pub fn named(&self) -> [(ContributionConcept, Decimal); 4] {
        [
            (ContributionConcept::CommonContingencies, self.common_contingencies),
            (ContributionConcept::Unemployment, self.unemployment),
            (ContributionConcept::Training, self.training),
            (ContributionConcept::IntergenerationalEquity, self.intergenerational_equity),
        ]
    }

    /// Sum of all rates.
    pub fn total(&self) -> Decimal {
        self.named().iter().map(|(_, rate)| *rate).sum()
    }
}

/// Employer contribution rates in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerRates {
    /// Common contingencies.
    pub common_contingencies: Decimal,
    /// Occupational accidents and diseases. Must never be zero.
    pub occupational_accident: Decimal,
    /// Unemployment.
    pub unemployment: Decimal,
    /// Wage guarantee fund.
    pub wage_guarantee: Decimal,
    /// Vocational training.
    pub training: Decimal,
    /// Intergenerational equity fund.
    pub intergenerational_equity: Decimal,
}

impl EmployerRates {
    /// Rates paired with their concept, in report order.
    pub fn named(&self) -> [(ContributionConcept, Decimal); 6] {
        [
            (ContributionConcept::CommonContingencies, self.common_contingencies),
            (ContributionConcept::OccupationalAccident, self.occupational_accident),
            (ContributionConcept::Unemployment, self.unemployment),
            (ContributionConcept::WageGuarantee, self.wage_guarantee),
            (ContributionConcept::Training, self.training),
            (ContributionConcept::IntergenerationalEquity, self.intergenerational_equity),
        ]
    }

    /// Sum of all rates.
    pub fn total(&self) -> Decimal {
        self.named().iter().map(|(_, rate)| *rate).sum()
    }
}

/// Contribution base limits and rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialInsurance {
    /// Minimum monthly contribution base.
    pub min_base: Decimal,
    /// Maximum monthly contribution base.
    pub max_base: Decimal,
    /// Employee rates.
    pub employee: EmployeeRates,
    /// Employer rates.
    pub employer: EmployerRates,
}

/// A region's tax schedules, minimums and social-insurance parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRule {
    /// Display name.
    pub name: String,
    /// State schedule.
    pub state_brackets: Vec<TaxBracket>,
    /// Regional schedule.
    pub regional_brackets: Vec<TaxBracket>,
    /// Minimums used by the tax engine.
    pub minimums: TaxMinimums,
    /// Contribution base limits and rates.
    pub social_insurance: SocialInsurance,
    /// Percentage of the annual taxable base deducted as social insurance
    /// before minimums (6.48 for the general regime).
    pub assumed_insurance_rate: Decimal,
}

/// Wage-table entry for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageEntry {
    /// Monthly base wage.
    pub salary: Decimal,
    /// Overtime hourly rate, informational.
    #[serde(default)]
    pub overtime_hour: Option<Decimal>,
    /// Holiday rate, informational.
    #[serde(default)]
    pub holiday: Option<Decimal>,
}

/// Wage tables: table id to level to entry.
pub type WageTables = BTreeMap<String, BTreeMap<String, WageEntry>>;

/// Which pay-side strategy computes a sector's concepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    /// Hospitality concepts.
    Hospitality,
    /// Building-cleaning concepts.
    Cleaning,
}

/// Which sector-specific checks run after the coherence battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorCheck {
    /// Contribution cap, overtime, night hours, holidays.
    Hospitality,
    /// Night hours and protective equipment.
    Cleaning,
}

/// Amounts that vary by establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstablishmentAmounts {
    /// Restaurants, bars and everything else.
    pub restaurant: Decimal,
    /// Hotels.
    pub hotel: Decimal,
}

impl EstablishmentAmounts {
    /// Selects the amount for an establishment.
    pub fn for_establishment(&self, establishment: Establishment) -> Decimal {
        match establishment {
            Establishment::Hotel => self.hotel,
            Establishment::Restaurant => self.restaurant,
        }
    }
}

/// Amounts that vary by working-day arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAmounts {
    /// Split working day.
    pub split: Decimal,
    /// Continuous working day.
    pub continuous: Decimal,
}

impl ShiftAmounts {
    /// Selects the amount for a shift type.
    pub fn for_shift(&self, shift: ShiftType) -> Decimal {
        match shift {
            ShiftType::Split => self.split,
            ShiftType::Continuous => self.continuous,
        }
    }
}

/// Amounts that vary by urban or interurban workplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAmounts {
    /// Urban workplace.
    pub urban: Decimal,
    /// Interurban workplace.
    pub interurban: Decimal,
}

/// Canonical meal allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MealAllowance {
    /// One amount for everyone.
    Flat {
        /// Monthly amount.
        amount: Decimal,
    },
    /// Hotel versus restaurant.
    ByEstablishment {
        /// Amounts.
        amounts: EstablishmentAmounts,
    },
}

/// Canonical transport allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TransportAllowance {
    /// One amount for everyone.
    Flat {
        /// Monthly amount.
        amount: Decimal,
    },
    /// Urban versus interurban workplace.
    ByZone {
        /// Amounts.
        amounts: ZoneAmounts,
    },
    /// Establishment times shift type.
    ByShift {
        /// Restaurant amounts.
        restaurant: ShiftAmounts,
        /// Hotel amounts.
        hotel: ShiftAmounts,
    },
}

/// A category's workwear kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformKit {
    /// Item prices, informational.
    #[serde(default)]
    pub items: BTreeMap<String, Decimal>,
    /// Monthly kit total.
    pub total: Decimal,
}

/// Canonical workwear or protective-equipment allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UniformAllowance {
    /// Sum of the prices of the selected items.
    Itemized {
        /// Item id to monthly price.
        prices: BTreeMap<String, Decimal>,
        /// Items every worker of the sector is expected to carry.
        #[serde(default)]
        mandatory: Vec<String>,
    },
    /// One amount for everyone.
    Flat {
        /// Monthly amount.
        amount: Decimal,
    },
    /// A kit total chosen by category name.
    ByCategory {
        /// Kit key (matched as a substring of the category) to kit.
        kits: BTreeMap<String, UniformKit>,
        /// Kit used when no key matches.
        default_kit: String,
    },
}

impl UniformAllowance {
    /// Item ids a worker may select for this sector.
    pub fn whitelist(&self) -> BTreeSet<&str> {
        match self {
            UniformAllowance::Itemized { prices, .. } => {
                prices.keys().map(String::as_str).collect()
            }
            UniformAllowance::Flat { .. } => BTreeSet::new(),
            UniformAllowance::ByCategory { kits, .. } => kits
                .values()
                .flat_map(|kit| kit.items.keys().map(String::as_str))
                .collect(),
        }
    }

    /// Items the sector expects every worker to carry.
    pub fn mandatory(&self) -> &[String] {
        match self {
            UniformAllowance::Itemized { mandatory, .. } => mandatory,
            _ => &[],
        }
    }
}

/// The single complement shape every calculator reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complements {
    /// Training bonus.
    pub training_bonus: Decimal,
    /// Night-shift bonus, zero where the sector has none.
    pub night_shift_bonus: Decimal,
    /// Hazard bonus, zero where the sector has none.
    pub hazard_bonus: Decimal,
    /// Meal allowance.
    pub meal: MealAllowance,
    /// Transport allowance.
    pub transport: TransportAllowance,
    /// Workwear allowance.
    pub uniform: UniformAllowance,
}

/// Expected net pay and state-take range for one category and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedRange {
    /// Lowest plausible net pay.
    pub net_min: Decimal,
    /// Highest plausible net pay.
    pub net_max: Decimal,
    /// Lowest plausible state-take percentage.
    pub state_take_min: Decimal,
    /// Highest plausible state-take percentage.
    pub state_take_max: Decimal,
}

/// A sector's wage convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRule {
    /// Display name.
    pub name: String,
    /// Pay-side strategy.
    pub calculator: CalculatorKind,
    /// Sector checks.
    pub check: SectorCheck,
    /// Extra-pay installments per year.
    pub extra_payments: u32,
    /// Wage tables.
    pub wage_tables: WageTables,
    /// Accepted categories; empty accepts any.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Normalized complements.
    pub complements: Complements,
    /// Expected ranges keyed by `<category>_<level>`.
    #[serde(default)]
    pub expected_ranges: BTreeMap<String, ExpectedRange>,
}

impl SectorRule {
    /// Looks up the wage entry for a table and level.
    pub fn wage(&self, table: &str, level: &str) -> Option<&WageEntry> {
        self.wage_tables.get(table).and_then(|levels| levels.get(level))
    }

    /// True if the sector knows this wage table.
    pub fn has_table(&self, table: &str) -> bool {
        self.wage_tables.contains_key(table)
    }

    /// True if the category is accepted by this sector.
    pub fn accepts_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == category)
    }
}
