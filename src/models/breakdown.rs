//! Computed payroll figures.
//!
//! Everything here carries full `Decimal` precision. The only rounded view is
//! [`PayrollReport`], produced on demand from a [`PayBreakdown`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounds a monetary or percentage value to 2 decimal places, half away from zero.
///
/// # Example
///
/// ```
/// use payroll_engine::models::round2;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round2(Decimal::new(1518549, 3)), Decimal::new(151855, 2));
/// ```
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A named pay concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    /// Base wage from the wage table.
    BaseSalary,
    /// Pro-rated extra-pay installments.
    ExtraPayProration,
    /// Training bonus.
    TrainingBonus,
    /// Meal allowance.
    MealAllowance,
    /// Night-shift bonus.
    NightShiftBonus,
    /// Hazard bonus for arduous or toxic work.
    HazardBonus,
    /// Transport allowance.
    TransportAllowance,
    /// Workwear, uniform or protective equipment allowance.
    UniformAllowance,
}

/// One line of a [`PayComponents`] group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// What is being paid.
    pub concept: Concept,
    /// Monthly amount, always positive.
    pub amount: Decimal,
}

/// An itemized group of pay (salaried or non-salaried) with its total.
///
/// Only strictly positive amounts are recorded, so every line is > 0 and the
/// total is the sum of the lines.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Concept, PayComponents};
/// use rust_decimal::Decimal;
///
/// let mut pay = PayComponents::default();
/// pay.add(Concept::BaseSalary, Decimal::new(121484, 2));
/// pay.add(Concept::TrainingBonus, Decimal::ZERO);
/// assert_eq!(pay.items().len(), 1);
/// assert_eq!(pay.total(), Decimal::new(121484, 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayComponents {
    items: Vec<LineItem>,
    total: Decimal,
}

impl PayComponents {
    /// Adds a line item. Zero and negative amounts are ignored.
    pub fn add(&mut self, concept: Concept, amount: Decimal) {
        if amount > Decimal::ZERO {
            self.items.push(LineItem { concept, amount });
            self.total += amount;
        }
    }

    /// The recorded line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The group total.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// The amount recorded for a concept, or zero.
    pub fn amount(&self, concept: Concept) -> Decimal {
        self.items
            .iter()
            .filter(|item| item.concept == concept)
            .map(|item| item.amount)
            .sum()
    }

    /// True if a positive amount was recorded for the concept.
    pub fn contains(&self, concept: Concept) -> bool {
        self.items.iter().any(|item| item.concept == concept)
    }

    /// Sum of the line items, recomputed independently of the running total.
    pub fn itemized_sum(&self) -> Decimal {
        self.items.iter().map(|item| item.amount).sum()
    }
}

/// A named social-insurance contribution concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionConcept {
    /// Common contingencies.
    CommonContingencies,
    /// Unemployment.
    Unemployment,
    /// Vocational training.
    Training,
    /// Intergenerational equity fund.
    IntergenerationalEquity,
    /// Occupational accidents and diseases (employer only, never zero).
    OccupationalAccident,
    /// Wage guarantee fund (employer only).
    WageGuarantee,
}

/// One contribution line: the rate applied to the contribution base and the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionLine {
    /// The contribution concept.
    pub concept: ContributionConcept,
    /// Percentage rate, e.g. 4.70.
    pub rate: Decimal,
    /// Monthly amount.
    pub amount: Decimal,
}

/// Employee or employer contributions, itemized per concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionResult {
    /// Lines in report order.
    pub lines: Vec<ContributionLine>,
    /// Total of all lines.
    pub total: Decimal,
}

impl ContributionResult {
    /// The amount for a concept, or zero when the concept is absent.
    pub fn amount(&self, concept: ContributionConcept) -> Decimal {
        self.lines
            .iter()
            .filter(|line| line.concept == concept)
            .map(|line| line.amount)
            .sum()
    }

    /// Sum of the named parts, recomputed independently of `total`.
    pub fn itemized_sum(&self) -> Decimal {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

/// The income-tax computation for one worker.
///
/// When `liquidable_base` is zero every amount from `state_tax` down is exactly zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Annualized gross pay.
    pub annual_taxable_base: Decimal,
    /// Assumed annual social-insurance deduction.
    pub insurance_deduction: Decimal,
    /// Deductible-expenses constant.
    pub deductible_expenses: Decimal,
    /// Personal minimum.
    pub personal_minimum: Decimal,
    /// Family minimum for the number of children.
    pub family_minimum: Decimal,
    /// Base after deductions and minimums, floored at zero.
    pub liquidable_base: Decimal,
    /// Tax from the state schedule.
    pub state_tax: Decimal,
    /// Tax from the regional schedule.
    pub regional_tax: Decimal,
    /// State plus regional tax.
    pub annual_quota: Decimal,
    /// Quota as a percentage of the annual taxable base.
    pub effective_rate: Decimal,
    /// Combined state and regional marginal rate at the liquidable base.
    pub marginal_rate: Decimal,
    /// Quota divided by 12.
    pub monthly_withholding: Decimal,
}

/// The complete monthly payroll for one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayBreakdown {
    /// Pay that is insured and taxed.
    pub salaried: PayComponents,
    /// Pay that is taxed but not insured.
    pub non_salaried: PayComponents,
    /// Salaried plus non-salaried total.
    pub gross_total: Decimal,
    /// Salaried total clamped to the region's minimum and maximum base.
    pub contribution_base: Decimal,
    /// Gross total times 12.
    pub annual_taxable_base: Decimal,
    /// Contributions withheld from the worker.
    pub employee_contributions: ContributionResult,
    /// Contributions paid by the employer.
    pub employer_contributions: ContributionResult,
    /// Income-tax computation.
    pub tax: TaxResult,
    /// Employee contributions plus monthly withholding.
    pub total_deductions: Decimal,
    /// Gross total minus total deductions.
    pub net_pay: Decimal,
    /// Gross total plus employer contributions.
    pub employer_cost: Decimal,
    /// Employee plus employer contributions.
    pub state_take: Decimal,
    /// State take as a percentage of employer cost.
    pub state_take_pct: Decimal,
}

impl PayBreakdown {
    /// Produces the rounded, stable-field report view.
    pub fn report(&self) -> PayrollReport {
        PayrollReport::from(self)
    }
}

/// A rounded report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    /// Concept name.
    pub concept: Concept,
    /// Amount rounded to 2 decimals.
    pub amount: Decimal,
}

/// A rounded contribution report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportContribution {
    /// Contribution concept.
    pub concept: ContributionConcept,
    /// Percentage rate.
    pub rate: Decimal,
    /// Amount rounded to 2 decimals.
    pub amount: Decimal,
}

/// Itemized income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSection {
    /// Salaried lines.
    pub salaried: Vec<ReportLine>,
    /// Salaried subtotal.
    pub salaried_total: Decimal,
    /// Non-salaried lines.
    pub non_salaried: Vec<ReportLine>,
    /// Non-salaried subtotal.
    pub non_salaried_total: Decimal,
    /// Gross total.
    pub gross_total: Decimal,
}

/// Itemized income-tax deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSection {
    /// Annual taxable base.
    pub annual_taxable_base: Decimal,
    /// Liquidable base.
    pub liquidable_base: Decimal,
    /// State tax.
    pub state_tax: Decimal,
    /// Regional tax.
    pub regional_tax: Decimal,
    /// Annual quota.
    pub annual_quota: Decimal,
    /// Effective rate in percent.
    pub effective_rate: Decimal,
    /// Marginal rate in percent.
    pub marginal_rate: Decimal,
    /// Monthly withholding.
    pub monthly_withholding: Decimal,
}

/// Worker-side deductions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionsSection {
    /// Contribution base the rates apply to.
    pub contribution_base: Decimal,
    /// Employee contribution lines.
    pub contributions: Vec<ReportContribution>,
    /// Employee contributions total.
    pub contributions_total: Decimal,
    /// Income-tax detail.
    pub income_tax: TaxSection,
    /// Contributions plus withholding.
    pub total: Decimal,
}

/// Employer-side contributions and cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerSection {
    /// Employer contribution lines.
    pub contributions: Vec<ReportContribution>,
    /// Employer contributions total.
    pub contributions_total: Decimal,
    /// Total employer cost.
    pub employer_cost: Decimal,
}

/// The state take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTakeSection {
    /// Employee contributions.
    pub employee: Decimal,
    /// Employer contributions.
    pub employer: Decimal,
    /// Combined contributions.
    pub total: Decimal,
    /// Percentage of employer cost.
    pub percentage: Decimal,
}

/// Headline figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
    /// Net pay.
    pub net_pay: Decimal,
    /// Total deductions.
    pub total_deductions: Decimal,
    /// Employer cost.
    pub employer_cost: Decimal,
    /// State take total.
    pub state_take: Decimal,
    /// State take percentage.
    pub state_take_pct: Decimal,
}

/// The output contract: stable field groups, every figure rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReport {
    /// Itemized income.
    #[serde(rename = "ingresos")]
    pub income: IncomeSection,
    /// Worker deductions.
    #[serde(rename = "deducciones")]
    pub deductions: DeductionsSection,
    /// Employer contributions and cost.
    #[serde(rename = "empresa")]
    pub employer: EmployerSection,
    /// State take.
    #[serde(rename = "expolio")]
    pub state_take: StateTakeSection,
    /// Headline figures.
    #[serde(rename = "resumen")]
    pub summary: SummarySection,
}

fn report_lines(components: &PayComponents) -> Vec<ReportLine> {
    components
        .items()
        .iter()
        .map(|item| ReportLine {
            concept: item.concept,
            amount: round2(item.amount),
        })
        .collect()
}

fn report_contributions(result: &ContributionResult) -> Vec<ReportContribution> {
    result
        .lines
        .iter()
        .map(|line| ReportContribution {
            concept: line.concept,
            rate: line.rate,
            amount: round2(line.amount),
        })
        .collect()
}

impl From<&PayBreakdown> for PayrollReport {
    fn from(b: &PayBreakdown) -> Self {
        let tax = &b.tax;
        PayrollReport {
            income: IncomeSection {
                salaried: report_lines(&b.salaried),
                salaried_total: round2(b.salaried.total()),
                non_salaried: report_lines(&b.non_salaried),
                non_salaried_total: round2(b.non_salaried.total()),
                gross_total: round2(b.gross_total),
            },
            deductions: DeductionsSection {
                contribution_base: round2(b.contribution_base),
                contributions: report_contributions(&b.employee_contributions),
                contributions_total: round2(b.employee_contributions.total),
                income_tax: TaxSection {
                    annual_taxable_base: round2(tax.annual_taxable_base),
                    liquidable_base: round2(tax.liquidable_base),
                    state_tax: round2(tax.state_tax),
                    regional_tax: round2(tax.regional_tax),
                    annual_quota: round2(tax.annual_quota),
                    effective_rate: round2(tax.effective_rate),
                    marginal_rate: round2(tax.marginal_rate),
                    monthly_withholding: round2(tax.monthly_withholding),
                },
                total: round2(b.total_deductions),
            },
            employer: EmployerSection {
                contributions: report_contributions(&b.employer_contributions),
                contributions_total: round2(b.employer_contributions.total),
                employer_cost: round2(b.employer_cost),
            },
            state_take: StateTakeSection {
                employee: round2(b.employee_contributions.total),
                employer: round2(b.employer_contributions.total),
                total: round2(b.state_take),
                percentage: round2(b.state_take_pct),
            },
            summary: SummarySection {
                net_pay: round2(b.net_pay),
                total_deductions: round2(b.total_deductions),
                employer_cost: round2(b.employer_cost),
                state_take: round2(b.state_take),
                state_take_pct: round2(b.state_take_pct),
            },
        }
    }
}
