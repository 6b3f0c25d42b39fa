//! Social-insurance contribution math.
//!
//! Only salaried pay is insured, and only up to the region's maximum base;
//! all pay is taxed. That asymmetry is why the contribution base and the
//! taxable base are computed separately here.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{EmployeeRates, EmployerRates, SocialInsurance};
use crate::models::{ContributionConcept, ContributionLine, ContributionResult, PayComponents};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The salaried total clamped to the region's minimum and maximum base.
///
/// The minimum is applied first, then the maximum, so a misconfigured
/// `min_base > max_base` yields `max_base` instead of panicking.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::clamp_contribution_base;
/// use rust_decimal::Decimal;
///
/// let min = Decimal::new(138120, 2);
/// let max = Decimal::new(490950, 2);
/// assert_eq!(clamp_contribution_base(Decimal::new(1000, 0), min, max), min);
/// assert_eq!(clamp_contribution_base(Decimal::new(6000, 0), min, max), max);
/// ```
pub fn clamp_contribution_base(salaried_total: Decimal, min_base: Decimal, max_base: Decimal) -> Decimal {
    salaried_total.max(min_base).min(max_base)
}

/// The capped contribution base for a salaried group.
pub fn contribution_base(salaried: &PayComponents, social_insurance: &SocialInsurance) -> Decimal {
    let base = clamp_contribution_base(
        salaried.total(),
        social_insurance.min_base,
        social_insurance.max_base,
    );
    if base != salaried.total() {
        debug!(
            salaried_total = %salaried.total(),
            contribution_base = %base,
            "contribution base capped"
        );
    }
    base
}

/// Annualized gross pay: every concept, salaried or not, is taxable.
pub fn annual_taxable_base(gross_total: Decimal) -> Decimal {
    gross_total * Decimal::from(12)
}

fn apply_rates<I>(base: Decimal, rates: I) -> ContributionResult
where
    I: IntoIterator<Item = (ContributionConcept, Decimal)>,
{
    let lines: Vec<ContributionLine> = rates
        .into_iter()
        .map(|(concept, rate)| ContributionLine {
            concept,
            rate,
            amount: base * rate / HUNDRED,
        })
        .collect();
    let total = lines.iter().map(|line| line.amount).sum();
    ContributionResult { lines, total }
}

/// Employee contributions on the capped base.
pub fn employee_contributions(base: Decimal, rates: &EmployeeRates) -> ContributionResult {
    apply_rates(base, rates.named())
}

/// Employer contributions on the capped base, including occupational accident
/// and wage guarantee.
pub fn employer_contributions(base: Decimal, rates: &EmployerRates) -> ContributionResult {
    apply_rates(base, rates.named())
}

/// Gross pay plus employer contributions.
pub fn employer_cost(gross_total: Decimal, employer: &ContributionResult) -> Decimal {
    gross_total + employer.total
}

/// Employee plus employer contributions.
pub fn state_take(employee: &ContributionResult, employer: &ContributionResult) -> Decimal {
    employee.total + employer.total
}

/// State take as a percentage of employer cost; zero when the cost is zero.
pub fn state_take_pct(state_take: Decimal, employer_cost: Decimal) -> Decimal {
    if employer_cost.is_zero() {
        return Decimal::ZERO;
    }
    state_take / employer_cost * HUNDRED
}
