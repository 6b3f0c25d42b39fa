//! Independent recomputation of key totals.
//!
//! The audit deliberately avoids the primary path: it sums itemized lines
//! instead of reading stored totals, computes family minimums per child, and
//! walks tax brackets by clamping each slice between its own bounds instead of
//! carrying a running floor. A divergence between the two paths is a
//! regression in one of them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use crate::config::{FamilyMinimums, ReferenceSchedule, RegionRule, TaxBracket};
use crate::models::{FamilyInput, Finding, PayBreakdown, Severity, round2};

/// Tolerance for cost, state-take and tax comparisons, in currency units.
pub const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// Tolerance for the state-take percentage, in percentage points.
pub const PERCENT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The part of a base taxed within one bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    /// Lower bound of the bracket.
    pub from: Decimal,
    /// Upper bound, absent for the terminal bracket.
    pub to: Option<Decimal>,
    /// Marginal rate in percent.
    pub rate: Decimal,
    /// Amount of the base falling inside the bracket.
    pub taxed: Decimal,
    /// Tax on that amount.
    pub tax: Decimal,
}

/// A from-scratch tax computation with its bracket-by-bracket explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAudit {
    /// Liquidable base, floored at zero.
    pub liquidable_base: Decimal,
    /// State schedule slices.
    pub state: Vec<BracketSlice>,
    /// Regional schedule slices.
    pub regional: Vec<BracketSlice>,
    /// Annual quota.
    pub annual_quota: Decimal,
    /// Quota divided by 12.
    pub monthly_withholding: Decimal,
}

impl TaxAudit {
    /// Sum of the state slices.
    pub fn state_tax(&self) -> Decimal {
        self.state.iter().map(|s| s.tax).sum()
    }

    /// Sum of the regional slices.
    pub fn regional_tax(&self) -> Decimal {
        self.regional.iter().map(|s| s.tax).sum()
    }
}

fn family_minimum_per_child(children: u8, steps: &FamilyMinimums) -> Decimal {
    (1..=children)
        .map(|nth| match nth {
            1 => steps.first_child,
            2 => steps.second_child,
            3 => steps.third_child,
            _ => steps.each_additional,
        })
        .sum()
}

/// Splits a base across a schedule.
///
/// Each slice is `clamp(base, lower, upper) - lower`, computed from the
/// bracket's own bounds.
pub fn bracket_slices(base: Decimal, brackets: &[TaxBracket]) -> Vec<BracketSlice> {
    let mut slices = Vec::with_capacity(brackets.len());
    let mut lower = Decimal::ZERO;
    for bracket in brackets {
        let capped = match bracket.up_to {
            Some(upper) => base.min(upper),
            None => base,
        };
        let taxed = capped.max(lower) - lower;
        slices.push(BracketSlice {
            from: lower,
            to: bracket.up_to,
            rate: bracket.rate,
            taxed,
            tax: taxed * bracket.rate / HUNDRED,
        });
        match bracket.up_to {
            Some(upper) => lower = upper,
            None => break,
        }
    }
    slices
}

/// Recomputes the income tax without the primary tax engine.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::recompute_tax;
/// use payroll_engine::config::builtin_registry;
/// use payroll_engine::models::FamilyInput;
/// use rust_decimal::Decimal;
///
/// let registry = builtin_registry().unwrap();
/// let region = registry.region("valencia").unwrap();
/// let audit = recompute_tax(Decimal::new(1822260, 2), &FamilyInput::default(), region);
/// assert_eq!(audit.state[0].rate, Decimal::new(19, 0));
/// assert_eq!(audit.annual_quota, audit.state_tax() + audit.regional_tax());
/// ```
pub fn recompute_tax(annual_taxable_base: Decimal, family: &FamilyInput, region: &RegionRule) -> TaxAudit {
    let minimums = &region.minimums;
    let deductions = annual_taxable_base * region.assumed_insurance_rate / HUNDRED
        + minimums.deductible_expenses
        + minimums.personal
        + family_minimum_per_child(family.children, &minimums.family);
    let liquidable = (annual_taxable_base - deductions).max(Decimal::ZERO);

    let state = bracket_slices(liquidable, &region.state_brackets);
    let regional = bracket_slices(liquidable, &region.regional_brackets);
    let annual_quota: Decimal = state.iter().chain(&regional).map(|s| s.tax).sum();

    TaxAudit {
        liquidable_base: liquidable,
        state,
        regional,
        annual_quota,
        monthly_withholding: annual_quota / Decimal::from(12),
    }
}

fn diverges(primary: Decimal, audit: Decimal, tolerance: Decimal) -> bool {
    (primary - audit).abs() > tolerance
}

/// Audits one computed breakdown against its region.
///
/// Returns WARNING findings only; the engine policy decides whether they are
/// fatal.
pub fn audit_breakdown(breakdown: &PayBreakdown, family: &FamilyInput, region: &RegionRule) -> Vec<Finding> {
    let mut findings = Vec::new();

    let gross = breakdown.salaried.itemized_sum() + breakdown.non_salaried.itemized_sum();
    let employee = breakdown.employee_contributions.itemized_sum();
    let employer = breakdown.employer_contributions.itemized_sum();

    let cost = gross + employer;
    if diverges(breakdown.employer_cost, cost, AMOUNT_TOLERANCE) {
        findings.push(Finding::warning(
            "AUDIT_COST",
            format!(
                "employer cost {} differs from recomputed {}",
                round2(breakdown.employer_cost),
                round2(cost)
            ),
        ));
    }

    let take = employee + employer;
    if diverges(breakdown.state_take, take, AMOUNT_TOLERANCE) {
        findings.push(Finding::warning(
            "AUDIT_STATE_TAKE",
            format!(
                "state take {} differs from recomputed {}",
                round2(breakdown.state_take),
                round2(take)
            ),
        ));
    }

    let pct = if cost.is_zero() {
        Decimal::ZERO
    } else {
        take * HUNDRED / cost
    };
    if diverges(breakdown.state_take_pct, pct, PERCENT_TOLERANCE) {
        findings.push(Finding::warning(
            "AUDIT_PERCENT",
            format!(
                "state take {}% differs from recomputed {}%",
                round2(breakdown.state_take_pct),
                round2(pct)
            ),
        ));
    }

    let tax = recompute_tax(breakdown.annual_taxable_base, family, region);
    let quota_off = diverges(
        round2(breakdown.tax.annual_quota),
        round2(tax.annual_quota),
        AMOUNT_TOLERANCE,
    );
    let withholding_off = diverges(
        round2(breakdown.tax.monthly_withholding),
        round2(tax.monthly_withholding),
        AMOUNT_TOLERANCE,
    );
    if quota_off || withholding_off {
        findings.push(Finding::warning(
            "AUDIT_TAX_BRACKETS",
            format!(
                "annual quota {} / withholding {} differ from bracket walk {} / {}",
                round2(breakdown.tax.annual_quota),
                round2(breakdown.tax.monthly_withholding),
                round2(tax.annual_quota),
                round2(tax.monthly_withholding)
            ),
        ));
    }

    for finding in &findings {
        warn!(code = %finding.code, message = %finding.message, "audit divergence");
    }
    findings
}

/// Checks one schedule's shape: ascending bounds, unbounded terminal bracket,
/// non-decreasing rates.
pub fn audit_schedule(label: &str, brackets: &[TaxBracket]) -> Vec<Finding> {
    let mut findings = Vec::new();

    match brackets.last() {
        Some(last) if last.is_unbounded() => {}
        _ => findings.push(Finding::error(
            "BRACKET_UNBOUNDED_MISSING",
            format!("{label} schedule does not end in an unbounded bracket"),
        )),
    }

    for (i, pair) in brackets.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        let ascending = match (prev.up_to, next.up_to) {
            (Some(a), Some(b)) => b > a,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !ascending {
            findings.push(Finding::error(
                "BRACKET_ORDER",
                format!("{label} bracket {} is not above bracket {}", i + 2, i + 1),
            ));
        }
        if next.rate < prev.rate {
            findings.push(Finding::warning(
                "BRACKET_REGRESSIVE",
                format!(
                    "{label} rate drops from {}% to {}% at bracket {}",
                    prev.rate,
                    next.rate,
                    i + 2
                ),
            ));
        }
    }

    findings
}

fn boundaries(brackets: &[TaxBracket]) -> BTreeSet<Decimal> {
    brackets.iter().filter_map(|b| b.up_to).collect()
}

/// Sanity audit of a registered region, run once at startup.
///
/// Also reports whether the state and regional schedules share boundaries.
/// That is an observation only; both schedules are applied independently.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::audit_region;
/// use payroll_engine::config::builtin_registry;
///
/// let registry = builtin_registry().unwrap();
/// let findings = audit_region("madrid", registry.region("madrid").unwrap());
/// assert_eq!(findings.len(), 1);
/// assert_eq!(findings[0].code, "BRACKET_PARITY");
/// ```
pub fn audit_region(id: &str, region: &RegionRule) -> Vec<Finding> {
    let mut findings = audit_schedule(&format!("{id} state"), &region.state_brackets);
    findings.extend(audit_schedule(
        &format!("{id} regional"),
        &region.regional_brackets,
    ));

    if region.social_insurance.employer.occupational_accident <= Decimal::ZERO {
        findings.push(Finding::critical(
            "ACCIDENT_RATE_ZERO",
            format!(
                "{id}: occupational-accident employer rate is zero; the rate is mandatory \
                 (RD 2064/1995, art. 29)"
            ),
        ));
    }

    let state = boundaries(&region.state_brackets);
    let regional = boundaries(&region.regional_brackets);
    let message = if state == regional {
        format!("{id}: state and regional schedules share {} boundaries", state.len())
    } else {
        let only_state = state.difference(&regional).count();
        let only_regional = regional.difference(&state).count();
        format!(
            "{id}: schedules differ ({only_state} state-only, {only_regional} regional-only boundaries)"
        )
    };
    findings.push(Finding::info("BRACKET_PARITY", message));

    for finding in findings.iter().filter(|f| f.severity <= Severity::Warning) {
        warn!(region = id, code = %finding.code, message = %finding.message, "region audit");
    }
    findings
}

/// Diffs a schedule against a published reference.
pub fn diff_reference(label: &str, brackets: &[TaxBracket], reference: &ReferenceSchedule) -> Vec<Finding> {
    let mut findings = Vec::new();

    if brackets.len() != reference.brackets.len() {
        findings.push(Finding::error(
            "FIXTURE_COUNT_MISMATCH",
            format!(
                "{label} has {} brackets, reference has {}",
                brackets.len(),
                reference.brackets.len()
            ),
        ));
    }

    for expected in &reference.brackets {
        let matched = brackets.iter().find(|actual| match (actual.up_to, expected.up_to) {
            (Some(a), Some(e)) => (a - e).abs() <= reference.boundary_tolerance,
            (None, None) => true,
            _ => false,
        });
        let bound = expected
            .up_to
            .map_or_else(|| "unbounded".to_string(), |b| b.to_string());
        match matched {
            None => findings.push(Finding::error(
                "FIXTURE_MISSING_BOUNDARY",
                format!("{label} has no bracket at {bound}"),
            )),
            Some(actual) if (actual.rate - expected.rate).abs() > reference.rate_tolerance => {
                findings.push(Finding::error(
                    "FIXTURE_RATE_MISMATCH",
                    format!(
                        "{label} bracket {bound}: rate {}% vs reference {}%",
                        actual.rate, expected.rate
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    findings
}
