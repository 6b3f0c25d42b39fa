//! Post-computation invariant checks over an assembled breakdown.
//!
//! Every check only reports. Which severities stop a computation is decided
//! by the engine's [`EnginePolicy`](crate::config::EnginePolicy).

use rust_decimal::Decimal;

use crate::config::SectorRule;
use crate::models::{
    ContributionConcept, ContributionResult, Finding, PayBreakdown, PayComponents, WorkerInput,
    round2,
};

/// Tolerance for itemized-sum comparisons.
pub const SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Effective tax rate above which a warning is raised.
pub const TAX_RATE_CEILING: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Plausible state-take band, in percent of employer cost.
pub const STATE_TAKE_BAND: (Decimal, Decimal) = (
    Decimal::from_parts(20, 0, 0, false, 0),
    Decimal::from_parts(50, 0, 0, false, 0),
);

/// Runs every coherence check and returns the findings in a fixed order.
///
/// `worker` and `sector` are only used to look up the expected range for the
/// worker's category and level.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::validate_coherence;
/// use payroll_engine::config::builtin_registry;
/// use payroll_engine::engine::PayrollEngine;
/// use payroll_engine::models::{FamilyInput, Jurisdiction, SectorOptions, WorkerInput};
///
/// let engine = PayrollEngine::new(builtin_registry().unwrap().into());
/// let worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_III");
/// let outcome = engine
///     .compute_full_payroll(
///         &worker,
///         &FamilyInput::default(),
///         &SectorOptions::default(),
///         &Jurisdiction::region("valencia"),
///     )
///     .unwrap();
///
/// let sector = engine.registry().sector("hosteleria_valencia").unwrap();
/// let findings = validate_coherence(&outcome.breakdown, &worker, sector);
/// assert!(findings.is_empty());
/// ```
pub fn validate_coherence(
    breakdown: &PayBreakdown,
    worker: &WorkerInput,
    sector: &SectorRule,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    check_base_ordering(breakdown, &mut findings);
    check_accident_rate(&breakdown.employer_contributions, &mut findings);
    check_arithmetic(breakdown, &mut findings);
    check_plausibility(breakdown, &mut findings);
    check_expected_range(breakdown, worker, sector, &mut findings);
    findings
}

fn check_base_ordering(b: &PayBreakdown, findings: &mut Vec<Finding>) {
    if b.contribution_base > b.gross_total {
        findings.push(Finding::critical(
            "BASE_EXCEEDS_GROSS",
            format!(
                "contribution base {} exceeds gross total {}",
                round2(b.contribution_base),
                round2(b.gross_total)
            ),
        ));
    }
}

fn check_accident_rate(employer: &ContributionResult, findings: &mut Vec<Finding>) {
    let line = employer
        .lines
        .iter()
        .find(|line| line.concept == ContributionConcept::OccupationalAccident);
    let zero = line.is_none_or(|line| line.rate <= Decimal::ZERO || line.amount <= Decimal::ZERO);
    if zero {
        findings.push(Finding::critical(
            "ACCIDENT_RATE_ZERO",
            "occupational-accident contribution is zero; the employer rate is mandatory \
             and may not be zero (RD 2064/1995, art. 29)",
        ));
    }
}

fn sum_mismatch(expected: Decimal, actual: Decimal) -> bool {
    (expected - actual).abs() > SUM_TOLERANCE
}

fn check_group(code: &str, label: &str, group: &PayComponents, findings: &mut Vec<Finding>) {
    let itemized = group.itemized_sum();
    if sum_mismatch(itemized, group.total()) {
        findings.push(Finding::error(
            code,
            format!(
                "{label} total {} differs from the sum of its lines {}",
                group.total(),
                itemized
            ),
        ));
    }
}

fn check_contributions(
    code: &str,
    label: &str,
    result: &ContributionResult,
    findings: &mut Vec<Finding>,
) {
    let itemized = result.itemized_sum();
    if sum_mismatch(itemized, result.total) {
        findings.push(Finding::error(
            code,
            format!(
                "{label} contributions total {} differs from the sum of its parts {}",
                result.total, itemized
            ),
        ));
    }
}

fn check_arithmetic(b: &PayBreakdown, findings: &mut Vec<Finding>) {
    if b.net_pay >= b.gross_total {
        findings.push(Finding::error(
            "NET_NOT_BELOW_GROSS",
            format!(
                "net pay {} is not below gross total {}",
                round2(b.net_pay),
                round2(b.gross_total)
            ),
        ));
    }

    check_group("SALARIED_SUM_MISMATCH", "salaried", &b.salaried, findings);
    check_group("NON_SALARIED_SUM_MISMATCH", "non-salaried", &b.non_salaried, findings);

    let gross = b.salaried.total() + b.non_salaried.total();
    if sum_mismatch(gross, b.gross_total) {
        findings.push(Finding::error(
            "GROSS_SUM_MISMATCH",
            format!(
                "gross total {} differs from salaried plus non-salaried {}",
                b.gross_total, gross
            ),
        ));
    }

    check_contributions(
        "EMPLOYEE_CONTRIBUTION_SUM",
        "employee",
        &b.employee_contributions,
        findings,
    );
    check_contributions(
        "EMPLOYER_CONTRIBUTION_SUM",
        "employer",
        &b.employer_contributions,
        findings,
    );

    let monthly_taxable = b.annual_taxable_base / Decimal::from(12);
    if monthly_taxable < b.contribution_base {
        findings.push(Finding::error(
            "TAXABLE_BELOW_CONTRIBUTION_BASE",
            format!(
                "monthly taxable base {} is below contribution base {}",
                round2(monthly_taxable),
                round2(b.contribution_base)
            ),
        ));
    }
}

fn check_plausibility(b: &PayBreakdown, findings: &mut Vec<Finding>) {
    if b.employer_cost <= b.gross_total {
        findings.push(Finding::warning(
            "EMPLOYER_COST_LOW",
            format!(
                "employer cost {} does not exceed gross total {}",
                round2(b.employer_cost),
                round2(b.gross_total)
            ),
        ));
    }

    if b.tax.effective_rate > TAX_RATE_CEILING {
        findings.push(Finding::warning(
            "TAX_RATE_HIGH",
            format!(
                "effective tax rate {}% above {}%",
                round2(b.tax.effective_rate),
                TAX_RATE_CEILING
            ),
        ));
    }

    let (low, high) = STATE_TAKE_BAND;
    if b.state_take_pct < low || b.state_take_pct > high {
        findings.push(Finding::warning(
            "STATE_TAKE_ATYPICAL",
            format!(
                "state take {}% outside the {low}-{high}% band",
                round2(b.state_take_pct)
            ),
        ));
    }
}

fn check_expected_range(
    b: &PayBreakdown,
    worker: &WorkerInput,
    sector: &SectorRule,
    findings: &mut Vec<Finding>,
) {
    let key = worker.category_key();
    let Some(range) = sector.expected_ranges.get(&key) else {
        return;
    };

    if b.net_pay < range.net_min {
        findings.push(Finding::warning(
            "SECTOR_NET_LOW",
            format!(
                "net pay {} below the expected minimum {} for {key}",
                round2(b.net_pay),
                range.net_min
            ),
        ));
    } else if b.net_pay > range.net_max {
        findings.push(Finding::warning(
            "SECTOR_NET_HIGH",
            format!(
                "net pay {} above the expected maximum {} for {key}",
                round2(b.net_pay),
                range.net_max
            ),
        ));
    }

    if b.state_take_pct < range.state_take_min || b.state_take_pct > range.state_take_max {
        findings.push(Finding::warning(
            "SECTOR_STATE_TAKE_RANGE",
            format!(
                "state take {}% outside {}-{}% for {key}",
                round2(b.state_take_pct),
                range.state_take_min,
                range.state_take_max
            ),
        ));
    }
}
