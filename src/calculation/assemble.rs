//! Assembles the full breakdown from the pay, contribution and tax steps.

use crate::config::{RegionRule, SectorRule};
use crate::error::EngineResult;
use crate::models::{FamilyInput, PayBreakdown, WorkerInput};

use super::concepts::{compute_non_salaried_concepts, compute_salaried_concepts, gross_total};
use super::contributions::{
    annual_taxable_base, contribution_base, employee_contributions, employer_contributions,
    employer_cost, state_take, state_take_pct,
};
use super::tax::compute_for_region;

/// Computes a worker's monthly payroll under one sector and one region.
///
/// Pay concepts come from the sector, contribution bases, rates and tax
/// schedules from the region. No rounding happens here.
///
/// # Errors
///
/// Returns [`EngineError::InvalidCategory`](crate::error::EngineError::InvalidCategory)
/// when the worker's table and level are not in the sector's wage tables, and
/// [`EngineError::InvalidConfig`](crate::error::EngineError::InvalidConfig)
/// when a tax schedule is malformed.
pub fn compute_breakdown(
    worker: &WorkerInput,
    family: &FamilyInput,
    sector: &SectorRule,
    region: &RegionRule,
) -> EngineResult<PayBreakdown> {
    let salaried = compute_salaried_concepts(worker, sector)?;
    let non_salaried = compute_non_salaried_concepts(worker, sector);
    let gross = gross_total(&salaried, &non_salaried);

    let social_insurance = &region.social_insurance;
    let base = contribution_base(&salaried, social_insurance);
    let employee = employee_contributions(base, &social_insurance.employee);
    let employer = employer_contributions(base, &social_insurance.employer);

    let annual = annual_taxable_base(gross);
    let tax = compute_for_region(annual, family, region)?;

    let total_deductions = employee.total + tax.monthly_withholding;
    let cost = employer_cost(gross, &employer);
    let take = state_take(&employee, &employer);

    Ok(PayBreakdown {
        gross_total: gross,
        contribution_base: base,
        annual_taxable_base: annual,
        total_deductions,
        net_pay: gross - total_deductions,
        employer_cost: cost,
        state_take: take,
        state_take_pct: state_take_pct(take, cost),
        salaried,
        non_salaried,
        employee_contributions: employee,
        employer_contributions: employer,
        tax,
    })
}
