//! Calculation logic for the payroll engine.
//!
//! This module contains the pay-side sector strategies, the social-insurance
//! contribution math, the progressive income-tax engine, the coherence and
//! sector checks run over an assembled breakdown, and the independent audit
//! that recomputes key totals by a second path.

mod assemble;
mod audit;
mod coherence;
mod concepts;
mod contributions;
mod sector_checks;
mod tax;

pub use assemble::compute_breakdown;
pub use audit::{
    AMOUNT_TOLERANCE, BracketSlice, PERCENT_TOLERANCE, TaxAudit, audit_breakdown, audit_region,
    audit_schedule, bracket_slices, diff_reference, recompute_tax,
};
pub use coherence::{STATE_TAKE_BAND, SUM_TOLERANCE, TAX_RATE_CEILING, validate_coherence};
pub use concepts::{
    CleaningCalculator, ConceptCalculator, HospitalityCalculator, calculator_for,
    compute_non_salaried_concepts, compute_salaried_concepts, extra_pay_proration, gross_total,
};
pub use contributions::{
    annual_taxable_base, clamp_contribution_base, contribution_base, employee_contributions,
    employer_contributions, employer_cost, state_take, state_take_pct,
};
pub use sector_checks::{
    CLEANING_MAX_NIGHT_HOURS, HOSPITALITY_MAX_HOLIDAYS, HOSPITALITY_MAX_NIGHT_HOURS,
    HOSPITALITY_MAX_OVERTIME_HOURS,
};
pub use tax::{
    Minimums, apply_brackets, check_schedule, compute_for_region, compute_minimums,
    family_minimum, marginal_rate,
};

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::{RegionRule, SectorRule, builtin_registry};
    use crate::models::{FamilyInput, PayBreakdown, WorkerInput};

    pub fn valencia() -> RegionRule {
        builtin_registry().unwrap().region("valencia").unwrap().clone()
    }

    pub fn hospitality() -> SectorRule {
        builtin_registry()
            .unwrap()
            .sector("hosteleria_valencia")
            .unwrap()
            .clone()
    }

    pub fn cleaning_sector() -> SectorRule {
        builtin_registry()
            .unwrap()
            .sector("limpieza_nacional")
            .unwrap()
            .clone()
    }

    pub fn breakdown_for(worker: &WorkerInput, sector: &SectorRule, region: &RegionRule) -> PayBreakdown {
        super::compute_breakdown(worker, &FamilyInput::default(), sector, region).unwrap()
    }
}
