//! Core data models for the payroll engine.
//!
//! Inputs ([`WorkerInput`], [`FamilyInput`], [`SectorOptions`], [`Jurisdiction`]),
//! computed figures ([`PayBreakdown`] and its parts) and findings.

mod breakdown;
mod finding;
mod worker;

pub use breakdown::{
    Concept, ContributionConcept, ContributionLine, ContributionResult, DeductionsSection,
    EmployerSection, IncomeSection, LineItem, PayBreakdown, PayComponents, PayrollReport,
    ReportContribution, ReportLine, StateTakeSection, SummarySection, TaxResult, TaxSection,
    round2,
};
pub use finding::{Finding, PayrollOutcome, Severity, ValidationResult};
pub use worker::{
    Establishment, FamilyInput, Jurisdiction, MAX_CHILDREN, SectorOptions, ShiftType, WorkerInput,
    is_valid_level,
};
