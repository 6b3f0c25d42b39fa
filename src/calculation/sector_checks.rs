//! Sector-specific plausibility checks, selected by the sector's rule set.

use rust_decimal::Decimal;

use crate::config::{SectorCheck, SectorRule};
use crate::models::{Concept, Finding, PayBreakdown, SectorOptions, WorkerInput, round2};

/// Monthly overtime hours above which hospitality raises a warning.
pub const HOSPITALITY_MAX_OVERTIME_HOURS: u32 = 80;
/// Monthly night hours above which hospitality raises a warning.
pub const HOSPITALITY_MAX_NIGHT_HOURS: u32 = 60;
/// Holidays worked per month above which hospitality raises a warning.
pub const HOSPITALITY_MAX_HOLIDAYS: u32 = 6;
/// Monthly night hours above which cleaning raises a warning.
pub const CLEANING_MAX_NIGHT_HOURS: u32 = 120;

const CAP_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

impl SectorCheck {
    /// Runs this sector's checks.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::calculation::compute_breakdown;
    /// use payroll_engine::config::{SectorCheck, builtin_registry};
    /// use payroll_engine::models::{FamilyInput, SectorOptions, WorkerInput};
    ///
    /// let registry = builtin_registry().unwrap();
    /// let sector = registry.sector("hosteleria_valencia").unwrap();
    /// let region = registry.region("valencia").unwrap();
    /// let worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_III");
    /// let breakdown = compute_breakdown(&worker, &FamilyInput::default(), sector, region).unwrap();
    ///
    /// let options = SectorOptions { overtime_hours: 95, ..SectorOptions::default() };
    /// let findings = SectorCheck::Hospitality.run(&breakdown, &worker, &options, sector);
    /// assert_eq!(findings[0].code, "OVERTIME_HIGH");
    /// ```
    pub fn run(
        self,
        breakdown: &PayBreakdown,
        worker: &WorkerInput,
        options: &SectorOptions,
        sector: &SectorRule,
    ) -> Vec<Finding> {
        match self {
            SectorCheck::Hospitality => hospitality(breakdown, options),
            SectorCheck::Cleaning => cleaning(breakdown, worker, options, sector),
        }
    }
}

fn hospitality(breakdown: &PayBreakdown, options: &SectorOptions) -> Vec<Finding> {
    let mut findings = Vec::new();

    if options.overtime_hours > HOSPITALITY_MAX_OVERTIME_HOURS {
        findings.push(Finding::warning(
            "OVERTIME_HIGH",
            format!(
                "{} overtime hours exceed {HOSPITALITY_MAX_OVERTIME_HOURS}",
                options.overtime_hours
            ),
        ));
    }
    if options.night_hours > HOSPITALITY_MAX_NIGHT_HOURS {
        findings.push(Finding::warning(
            "NIGHT_HOURS_HIGH",
            format!(
                "{} night hours exceed {HOSPITALITY_MAX_NIGHT_HOURS}",
                options.night_hours
            ),
        ));
    }
    if options.holidays_worked > HOSPITALITY_MAX_HOLIDAYS {
        findings.push(Finding::warning(
            "HOLIDAYS_HIGH",
            format!(
                "{} holidays worked exceed {HOSPITALITY_MAX_HOLIDAYS}",
                options.holidays_worked
            ),
        ));
    }

    let salaried = breakdown.salaried.total();
    if (breakdown.contribution_base - salaried).abs() > CAP_TOLERANCE {
        findings.push(Finding::info(
            "CAP_APPLIED",
            format!(
                "contribution base {} capped from salaried total {}",
                round2(breakdown.contribution_base),
                round2(salaried)
            ),
        ));
    }

    findings
}

fn cleaning(
    breakdown: &PayBreakdown,
    worker: &WorkerInput,
    options: &SectorOptions,
    sector: &SectorRule,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    if options.night_hours > CLEANING_MAX_NIGHT_HOURS {
        findings.push(Finding::warning(
            "CLEANING_NIGHT_HOURS_HIGH",
            format!(
                "{} night hours exceed {CLEANING_MAX_NIGHT_HOURS}",
                options.night_hours
            ),
        ));
    }

    let ppe = breakdown.non_salaried.amount(Concept::UniformAllowance);
    if worker.category.contains("quimico") && ppe.is_zero() {
        findings.push(Finding::warning(
            "CLEANING_PPE_REQUIRED",
            format!(
                "category '{}' handles chemicals but no protective equipment was selected",
                worker.category
            ),
        ));
    }

    if !worker.uniform_items.is_empty() {
        let missing: Vec<&str> = sector
            .complements
            .uniform
            .mandatory()
            .iter()
            .filter(|item| !worker.uniform_items.contains(item))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            findings.push(Finding::warning(
                "PPE_MANDATORY_MISSING",
                format!("mandatory protective items missing: {}", missing.join(", ")),
            ));
        }
    }

    if breakdown.salaried.contains(Concept::NightShiftBonus)
        && breakdown.salaried.contains(Concept::HazardBonus)
    {
        findings.push(Finding::info(
            "BONUSES_STACKED",
            "night-shift and hazard bonuses both apply",
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::testing::{breakdown_for, cleaning_sector, hospitality, valencia};
    use crate::models::Severity;

    fn codes(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.code.as_str()).collect()
    }

    #[test]
    fn test_hospitality_quiet_month() {
        let worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_III");
        let b = breakdown_for(&worker, &hospitality(), &valencia());
        let findings =
            SectorCheck::Hospitality.run(&b, &worker, &SectorOptions::default(), &hospitality());
        assert!(findings.is_empty());
    }

    #[test]
    fn test_hospitality_hours_limits() {
        let worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_III");
        let b = breakdown_for(&worker, &hospitality(), &valencia());
        let options = SectorOptions {
            overtime_hours: 81,
            night_hours: 61,
            holidays_worked: 7,
        };
        let findings = SectorCheck::Hospitality.run(&b, &worker, &options, &hospitality());
        assert_eq!(
            codes(&findings),
            vec!["OVERTIME_HIGH", "NIGHT_HOURS_HIGH", "HOLIDAYS_HIGH"]
        );

        let at_limit = SectorOptions {
            overtime_hours: 80,
            night_hours: 60,
            holidays_worked: 6,
        };
        assert!(
            SectorCheck::Hospitality
                .run(&b, &worker, &at_limit, &hospitality())
                .is_empty()
        );
    }

    #[test]
    fn test_hospitality_cap_applied_is_info() {
        let worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_V");
        let b = breakdown_for(&worker, &hospitality(), &valencia());
        let findings =
            SectorCheck::Hospitality.run(&b, &worker, &SectorOptions::default(), &hospitality());
        assert_eq!(codes(&findings), vec!["CAP_APPLIED"]);
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn test_cleaning_chemical_category_without_ppe() {
        let worker = WorkerInput::new("limpiador_quimico", "TABLA_I", "LEVEL_III");
        let b = breakdown_for(&worker, &cleaning_sector(), &valencia());
        let findings =
            SectorCheck::Cleaning.run(&b, &worker, &SectorOptions::default(), &cleaning_sector());
        assert_eq!(codes(&findings), vec!["CLEANING_PPE_REQUIRED"]);
    }

    #[test]
    fn test_cleaning_mandatory_items_and_stacked_bonuses() {
        let mut worker = WorkerInput::new("limpiador_quimico", "TABLA_I", "LEVEL_III");
        worker.applies_night_shift = true;
        worker.applies_hazard_pay = true;
        worker.uniform_items = vec!["guantes_latex".to_string(), "mascarilla_ffp2".to_string()];
        let b = breakdown_for(&worker, &cleaning_sector(), &valencia());
        let options = SectorOptions {
            night_hours: 130,
            ..SectorOptions::default()
        };
        let findings = SectorCheck::Cleaning.run(&b, &worker, &options, &cleaning_sector());
        assert_eq!(
            codes(&findings),
            vec![
                "CLEANING_NIGHT_HOURS_HIGH",
                "PPE_MANDATORY_MISSING",
                "BONUSES_STACKED"
            ]
        );
        assert!(findings[1].message.contains("calzado_seguridad"));
    }

    #[test]
    fn test_cleaning_full_kit_is_quiet() {
        let mut worker = WorkerInput::new("limpiador", "TABLA_I", "LEVEL_III");
        worker.uniform_items = vec![
            "guantes_latex".to_string(),
            "calzado_seguridad".to_string(),
        ];
        let b = breakdown_for(&worker, &cleaning_sector(), &valencia());
        let findings =
            SectorCheck::Cleaning.run(&b, &worker, &SectorOptions::default(), &cleaning_sector());
        assert!(findings.is_empty());
    }
}
