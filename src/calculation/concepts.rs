//! Pay-side concept calculation.
//!
//! Each sector names a [`CalculatorKind`]; the matching [`ConceptCalculator`]
//! turns a [`WorkerInput`] into salaried and non-salaried [`PayComponents`].
//! Complement amounts are always read from the canonical [`Complements`]
//! shape produced at load time.
//!
//! [`Complements`]: crate::config::Complements

use rust_decimal::Decimal;

use crate::config::{
    CalculatorKind, MealAllowance, SectorRule, TransportAllowance, UniformAllowance,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{Concept, Establishment, PayComponents, WorkerInput};

/// Months in a year, the divisor for extra-pay proration.
const MONTHS: u32 = 12;

/// Computes a sector's pay concepts for one worker.
pub trait ConceptCalculator: Send + Sync {
    /// Pay that is insured and taxed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCategory`] if the worker's wage table and
    /// level are not in the sector's wage tables.
    fn salaried(&self, worker: &WorkerInput, sector: &SectorRule) -> EngineResult<PayComponents>;

    /// Pay that is taxed but not insured.
    fn non_salaried(&self, worker: &WorkerInput, sector: &SectorRule) -> PayComponents;
}

/// Hospitality: base, proration, training and meal; transport and workwear.
#[derive(Debug, Clone, Copy, Default)]
pub struct HospitalityCalculator;

/// Building cleaning: adds night-shift and hazard bonuses to the salaried side.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleaningCalculator;

impl ConceptCalculator for HospitalityCalculator {
    fn salaried(&self, worker: &WorkerInput, sector: &SectorRule) -> EngineResult<PayComponents> {
        let mut pay = base_pay(worker, sector)?;
        let complements = &sector.complements;
        if worker.applies_training_bonus {
            pay.add(Concept::TrainingBonus, complements.training_bonus);
        }
        if worker.applies_meal_allowance {
            pay.add(Concept::MealAllowance, meal_amount(&complements.meal, worker));
        }
        Ok(pay)
    }

    fn non_salaried(&self, worker: &WorkerInput, sector: &SectorRule) -> PayComponents {
        let mut pay = PayComponents::default();
        let complements = &sector.complements;
        if worker.applies_transport {
            pay.add(
                Concept::TransportAllowance,
                transport_amount(&complements.transport, worker),
            );
        }
        if worker.wants_uniform() {
            pay.add(
                Concept::UniformAllowance,
                uniform_amount(&complements.uniform, worker),
            );
        }
        pay
    }
}

impl ConceptCalculator for CleaningCalculator {
    fn salaried(&self, worker: &WorkerInput, sector: &SectorRule) -> EngineResult<PayComponents> {
        let mut pay = base_pay(worker, sector)?;
        let complements = &sector.complements;
        if worker.applies_training_bonus {
            pay.add(Concept::TrainingBonus, complements.training_bonus);
        }
        if worker.applies_night_shift {
            pay.add(Concept::NightShiftBonus, complements.night_shift_bonus);
        }
        if worker.applies_hazard_pay {
            pay.add(Concept::HazardBonus, complements.hazard_bonus);
        }
        if worker.applies_meal_allowance {
            pay.add(Concept::MealAllowance, meal_amount(&complements.meal, worker));
        }
        Ok(pay)
    }

    fn non_salaried(&self, worker: &WorkerInput, sector: &SectorRule) -> PayComponents {
        let mut pay = PayComponents::default();
        let complements = &sector.complements;
        if worker.applies_transport {
            pay.add(
                Concept::TransportAllowance,
                transport_amount(&complements.transport, worker),
            );
        }
        // Protective equipment is priced per selected item only.
        if !worker.uniform_items.is_empty() {
            pay.add(
                Concept::UniformAllowance,
                uniform_amount(&complements.uniform, worker),
            );
        }
        pay
    }
}

/// Returns the strategy for a calculator kind.
pub fn calculator_for(kind: CalculatorKind) -> &'static dyn ConceptCalculator {
    match kind {
        CalculatorKind::Hospitality => &HospitalityCalculator,
        CalculatorKind::Cleaning => &CleaningCalculator,
    }
}

/// Computes salaried concepts with the sector's strategy.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::compute_salaried_concepts;
/// use payroll_engine::config::builtin_registry;
/// use payroll_engine::models::{Concept, WorkerInput};
/// use rust_decimal::Decimal;
///
/// let registry = builtin_registry().unwrap();
/// let sector = registry.sector("hosteleria_valencia").unwrap();
/// let worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_III");
///
/// let pay = compute_salaried_concepts(&worker, sector).unwrap();
/// assert_eq!(pay.amount(Concept::BaseSalary), Decimal::new(121484, 2));
/// assert_eq!(pay.amount(Concept::ExtraPayProration), Decimal::new(30371, 2));
/// ```
pub fn compute_salaried_concepts(
    worker: &WorkerInput,
    sector: &SectorRule,
) -> EngineResult<PayComponents> {
    calculator_for(sector.calculator).salaried(worker, sector)
}

/// Computes non-salaried concepts with the sector's strategy.
pub fn compute_non_salaried_concepts(worker: &WorkerInput, sector: &SectorRule) -> PayComponents {
    calculator_for(sector.calculator).non_salaried(worker, sector)
}

/// Salaried plus non-salaried totals.
pub fn gross_total(salaried: &PayComponents, non_salaried: &PayComponents) -> Decimal {
    salaried.total() + non_salaried.total()
}

/// Pro-rated extra installments: `base * installments / 12`.
pub fn extra_pay_proration(base: Decimal, installments: u32) -> Decimal {
    base * Decimal::from(installments) / Decimal::from(MONTHS)
}

fn base_pay(worker: &WorkerInput, sector: &SectorRule) -> EngineResult<PayComponents> {
    let entry = sector
        .wage(&worker.wage_table, &worker.level)
        .ok_or_else(|| EngineError::InvalidCategory {
            table: worker.wage_table.clone(),
            level: worker.level.clone(),
        })?;

    let mut pay = PayComponents::default();
    pay.add(Concept::BaseSalary, entry.salary);
    pay.add(
        Concept::ExtraPayProration,
        extra_pay_proration(entry.salary, sector.extra_payments),
    );
    Ok(pay)
}

fn meal_amount(meal: &MealAllowance, worker: &WorkerInput) -> Decimal {
    match meal {
        MealAllowance::Flat { amount } => *amount,
        MealAllowance::ByEstablishment { amounts } => amounts.for_establishment(worker.establishment),
    }
}

fn transport_amount(transport: &TransportAllowance, worker: &WorkerInput) -> Decimal {
    match transport {
        TransportAllowance::Flat { amount } => *amount,
        TransportAllowance::ByZone { amounts } => {
            if worker.urban_zone {
                amounts.urban
            } else {
                amounts.interurban
            }
        }
        TransportAllowance::ByShift { restaurant, hotel } => {
            let column = match worker.establishment {
                Establishment::Hotel => hotel,
                Establishment::Restaurant => restaurant,
            };
            column.for_shift(worker.shift_type)
        }
    }
}

fn uniform_amount(uniform: &UniformAllowance, worker: &WorkerInput) -> Decimal {
    match uniform {
        UniformAllowance::Itemized { prices, .. } => worker
            .uniform_items
            .iter()
            .filter_map(|item| prices.get(item))
            .copied()
            .sum(),
        UniformAllowance::Flat { amount } => *amount,
        UniformAllowance::ByCategory { kits, default_kit } => kits
            .iter()
            .find(|(key, _)| worker.category.contains(key.as_str()))
            .map(|(_, kit)| kit)
            .or_else(|| kits.get(default_kit))
            .map(|kit| kit.total)
            .unwrap_or(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_registry;
    use crate::models::ShiftType;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn hospitality() -> SectorRule {
        builtin_registry()
            .unwrap()
            .sector("hosteleria_valencia")
            .unwrap()
            .clone()
    }

    fn cleaning() -> SectorRule {
        builtin_registry()
            .unwrap()
            .sector("limpieza_nacional")
            .unwrap()
            .clone()
    }

    #[test]
    fn test_proration_of_three_installments() {
        assert_eq!(extra_pay_proration(dec("1214.84"), 3), dec("303.71"));
        assert_eq!(extra_pay_proration(dec("1000"), 0), Decimal::ZERO);
    }

    #[test]
    fn test_hospitality_base_only() {
        let worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_III");
        let sector = hospitality();
        let salaried = compute_salaried_concepts(&worker, &sector).unwrap();
        let non_salaried = compute_non_salaried_concepts(&worker, &sector);

        assert_eq!(salaried.items().len(), 2);
        assert_eq!(salaried.total(), dec("1518.55"));
        assert!(non_salaried.items().is_empty());
        assert_eq!(gross_total(&salaried, &non_salaried), dec("1518.55"));
    }

    #[test]
    fn test_hospitality_hotel_meal_and_split_transport() {
        let mut worker = WorkerInput::new("camarero", "TABLA_II", "LEVEL_II");
        worker.establishment = Establishment::Hotel;
        worker.shift_type = ShiftType::Split;
        worker.applies_meal_allowance = true;
        worker.applies_transport = true;
        worker.applies_training_bonus = true;
        let sector = hospitality();

        let salaried = compute_salaried_concepts(&worker, &sector).unwrap();
        assert_eq!(salaried.amount(Concept::MealAllowance), dec("44.13"));
        assert_eq!(salaried.amount(Concept::TrainingBonus), dec("20"));

        let non_salaried = compute_non_salaried_concepts(&worker, &sector);
        assert_eq!(non_salaried.amount(Concept::TransportAllowance), dec("55.81"));
    }

    #[test]
    fn test_hospitality_restaurant_continuous_transport() {
        let mut worker = WorkerInput::new("barman", "TABLA_I", "LEVEL_III");
        worker.applies_transport = true;
        let non_salaried = compute_non_salaried_concepts(&worker, &hospitality());
        assert_eq!(non_salaried.amount(Concept::TransportAllowance), dec("46.80"));
    }

    #[test]
    fn test_hospitality_uniform_by_category_kit() {
        let mut worker = WorkerInput::new("ayudante_cocina", "TABLA_I", "LEVEL_IV");
        worker.applies_uniform = true;
        let sector = hospitality();
        // No "cocinero" substring: the default kit applies.
        let pay = compute_non_salaried_concepts(&worker, &sector);
        assert_eq!(pay.amount(Concept::UniformAllowance), dec("29.65"));

        worker.category = "cocinero".to_string();
        let pay = compute_non_salaried_concepts(&worker, &sector);
        assert_eq!(pay.amount(Concept::UniformAllowance), dec("17.31"));
    }

    #[test]
    fn test_cleaning_bonuses_and_ppe() {
        let mut worker = WorkerInput::new("limpiador", "TABLA_I", "LEVEL_III");
        worker.applies_training_bonus = true;
        worker.applies_hazard_pay = true;
        worker.applies_night_shift = true;
        worker.applies_meal_allowance = true;
        worker.uniform_items = vec!["guantes_latex".to_string(), "mascarilla_ffp2".to_string()];
        let sector = cleaning();

        let salaried = compute_salaried_concepts(&worker, &sector).unwrap();
        assert_eq!(salaried.amount(Concept::BaseSalary), dec("1215.50"));
        assert_eq!(salaried.amount(Concept::TrainingBonus), dec("25"));
        assert_eq!(salaried.amount(Concept::HazardBonus), dec("87.30"));
        assert_eq!(salaried.amount(Concept::NightShiftBonus), dec("95.50"));
        assert_eq!(salaried.amount(Concept::MealAllowance), dec("35"));

        let non_salaried = compute_non_salaried_concepts(&worker, &sector);
        assert_eq!(non_salaried.amount(Concept::UniformAllowance), dec("6.25"));
    }

    #[test]
    fn test_cleaning_transport_by_zone() {
        let mut worker = WorkerInput::new("cristalero", "TABLA_I", "LEVEL_II");
        worker.applies_transport = true;
        let sector = cleaning();
        let interurban = compute_non_salaried_concepts(&worker, &sector);
        assert_eq!(interurban.amount(Concept::TransportAllowance), dec("68.90"));

        worker.urban_zone = true;
        let urban = compute_non_salaried_concepts(&worker, &sector);
        assert_eq!(urban.amount(Concept::TransportAllowance), dec("52.40"));
    }

    #[test]
    fn test_hospitality_ignores_cleaning_bonuses() {
        let mut worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_III");
        worker.applies_night_shift = true;
        worker.applies_hazard_pay = true;
        let salaried = compute_salaried_concepts(&worker, &hospitality()).unwrap();
        assert!(!salaried.contains(Concept::NightShiftBonus));
        assert!(!salaried.contains(Concept::HazardBonus));
    }

    #[test]
    fn test_unknown_table_level_is_invalid_category() {
        let worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_IX");
        let result = compute_salaried_concepts(&worker, &hospitality());
        match result {
            Err(EngineError::InvalidCategory { table, level }) => {
                assert_eq!(table, "TABLA_I");
                assert_eq!(level, "LEVEL_IX");
            }
            other => panic!("Expected InvalidCategory, got {:?}", other),
        }
    }
}
