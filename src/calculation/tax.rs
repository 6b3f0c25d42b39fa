//! Progressive income-tax computation.
//!
//! The state and regional schedules are walked independently by
//! [`apply_brackets`] and summed. Nothing assumes the two schedules share
//! boundaries or bracket counts.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{FamilyMinimums, RegionRule, TaxBracket};
use crate::error::{EngineError, EngineResult};
use crate::models::{FamilyInput, TaxResult};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The three deductions applied after the assumed insurance deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Minimums {
    /// Personal minimum.
    pub personal: Decimal,
    /// Deductible-expenses constant.
    pub deductible_expenses: Decimal,
    /// Family minimum.
    pub family: Decimal,
}

impl Minimums {
    /// Sum of all three.
    pub fn total(&self) -> Decimal {
        self.personal + self.deductible_expenses + self.family
    }
}

/// Family minimum for a number of children.
///
/// Fixed amounts for the first, second and third child, plus a flat amount
/// for every child beyond the third. Amounts accumulate.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::family_minimum;
/// use payroll_engine::config::FamilyMinimums;
/// use rust_decimal::Decimal;
///
/// let steps = FamilyMinimums {
///     first_child: Decimal::new(2400, 0),
///     second_child: Decimal::new(2700, 0),
///     third_child: Decimal::new(4000, 0),
///     each_additional: Decimal::new(4500, 0),
/// };
/// assert_eq!(family_minimum(0, &steps), Decimal::ZERO);
/// assert_eq!(family_minimum(2, &steps), Decimal::new(5100, 0));
/// assert_eq!(family_minimum(5, &steps), Decimal::new(18100, 0));
/// ```
pub fn family_minimum(children: u8, steps: &FamilyMinimums) -> Decimal {
    let mut minimum = Decimal::ZERO;
    if children >= 1 {
        minimum += steps.first_child;
    }
    if children >= 2 {
        minimum += steps.second_child;
    }
    if children >= 3 {
        minimum += steps.third_child;
    }
    if children >= 4 {
        minimum += Decimal::from(children - 3) * steps.each_additional;
    }
    minimum
}

/// Personal minimum, deductible expenses and family minimum for a region.
pub fn compute_minimums(region: &RegionRule, children: u8) -> Minimums {
    Minimums {
        personal: region.minimums.personal,
        deductible_expenses: region.minimums.deductible_expenses,
        family: family_minimum(children, &region.minimums.family),
    }
}

/// Checks that a schedule is non-empty and ends in an unbounded bracket.
///
/// `id` names the schedule in the error.
pub fn check_schedule(brackets: &[TaxBracket], id: &str) -> EngineResult<()> {
    match brackets.last() {
        None => Err(EngineError::invalid_config(id, "bracket schedule is empty")),
        Some(last) if !last.is_unbounded() => Err(EngineError::invalid_config(
            id,
            "bracket schedule does not end in an unbounded bracket",
        )),
        Some(_) => Ok(()),
    }
}

/// Applies a progressive bracket schedule to a base.
///
/// Walks the brackets in order with a running floor. Each bounded bracket
/// taxes `min(base, up_to) - floor` at its rate and moves the floor to
/// `up_to`; the unbounded bracket taxes the rest and ends the walk.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if the schedule is empty or its
/// last bracket is bounded.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::apply_brackets;
/// use payroll_engine::config::TaxBracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![
///     TaxBracket::bounded(Decimal::new(10000, 0), Decimal::new(10, 0)),
///     TaxBracket::unbounded(Decimal::new(20, 0)),
/// ];
/// let tax = apply_brackets(Decimal::new(15000, 0), &brackets).unwrap();
/// assert_eq!(tax, Decimal::new(2000, 0)); // 1000 + 1000
/// ```
pub fn apply_brackets(base: Decimal, brackets: &[TaxBracket]) -> EngineResult<Decimal> {
    check_schedule(brackets, "bracket schedule")?;

    let mut tax = Decimal::ZERO;
    let mut floor = Decimal::ZERO;
    for bracket in brackets {
        if base <= floor {
            break;
        }
        match bracket.up_to {
            Some(up_to) => {
                let slice = (base.min(up_to) - floor).max(Decimal::ZERO);
                tax += slice * bracket.rate / HUNDRED;
                floor = floor.max(up_to);
            }
            None => {
                tax += (base - floor) * bracket.rate / HUNDRED;
                break;
            }
        }
    }
    Ok(tax)
}

/// The rate of the bracket a base falls into; zero for a non-positive base.
pub fn marginal_rate(base: Decimal, brackets: &[TaxBracket]) -> Decimal {
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    brackets
        .iter()
        .find(|bracket| bracket.up_to.is_none_or(|up_to| base <= up_to))
        .or_else(|| brackets.last())
        .map(|bracket| bracket.rate)
        .unwrap_or(Decimal::ZERO)
}

/// Computes the full tax result for a region.
///
/// `liquidable = annual - annual * assumed_insurance_rate / 100 - deductible
/// expenses - personal minimum - family minimum`. A liquidable base at or
/// below zero yields zero tax, withholding, effective and marginal rate.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] if either schedule is malformed.
pub fn compute_for_region(
    annual_taxable_base: Decimal,
    family: &FamilyInput,
    region: &RegionRule,
) -> EngineResult<TaxResult> {
    check_schedule(&region.state_brackets, &format!("{} state schedule", region.name))?;
    check_schedule(
        &region.regional_brackets,
        &format!("{} regional schedule", region.name),
    )?;

    let minimums = compute_minimums(region, family.children);
    let insurance_deduction = annual_taxable_base * region.assumed_insurance_rate / HUNDRED;
    let liquidable = annual_taxable_base - insurance_deduction - minimums.total();
    debug!(
        annual_taxable_base = %annual_taxable_base,
        liquidable_base = %liquidable,
        children = family.children,
        "liquidable base computed"
    );

    let mut result = TaxResult {
        annual_taxable_base,
        insurance_deduction,
        deductible_expenses: minimums.deductible_expenses,
        personal_minimum: minimums.personal,
        family_minimum: minimums.family,
        ..TaxResult::default()
    };
    if liquidable <= Decimal::ZERO {
        return Ok(result);
    }

    let state_tax = apply_brackets(liquidable, &region.state_brackets)?;
    let regional_tax = apply_brackets(liquidable, &region.regional_brackets)?;
    let annual_quota = state_tax + regional_tax;

    result.liquidable_base = liquidable;
    result.state_tax = state_tax;
    result.regional_tax = regional_tax;
    result.annual_quota = annual_quota;
    result.effective_rate = if annual_taxable_base.is_zero() {
        Decimal::ZERO
    } else {
        annual_quota / annual_taxable_base * HUNDRED
    };
    result.marginal_rate = marginal_rate(liquidable, &region.state_brackets)
        + marginal_rate(liquidable, &region.regional_brackets);
    result.monthly_withholding = annual_quota / Decimal::from(12);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_registry;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn valencia() -> RegionRule {
        builtin_registry().unwrap().region("valencia").unwrap().clone()
    }

    #[test]
    fn test_family_minimum_is_additive() {
        let steps = valencia().minimums.family;
        assert_eq!(family_minimum(0, &steps), Decimal::ZERO);
        assert_eq!(family_minimum(1, &steps), dec("2400"));
        assert_eq!(family_minimum(2, &steps), dec("5100"));
        assert_eq!(family_minimum(3, &steps), dec("9100"));
        assert_eq!(family_minimum(4, &steps), dec("13600"));
        assert_eq!(family_minimum(10, &steps), dec("40600"));
    }

    #[test]
    fn test_minimums_total() {
        let minimums = compute_minimums(&valencia(), 1);
        assert_eq!(minimums.total(), dec("9950"));
    }

    #[test]
    fn test_apply_brackets_walks_every_bracket() {
        let state = valencia().state_brackets;
        // 12450 * 19% + 7750 * 24% + 15000 * 30% + 24800 * 37% + 40000 * 45%
        let tax = apply_brackets(dec("100000"), &state).unwrap();
        assert_eq!(tax, dec("35901.50"));
    }

    #[test]
    fn test_apply_brackets_above_last_boundary() {
        let state = valencia().state_brackets;
        let below = apply_brackets(dec("300000"), &state).unwrap();
        let above = apply_brackets(dec("300100"), &state).unwrap();
        assert_eq!(above - below, dec("47"));
    }

    #[test]
    fn test_apply_brackets_zero_base() {
        let state = valencia().state_brackets;
        assert_eq!(apply_brackets(Decimal::ZERO, &state).unwrap(), Decimal::ZERO);
        assert_eq!(apply_brackets(dec("-50"), &state).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_apply_brackets_requires_unbounded_terminal() {
        let brackets = vec![TaxBracket::bounded(dec("10000"), dec("10"))];
        let result = apply_brackets(dec("5000"), &brackets);
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
        assert!(apply_brackets(dec("5000"), &[]).is_err());
    }

    #[test]
    fn test_marginal_rate_lookup() {
        let state = valencia().state_brackets;
        assert_eq!(marginal_rate(dec("9491.77"), &state), dec("19"));
        assert_eq!(marginal_rate(dec("12450"), &state), dec("19"));
        assert_eq!(marginal_rate(dec("12450.01"), &state), dec("24"));
        assert_eq!(marginal_rate(dec("1000000"), &state), dec("47"));
        assert_eq!(marginal_rate(Decimal::ZERO, &state), Decimal::ZERO);
    }

    #[test]
    fn test_valencia_cook_level_three() {
        let result =
            compute_for_region(dec("18222.60"), &FamilyInput::default(), &valencia()).unwrap();
        assert_eq!(result.insurance_deduction, dec("1180.82448"));
        assert_eq!(result.liquidable_base, dec("9491.77552"));
        assert_eq!(result.state_tax, dec("1803.4373488"));
        assert_eq!(result.regional_tax, dec("47.4588776"));
        assert_eq!(result.annual_quota, dec("1850.8962264"));
        assert_eq!(result.monthly_withholding, dec("154.2413522"));
        assert_eq!(result.marginal_rate, dec("19.5"));
    }

    #[test]
    fn test_non_positive_liquidable_base_zeroes_everything() {
        let result =
            compute_for_region(dec("9000"), &FamilyInput::with_children(2), &valencia()).unwrap();
        assert_eq!(result.liquidable_base, Decimal::ZERO);
        assert_eq!(result.state_tax, Decimal::ZERO);
        assert_eq!(result.regional_tax, Decimal::ZERO);
        assert_eq!(result.annual_quota, Decimal::ZERO);
        assert_eq!(result.effective_rate, Decimal::ZERO);
        assert_eq!(result.monthly_withholding, Decimal::ZERO);
        assert_eq!(result.family_minimum, dec("5100"));
    }

    #[test]
    fn test_asymmetric_schedules_are_summed_independently() {
        let mut region = valencia();
        region.regional_brackets = vec![
            TaxBracket::bounded(dec("5000"), dec("10")),
            TaxBracket::unbounded(dec("20")),
        ];
        let result = compute_for_region(dec("18222.60"), &FamilyInput::default(), &region).unwrap();
        // 5000 * 10% + 4491.77552 * 20%
        assert_eq!(result.regional_tax, dec("1398.355104"));
        assert_eq!(result.state_tax, dec("1803.4373488"));
    }
}
