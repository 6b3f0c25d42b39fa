//! Rule file loading and normalization.
//!
//! This module provides the [`RuleLoader`] type, which parses region and
//! sector YAML files, fills omitted region data from the national defaults
//! and resolves every sector complement to the canonical [`Complements`]
//! shape before anything is registered.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::registry::{RegistryBuilder, RuleRegistry};
use super::types::{
    CalculatorKind, Complements, EstablishmentAmounts, ExpectedRange, MealAllowance, RegionRule,
    SectorCheck, SectorRule, ShiftAmounts, SocialInsurance, TaxBracket, TaxMinimums,
    TransportAllowance, UniformAllowance, UniformKit, WageTables, ZoneAmounts,
};

const NATIONAL_YAML: &str = include_str!("../../config/national.yaml");
const ANNEX_YAML: &str = include_str!("../../config/legacy/hospitality_annex.yaml");

const EMBEDDED_REGIONS: [(&str, &str); 5] = [
    ("valencia", include_str!("../../config/regions/valencia.yaml")),
    ("madrid", include_str!("../../config/regions/madrid.yaml")),
    ("cataluna", include_str!("../../config/regions/cataluna.yaml")),
    ("andalucia", include_str!("../../config/regions/andalucia.yaml")),
    ("pais_vasco", include_str!("../../config/regions/pais_vasco.yaml")),
];

const EMBEDDED_SECTORS: [(&str, &str); 2] = [
    (
        "hosteleria_valencia",
        include_str!("../../config/sectors/hosteleria_valencia.yaml"),
    ),
    (
        "limpieza_nacional",
        include_str!("../../config/sectors/limpieza_nacional.yaml"),
    ),
];

/// National defaults: `national.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct NationalFile {
    assumed_insurance_rate: Decimal,
    state_brackets: Vec<TaxBracket>,
    minimums: TaxMinimums,
    social_insurance: SocialInsurance,
}

/// One establishment column of the legacy annex.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnnexColumn {
    transport_split: Decimal,
    transport_continuous: Decimal,
    meal: Decimal,
}

/// Legacy complement table: `legacy/hospitality_annex.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnnexFile {
    training_bonus: Decimal,
    extra_payments: u32,
    restaurant: AnnexColumn,
    hotel: AnnexColumn,
    uniform_kits: BTreeMap<String, UniformKit>,
    default_kit: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionFile {
    name: Option<String>,
    regional_brackets: Option<Vec<TaxBracket>>,
    state_brackets: Option<Vec<TaxBracket>>,
    minimums: Option<TaxMinimums>,
    social_insurance: Option<SocialInsurance>,
    assumed_insurance_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShiftTable {
    restaurant: ShiftAmounts,
    hotel: ShiftAmounts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemTable {
    prices: BTreeMap<String, Decimal>,
    #[serde(default)]
    mandatory: Vec<String>,
}

/// Sector-specific structured complements, highest priority.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StructuredComplements {
    meal_by_establishment: Option<EstablishmentAmounts>,
    transport_by_zone: Option<ZoneAmounts>,
    transport_by_shift: Option<ShiftTable>,
    uniform_items: Option<ItemTable>,
}

/// Sector-specific flat complements, used when no structured form exists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlatComplements {
    meal: Option<Decimal>,
    transport: Option<Decimal>,
    uniform: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComplementsFile {
    training_bonus: Option<Decimal>,
    night_shift_bonus: Option<Decimal>,
    hazard_bonus: Option<Decimal>,
    #[serde(default)]
    structured: StructuredComplements,
    #[serde(default)]
    flat: FlatComplements,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SectorFile {
    name: Option<String>,
    calculator: Option<CalculatorKind>,
    check: Option<SectorCheck>,
    extra_payments: Option<u32>,
    wage_tables: Option<WageTables>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    complements: ComplementsFile,
    #[serde(default)]
    expected_ranges: BTreeMap<String, ExpectedRange>,
}

/// Parses rule files into canonical rule sets.
///
/// A loader holds the national defaults and the legacy complement annex;
/// every region or sector it parses is normalized against them.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── national.yaml                # State schedule, minimums, social insurance
/// ├── legacy/
/// │   └── hospitality_annex.yaml   # Legacy complement table
/// ├── regions/
/// │   └── valencia.yaml            # Regional schedule (+ optional overrides)
/// └── sectors/
///     └── hosteleria_valencia.yaml # Wage tables and complements
/// ```
///
/// # Example
///
/// ```
/// use payroll_engine::config::RuleLoader;
///
/// let loader = RuleLoader::embedded().unwrap();
/// let region = loader
///     .parse_region("test", "name: Test\nregional_brackets:\n  - rate: 1.0\n", "test.yaml")
///     .unwrap();
/// // The state schedule is inherited from the national defaults.
/// assert_eq!(region.state_brackets.len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct RuleLoader {
    national: NationalFile,
    annex: AnnexFile,
}

impl RuleLoader {
    /// Builds a loader from the national defaults and legacy annex sources.
    pub fn from_yaml(national: &str, annex: &str) -> EngineResult<Self> {
        let national: NationalFile = parse_yaml(national, "national.yaml")?;
        let annex: AnnexFile = parse_yaml(annex, "legacy/hospitality_annex.yaml")?;
        if !annex.uniform_kits.contains_key(&annex.default_kit) {
            return Err(EngineError::invalid_config(
                "legacy/hospitality_annex.yaml",
                format!("default kit '{}' is not defined", annex.default_kit),
            ));
        }
        Ok(Self { national, annex })
    }

    /// Builds a loader from the defaults compiled into the crate.
    pub fn embedded() -> EngineResult<Self> {
        Self::from_yaml(NATIONAL_YAML, ANNEX_YAML)
    }

    /// Loads a whole configuration directory into a registry builder.
    ///
    /// Region and sector files are registered in file-name order, using the
    /// file stem as the identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `national.yaml` or `legacy/hospitality_annex.yaml` is missing
    /// - any file contains invalid YAML or unknown fields
    /// - any rule set fails registration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use payroll_engine::config::RuleLoader;
    ///
    /// let registry = RuleLoader::load_dir("./config")?.freeze();
    /// assert!(registry.region("valencia").is_some());
    /// # Ok::<(), payroll_engine::error::EngineError>(())
    /// ```
    pub fn load_dir<P: AsRef<Path>>(path: P) -> EngineResult<RegistryBuilder> {
        let path = path.as_ref();
        let national = read_file(&path.join("national.yaml"))?;
        let annex = read_file(&path.join("legacy").join("hospitality_annex.yaml"))?;
        let loader = Self::from_yaml(&national, &annex)?;

        let mut builder = RegistryBuilder::new();
        for (id, file) in yaml_files(&path.join("regions"))? {
            let content = read_file(&file)?;
            let rule = loader.parse_region(&id, &content, &file.display().to_string())?;
            builder.register_region(id, rule)?;
        }
        for (id, file) in yaml_files(&path.join("sectors"))? {
            let content = read_file(&file)?;
            let rule = loader.parse_sector(&id, &content, &file.display().to_string())?;
            builder.register_sector(id, rule)?;
        }
        Ok(builder)
    }

    /// Registers the rule files compiled into the crate.
    pub fn embedded_registry() -> EngineResult<RegistryBuilder> {
        let loader = Self::embedded()?;
        let mut builder = RegistryBuilder::new();
        for (id, source) in EMBEDDED_REGIONS {
            let rule = loader.parse_region(id, source, &format!("regions/{id}.yaml"))?;
            builder.register_region(id, rule)?;
        }
        for (id, source) in EMBEDDED_SECTORS {
            let rule = loader.parse_sector(id, source, &format!("sectors/{id}.yaml"))?;
            builder.register_sector(id, rule)?;
        }
        Ok(builder)
    }

    /// Parses one region file, inheriting omitted parts from the national defaults.
    ///
    /// `origin` names the source in error messages.
    pub fn parse_region(&self, id: &str, yaml: &str, origin: &str) -> EngineResult<RegionRule> {
        let file: RegionFile = parse_yaml(yaml, origin)?;
        let regional_brackets = file
            .regional_brackets
            .ok_or_else(|| missing_field(id, "regional_brackets"))?;

        let rule = RegionRule {
            name: file.name.ok_or_else(|| missing_field(id, "name"))?,
            state_brackets: file
                .state_brackets
                .unwrap_or_else(|| self.national.state_brackets.clone()),
            regional_brackets,
            minimums: file.minimums.unwrap_or(self.national.minimums),
            social_insurance: file
                .social_insurance
                .unwrap_or(self.national.social_insurance),
            assumed_insurance_rate: file
                .assumed_insurance_rate
                .unwrap_or(self.national.assumed_insurance_rate),
        };
        check_region_amounts(id, &rule)?;
        Ok(rule)
    }

    /// Parses one sector file and normalizes its complements.
    pub fn parse_sector(&self, id: &str, yaml: &str, origin: &str) -> EngineResult<SectorRule> {
        let file: SectorFile = parse_yaml(yaml, origin)?;
        let complements = self.normalize_complements(id, file.complements)?;

        let rule = SectorRule {
            name: file.name.ok_or_else(|| missing_field(id, "name"))?,
            calculator: file
                .calculator
                .ok_or_else(|| missing_field(id, "calculator"))?,
            check: file.check.ok_or_else(|| missing_field(id, "check"))?,
            extra_payments: file.extra_payments.unwrap_or(self.annex.extra_payments),
            wage_tables: file
                .wage_tables
                .ok_or_else(|| missing_field(id, "wage_tables"))?,
            categories: file.categories,
            complements,
            expected_ranges: file.expected_ranges,
        };
        for (table, levels) in &rule.wage_tables {
            for (level, entry) in levels {
                non_negative(id, &format!("wage_tables.{table}.{level}"), entry.salary)?;
            }
        }
        Ok(rule)
    }

    /// Resolves each complement through structured, then flat, then the legacy annex.
    fn normalize_complements(&self, id: &str, raw: ComplementsFile) -> EngineResult<Complements> {
        let annex = &self.annex;

        let meal = match (raw.structured.meal_by_establishment, raw.flat.meal) {
            (Some(amounts), _) => MealAllowance::ByEstablishment { amounts },
            (None, Some(amount)) => MealAllowance::Flat { amount },
            (None, None) => MealAllowance::ByEstablishment {
                amounts: EstablishmentAmounts {
                    restaurant: annex.restaurant.meal,
                    hotel: annex.hotel.meal,
                },
            },
        };

        let transport = if let Some(amounts) = raw.structured.transport_by_zone {
            TransportAllowance::ByZone { amounts }
        } else if let Some(table) = raw.structured.transport_by_shift {
            TransportAllowance::ByShift {
                restaurant: table.restaurant,
                hotel: table.hotel,
            }
        } else if let Some(amount) = raw.flat.transport {
            TransportAllowance::Flat { amount }
        } else {
            TransportAllowance::ByShift {
                restaurant: ShiftAmounts {
                    split: annex.restaurant.transport_split,
                    continuous: annex.restaurant.transport_continuous,
                },
                hotel: ShiftAmounts {
                    split: annex.hotel.transport_split,
                    continuous: annex.hotel.transport_continuous,
                },
            }
        };

        let uniform = match (raw.structured.uniform_items, raw.flat.uniform) {
            (Some(table), _) => {
                if let Some(unknown) = table
                    .mandatory
                    .iter()
                    .find(|item| !table.prices.contains_key(*item))
                {
                    return Err(EngineError::invalid_config(
                        id,
                        format!("mandatory item '{unknown}' has no price"),
                    ));
                }
                UniformAllowance::Itemized {
                    prices: table.prices,
                    mandatory: table.mandatory,
                }
            }
            (None, Some(amount)) => UniformAllowance::Flat { amount },
            (None, None) => UniformAllowance::ByCategory {
                kits: annex.uniform_kits.clone(),
                default_kit: annex.default_kit.clone(),
            },
        };

        let complements = Complements {
            training_bonus: raw.training_bonus.unwrap_or(annex.training_bonus),
            night_shift_bonus: raw.night_shift_bonus.unwrap_or(Decimal::ZERO),
            hazard_bonus: raw.hazard_bonus.unwrap_or(Decimal::ZERO),
            meal,
            transport,
            uniform,
        };
        check_complement_amounts(id, &complements)?;
        debug!(sector = id, "complements normalized");
        Ok(complements)
    }
}

/// Loads, registers and freezes the rule files compiled into the crate.
///
/// # Example
///
/// ```
/// use payroll_engine::config::builtin_registry;
///
/// let registry = builtin_registry().unwrap();
/// assert_eq!(registry.regions().count(), 5);
/// assert!(registry.sector("hosteleria_valencia").is_some());
/// ```
pub fn builtin_registry() -> EngineResult<RuleRegistry> {
    Ok(RuleLoader::embedded_registry()?.freeze())
}

/// Parses a YAML source, mapping failures to [`EngineError::ConfigParseError`].
pub(crate) fn parse_yaml<T: serde::de::DeserializeOwned>(source: &str, origin: &str) -> EngineResult<T> {
    serde_yaml::from_str(source).map_err(|e| EngineError::ConfigParseError {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

/// Reads a file, mapping failures to [`EngineError::ConfigNotFound`].
pub(crate) fn read_file(path: &Path) -> EngineResult<String> {
    fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
        path: path.display().to_string(),
    })
}

/// Lists `*.yaml` files in a directory as (stem, path), sorted by file name.
fn yaml_files(dir: &Path) -> EngineResult<Vec<(String, std::path::PathBuf)>> {
    let dir_str = dir.display().to_string();
    let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
        path: dir_str.clone(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "yaml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.push((stem.to_string(), path.clone()));
            }
        }
    }
    files.sort();
    Ok(files)
}

fn missing_field(id: &str, field: &str) -> EngineError {
    EngineError::invalid_config(id, format!("missing required field '{field}'"))
}

fn non_negative(id: &str, field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_config(
            id,
            format!("{field} must not be negative (got {value})"),
        ));
    }
    Ok(())
}

fn check_region_amounts(id: &str, rule: &RegionRule) -> EngineResult<()> {
    let si = &rule.social_insurance;
    non_negative(id, "social_insurance.min_base", si.min_base)?;
    if si.min_base > si.max_base {
        return Err(EngineError::invalid_config(
            id,
            format!(
                "social_insurance.min_base {} exceeds max_base {}",
                si.min_base, si.max_base
            ),
        ));
    }
    for (concept, rate) in si.employee.named() {
        non_negative(id, &format!("employee rate {concept:?}"), rate)?;
    }
    for (concept, rate) in si.employer.named() {
        non_negative(id, &format!("employer rate {concept:?}"), rate)?;
    }
    non_negative(id, "assumed_insurance_rate", rule.assumed_insurance_rate)?;
    let m = &rule.minimums;
    for (field, value) in [
        ("minimums.personal", m.personal),
        ("minimums.deductible_expenses", m.deductible_expenses),
        ("minimums.family.first_child", m.family.first_child),
        ("minimums.family.second_child", m.family.second_child),
        ("minimums.family.third_child", m.family.third_child),
        ("minimums.family.each_additional", m.family.each_additional),
    ] {
        non_negative(id, field, value)?;
    }
    Ok(())
}

fn check_complement_amounts(id: &str, c: &Complements) -> EngineResult<()> {
    let mut amounts = vec![
        ("training_bonus".to_string(), c.training_bonus),
        ("night_shift_bonus".to_string(), c.night_shift_bonus),
        ("hazard_bonus".to_string(), c.hazard_bonus),
    ];
    match &c.meal {
        MealAllowance::Flat { amount } => amounts.push(("meal".into(), *amount)),
        MealAllowance::ByEstablishment { amounts: a } => {
            amounts.push(("meal.restaurant".into(), a.restaurant));
            amounts.push(("meal.hotel".into(), a.hotel));
        }
    }
    match &c.transport {
        TransportAllowance::Flat { amount } => amounts.push(("transport".into(), *amount)),
        TransportAllowance::ByZone { amounts: a } => {
            amounts.push(("transport.urban".into(), a.urban));
            amounts.push(("transport.interurban".into(), a.interurban));
        }
        TransportAllowance::ByShift { restaurant, hotel } => {
            for (column, shift) in [("restaurant", restaurant), ("hotel", hotel)] {
                amounts.push((format!("transport.{column}.split"), shift.split));
                amounts.push((format!("transport.{column}.continuous"), shift.continuous));
            }
        }
    }
    match &c.uniform {
        UniformAllowance::Itemized { prices, .. } => {
            for (item, price) in prices {
                amounts.push((format!("uniform.{item}"), *price));
            }
        }
        UniformAllowance::Flat { amount } => amounts.push(("uniform".into(), *amount)),
        UniformAllowance::ByCategory { kits, .. } => {
            for (kit, value) in kits {
                amounts.push((format!("uniform.{kit}"), value.total));
            }
        }
    }
    for (field, value) in amounts {
        non_negative(id, &field, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn loader() -> RuleLoader {
        RuleLoader::embedded().unwrap()
    }

    #[test]
    fn test_region_inherits_national_defaults() {
        let yaml = r#"
name: Test Region
regional_brackets:
  - up_to: 10000
    rate: 10.0
  - rate: 20.0
"#;
        let region = loader().parse_region("test", yaml, "test.yaml").unwrap();
        assert_eq!(region.name, "Test Region");
        assert_eq!(region.state_brackets.len(), 6);
        assert_eq!(region.state_brackets[0].rate, dec("19"));
        assert_eq!(region.minimums.personal, dec("5550"));
        assert_eq!(region.social_insurance.min_base, dec("1381.20"));
        assert_eq!(region.assumed_insurance_rate, dec("6.48"));
    }

    #[test]
    fn test_region_overrides_replace_defaults() {
        let yaml = r#"
name: Foral
assumed_insurance_rate: 0
state_brackets:
  - rate: 5.0
regional_brackets:
  - rate: 5.0
"#;
        let region = loader().parse_region("foral", yaml, "foral.yaml").unwrap();
        assert_eq!(region.state_brackets, vec![TaxBracket::unbounded(dec("5"))]);
        assert_eq!(region.assumed_insurance_rate, Decimal::ZERO);
    }

    #[test]
    fn test_region_without_regional_schedule_is_invalid() {
        let result = loader().parse_region("broken", "name: Broken\n", "broken.yaml");
        match result {
            Err(EngineError::InvalidConfig { id, message }) => {
                assert_eq!(id, "broken");
                assert!(message.contains("regional_brackets"));
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_is_a_parse_error() {
        let yaml = "name: Typo\nregional_bracket:\n  - rate: 1\n";
        let result = loader().parse_region("typo", yaml, "typo.yaml");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let yaml = r#"
name: Negative
social_insurance:
  min_base: 1000
  max_base: 4000
  employee: { common_contingencies: -1, unemployment: 1, training: 0, intergenerational_equity: 0 }
  employer: { common_contingencies: 1, occupational_accident: 1, unemployment: 1, wage_guarantee: 0, training: 0, intergenerational_equity: 0 }
regional_brackets:
  - rate: 1
"#;
        let result = loader().parse_region("negative", yaml, "negative.yaml");
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_sector_without_complements_uses_legacy_annex() {
        let yaml = r#"
name: Bare
calculator: hospitality
check: hospitality
wage_tables:
  TABLA_I:
    LEVEL_I: { salary: 1000 }
"#;
        let sector = loader().parse_sector("bare", yaml, "bare.yaml").unwrap();
        let c = &sector.complements;
        assert_eq!(sector.extra_payments, 3);
        assert_eq!(c.training_bonus, dec("20"));
        assert_eq!(c.night_shift_bonus, Decimal::ZERO);
        assert!(matches!(c.meal, MealAllowance::ByEstablishment { .. }));
        match &c.transport {
            TransportAllowance::ByShift { restaurant, hotel } => {
                assert_eq!(restaurant.split, dec("66.96"));
                assert_eq!(hotel.continuous, dec("36.01"));
            }
            other => panic!("Expected ByShift, got {:?}", other),
        }
        match &c.uniform {
            UniformAllowance::ByCategory { kits, default_kit } => {
                assert_eq!(kits["cocinero"].total, dec("17.31"));
                assert_eq!(default_kit, "camarero");
            }
            other => panic!("Expected ByCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_structured_wins_over_flat() {
        let yaml = r#"
name: Both
calculator: cleaning
check: cleaning
extra_payments: 2
wage_tables:
  TABLA_I:
    LEVEL_I: { salary: 1000 }
complements:
  flat:
    transport: 40
    meal: 30
  structured:
    transport_by_zone: { urban: 50, interurban: 70 }
"#;
        let sector = loader().parse_sector("both", yaml, "both.yaml").unwrap();
        assert_eq!(sector.extra_payments, 2);
        assert!(matches!(
            sector.complements.transport,
            TransportAllowance::ByZone { .. }
        ));
        assert_eq!(
            sector.complements.meal,
            MealAllowance::Flat { amount: dec("30") }
        );
    }

    #[test]
    fn test_sector_missing_calculator_is_invalid() {
        let yaml = r#"
name: NoCalc
check: cleaning
wage_tables:
  TABLA_I:
    LEVEL_I: { salary: 1000 }
"#;
        let result = loader().parse_sector("nocalc", yaml, "nocalc.yaml");
        match result {
            Err(EngineError::InvalidConfig { message, .. }) => {
                assert!(message.contains("calculator"));
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_mandatory_item_must_be_priced() {
        let yaml = r#"
name: Ppe
calculator: cleaning
check: cleaning
wage_tables:
  TABLA_I:
    LEVEL_I: { salary: 1000 }
complements:
  structured:
    uniform_items:
      prices: { guantes_latex: 3.45 }
      mandatory: [casco]
"#;
        let result = loader().parse_sector("ppe", yaml, "ppe.yaml");
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_embedded_registry_loads_every_file() {
        let registry = builtin_registry().unwrap();
        let regions: Vec<&str> = registry.regions().map(|(id, _)| id).collect();
        assert_eq!(
            regions,
            vec!["valencia", "madrid", "cataluna", "andalucia", "pais_vasco"]
        );
        let cleaning = registry.sector("limpieza_nacional").unwrap();
        assert_eq!(cleaning.calculator, CalculatorKind::Cleaning);
        assert_eq!(
            cleaning.wage("TABLA_I", "LEVEL_III").unwrap().salary,
            dec("1215.50")
        );
        assert!(cleaning.complements.uniform.whitelist().contains("guantes_latex"));
    }

    #[test]
    fn test_load_dir_reads_shipped_config() {
        let registry = RuleLoader::load_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/config"))
            .unwrap()
            .freeze();
        let regions: Vec<&str> = registry.regions().map(|(id, _)| id).collect();
        assert_eq!(
            regions,
            vec!["andalucia", "cataluna", "madrid", "pais_vasco", "valencia"]
        );
        let sectors: Vec<&str> = registry.sectors().map(|(id, _)| id).collect();
        assert_eq!(sectors, vec!["hosteleria_valencia", "limpieza_nacional"]);
        assert_eq!(
            registry.region("valencia"),
            builtin_registry().unwrap().region("valencia")
        );
    }

    #[test]
    fn test_load_dir_missing_directory() {
        let result = RuleLoader::load_dir("/nonexistent/payroll/config");
        assert!(matches!(result, Err(EngineError::ConfigNotFound { .. })));
    }
}
