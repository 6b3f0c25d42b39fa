//! The jurisdiction rule registry.
//!
//! Registration happens on a [`RegistryBuilder`] during startup. Freezing it
//! yields a [`RuleRegistry`] with no mutating methods, which the engine shares
//! behind an `Arc`.

use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};

use super::types::{RegionRule, SectorRule};

/// What a registration call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The id was new.
    Inserted,
    /// The id was already registered and its rule set was overwritten.
    Replaced,
}

/// Entries keyed by id, iterated in first-registration order.
#[derive(Debug, Clone)]
struct Entries<T> {
    items: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Entries<T> {
    fn insert(&mut self, id: String, value: T) -> Registration {
        match self.index.get(&id) {
            Some(&position) => {
                self.items[position].1 = value;
                Registration::Replaced
            }
            None => {
                self.index.insert(id.clone(), self.items.len());
                self.items.push((id, value));
                Registration::Inserted
            }
        }
    }

    fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&position| &self.items[position].1)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items.iter().map(|(id, value)| (id.as_str(), value))
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

fn check_id(id: &str) -> EngineResult<()> {
    if id.trim().is_empty() {
        return Err(EngineError::invalid_config(
            "<empty>",
            "rule-set id must not be empty",
        ));
    }
    Ok(())
}

fn check_name(id: &str, name: &str) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::invalid_config(id, "name must not be empty"));
    }
    Ok(())
}

/// Collects rule sets during the single-writer startup phase.
///
/// # Example
///
/// ```
/// use payroll_engine::config::{RegistryBuilder, Registration, RuleLoader};
///
/// let loader = RuleLoader::embedded().unwrap();
/// let rule = loader
///     .parse_region("x", "name: X\nregional_brackets:\n  - rate: 2\n", "x.yaml")
///     .unwrap();
///
/// let mut builder = RegistryBuilder::new();
/// assert_eq!(builder.register_region("x", rule.clone()).unwrap(), Registration::Inserted);
/// assert_eq!(builder.register_region("x", rule).unwrap(), Registration::Replaced);
///
/// let registry = builder.freeze();
/// assert_eq!(registry.regions().count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    regions: Entries<RegionRule>,
    sectors: Entries<SectorRule>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a region rule set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if the id or name is empty or
    /// either tax schedule is empty. Re-registering an id is not an error: it
    /// returns [`Registration::Replaced`] and logs a warning.
    pub fn register_region(
        &mut self,
        id: impl Into<String>,
        rule: RegionRule,
    ) -> EngineResult<Registration> {
        let id = id.into();
        check_id(&id)?;
        check_name(&id, &rule.name)?;
        if rule.state_brackets.is_empty() {
            return Err(EngineError::invalid_config(&id, "state tax schedule is empty"));
        }
        if rule.regional_brackets.is_empty() {
            return Err(EngineError::invalid_config(
                &id,
                "regional tax schedule is empty",
            ));
        }

        let registration = self.regions.insert(id.clone(), rule);
        log_registration("region", &id, registration);
        Ok(registration)
    }

    /// Registers a sector rule set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if the id or name is empty or the
    /// wage tables are empty. Re-registering an id returns
    /// [`Registration::Replaced`] and logs a warning.
    pub fn register_sector(
        &mut self,
        id: impl Into<String>,
        rule: SectorRule,
    ) -> EngineResult<Registration> {
        let id = id.into();
        check_id(&id)?;
        check_name(&id, &rule.name)?;
        if rule.wage_tables.is_empty() {
            return Err(EngineError::invalid_config(&id, "wage tables are empty"));
        }
        if let Some((table, _)) = rule.wage_tables.iter().find(|(_, levels)| levels.is_empty()) {
            return Err(EngineError::invalid_config(
                &id,
                format!("wage table '{table}' has no levels"),
            ));
        }

        let registration = self.sectors.insert(id.clone(), rule);
        log_registration("sector", &id, registration);
        Ok(registration)
    }

    /// Ends the startup phase.
    pub fn freeze(self) -> RuleRegistry {
        info!(
            regions = self.regions.len(),
            sectors = self.sectors.len(),
            "rule registry frozen"
        );
        RuleRegistry {
            regions: self.regions,
            sectors: self.sectors,
        }
    }
}

fn log_registration(kind: &str, id: &str, registration: Registration) {
    match registration {
        Registration::Inserted => info!(kind, id, "rule set registered"),
        Registration::Replaced => warn!(kind, id, "rule set re-registered, previous entry replaced"),
    }
}

/// Immutable region and sector rule sets.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    regions: Entries<RegionRule>,
    sectors: Entries<SectorRule>,
}

impl RuleRegistry {
    /// Looks up a region.
    pub fn region(&self, id: &str) -> Option<&RegionRule> {
        self.regions.get(id)
    }

    /// Looks up a sector.
    pub fn sector(&self, id: &str) -> Option<&SectorRule> {
        self.sectors.get(id)
    }

    /// All regions in registration order.
    pub fn regions(&self) -> impl Iterator<Item = (&str, &RegionRule)> {
        self.regions.iter()
    }

    /// All sectors in registration order.
    pub fn sectors(&self) -> impl Iterator<Item = (&str, &SectorRule)> {
        self.sectors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleLoader;

    fn region(name: &str) -> RegionRule {
        RuleLoader::embedded()
            .unwrap()
            .parse_region("r", &format!("name: {name}\nregional_brackets:\n  - rate: 1\n"), "r.yaml")
            .unwrap()
    }

    fn sector() -> SectorRule {
        RuleLoader::embedded()
            .unwrap()
            .parse_sector(
                "s",
                "name: S\ncalculator: hospitality\ncheck: hospitality\nwage_tables:\n  TABLA_I:\n    LEVEL_I: { salary: 1000 }\n",
                "s.yaml",
            )
            .unwrap()
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let mut builder = RegistryBuilder::new();
        let result = builder.register_region("  ", region("A"));
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut builder = RegistryBuilder::new();
        let mut rule = region("A");
        rule.name = String::new();
        let result = builder.register_region("a", rule);
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_empty_schedule_is_rejected() {
        let mut builder = RegistryBuilder::new();
        let mut rule = region("A");
        rule.regional_brackets.clear();
        match builder.register_region("a", rule) {
            Err(EngineError::InvalidConfig { id, message }) => {
                assert_eq!(id, "a");
                assert!(message.contains("regional"));
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_wage_tables_are_rejected() {
        let mut builder = RegistryBuilder::new();
        let mut rule = sector();
        rule.wage_tables.clear();
        assert!(builder.register_sector("s", rule).is_err());

        let mut rule = sector();
        rule.wage_tables.insert("TABLA_II".to_string(), Default::default());
        assert!(builder.register_sector("s", rule).is_err());
    }

    #[test]
    fn test_replacement_keeps_original_position() {
        let mut builder = RegistryBuilder::new();
        assert_eq!(builder.register_region("a", region("A")).unwrap(), Registration::Inserted);
        assert_eq!(builder.register_region("b", region("B")).unwrap(), Registration::Inserted);
        assert_eq!(builder.register_region("a", region("A2")).unwrap(), Registration::Replaced);

        let registry = builder.freeze();
        let listed: Vec<(&str, &str)> = registry
            .regions()
            .map(|(id, rule)| (id, rule.name.as_str()))
            .collect();
        assert_eq!(listed, vec![("a", "A2"), ("b", "B")]);
    }

    #[test]
    fn test_lookup_of_unknown_id_returns_none() {
        let mut builder = RegistryBuilder::new();
        builder.register_sector("s", sector()).unwrap();
        let registry = builder.freeze();
        assert!(registry.sector("s").is_some());
        assert!(registry.sector("missing").is_none());
        assert!(registry.region("s").is_none());
    }
}
