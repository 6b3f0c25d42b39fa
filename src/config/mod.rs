//! Jurisdiction rule sets: types, loading, registration and policy.
//!
//! Rule data is read from YAML, normalized once by the [`RuleLoader`], and
//! registered on a [`RegistryBuilder`] that is frozen into an immutable
//! [`RuleRegistry`] before any computation runs.
//!
//! # Example
//!
//! ```
//! use payroll_engine::config::builtin_registry;
//!
//! let registry = builtin_registry().unwrap();
//! let region = registry.region("madrid").unwrap();
//! println!("Loaded region: {}", region.name);
//! ```

mod loader;
mod policy;
mod reference;
mod registry;
mod types;

pub use loader::{RuleLoader, builtin_registry};
pub use policy::{DEFAULT_REGION, DEFAULT_SECTOR, EnginePolicy, FailureMode};
pub use reference::ReferenceSchedule;
pub use registry::{Registration, RegistryBuilder, RuleRegistry};
pub use types::{
    CalculatorKind, Complements, EmployeeRates, EmployerRates, EstablishmentAmounts,
    ExpectedRange, FamilyMinimums, MealAllowance, RegionRule, SectorCheck, SectorRule,
    ShiftAmounts, SocialInsurance, TaxBracket, TaxMinimums, TransportAllowance, UniformAllowance,
    UniformKit, WageEntry, WageTables, ZoneAmounts,
};
