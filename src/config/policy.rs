//! Engine failure policy and jurisdiction defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::EngineResult;
use crate::models::{Finding, Severity};

use super::loader::{parse_yaml, read_file};

/// Region used when a caller's region is unknown and fallback is enabled.
pub const DEFAULT_REGION: &str = "valencia";

/// Sector used when a caller names no sector.
pub const DEFAULT_SECTOR: &str = "hosteleria_valencia";

/// Which findings terminate a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Only CRITICAL findings are fatal.
    #[default]
    Default,
    /// CRITICAL and ERROR findings are fatal, as is any finding whose code
    /// is listed in [`EnginePolicy::strict_codes`].
    Strict,
}

/// Orchestrator policy.
///
/// # Example
///
/// ```
/// use payroll_engine::config::{EnginePolicy, FailureMode};
///
/// let policy = EnginePolicy::from_yaml("mode: strict\nfallback_to_default: true\n").unwrap();
/// assert_eq!(policy.mode, FailureMode::Strict);
/// assert!(policy.strict_codes.contains("AUDIT_COST"));
/// assert_eq!(policy.default_region, "valencia");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnginePolicy {
    /// Failure mode.
    pub mode: FailureMode,
    /// Codes that become fatal in strict mode regardless of severity.
    pub strict_codes: BTreeSet<String>,
    /// Region used for fallback.
    pub default_region: String,
    /// Sector used when none is named, and for fallback.
    pub default_sector: String,
    /// Resolve unknown ids to the defaults instead of failing.
    pub fallback_to_default: bool,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        let strict_codes = [
            "AUDIT_COST",
            "AUDIT_STATE_TAKE",
            "AUDIT_PERCENT",
            "AUDIT_TAX_BRACKETS",
            "EMPLOYEE_CONTRIBUTION_SUM",
            "EMPLOYER_CONTRIBUTION_SUM",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            mode: FailureMode::Default,
            strict_codes,
            default_region: DEFAULT_REGION.to_string(),
            default_sector: DEFAULT_SECTOR.to_string(),
            fallback_to_default: false,
        }
    }
}

impl EnginePolicy {
    /// The default policy in strict mode.
    pub fn strict() -> Self {
        Self {
            mode: FailureMode::Strict,
            ..Self::default()
        }
    }

    /// Parses a policy from YAML; omitted fields keep their defaults.
    pub fn from_yaml(yaml: &str) -> EngineResult<Self> {
        parse_yaml(yaml, "policy")
    }

    /// Loads a policy file.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = read_file(path)?;
        parse_yaml(&content, &path.display().to_string())
    }

    /// True if this finding terminates the computation.
    pub fn is_fatal(&self, finding: &Finding) -> bool {
        match self.mode {
            FailureMode::Default => finding.severity == Severity::Critical,
            FailureMode::Strict => {
                finding.severity.invalidates() || self.strict_codes.contains(&finding.code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn test_default_mode_only_critical_is_fatal() {
        let policy = EnginePolicy::default();
        assert!(policy.is_fatal(&Finding::critical("BASE_EXCEEDS_GROSS", "base")));
        assert!(!policy.is_fatal(&Finding::error("NET_NOT_BELOW_GROSS", "net")));
        assert!(!policy.is_fatal(&Finding::warning("AUDIT_COST", "cost")));
    }

    #[test]
    fn test_strict_mode_escalates_listed_codes() {
        let policy = EnginePolicy::strict();
        assert!(policy.is_fatal(&Finding::warning("AUDIT_COST", "cost")));
        assert!(policy.is_fatal(&Finding::error("NET_NOT_BELOW_GROSS", "net")));
        assert!(!policy.is_fatal(&Finding::warning("STATE_TAKE_ATYPICAL", "band")));
        assert!(!policy.is_fatal(&Finding::info("CAP_APPLIED", "cap")));
    }

    #[test]
    fn test_yaml_overrides_strict_codes() {
        let policy = EnginePolicy::from_yaml(
            "mode: strict\nstrict_codes: [STATE_TAKE_ATYPICAL]\ndefault_region: madrid\n",
        )
        .unwrap();
        assert!(policy.is_fatal(&Finding::warning("STATE_TAKE_ATYPICAL", "band")));
        assert!(!policy.is_fatal(&Finding::warning("AUDIT_COST", "cost")));
        assert_eq!(policy.default_region, "madrid");
        assert_eq!(policy.default_sector, DEFAULT_SECTOR);
    }

    #[test]
    fn test_unknown_policy_field_is_rejected() {
        let result = EnginePolicy::from_yaml("mode: strict\nstrictness: 3\n");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }
}
