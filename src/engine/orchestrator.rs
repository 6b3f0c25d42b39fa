//! The payroll orchestrator.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{audit_breakdown, audit_region, compute_breakdown, validate_coherence};
use crate::config::{EnginePolicy, RegionRule, RuleRegistry, SectorRule};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    FamilyInput, Finding, Jurisdiction, PayrollOutcome, SectorOptions, Severity, ValidationResult,
    WorkerInput,
};

use super::collaborators::{IntegrityChecker, RateGate, Unlimited};
use super::input::{check_against_sector, check_shape};

/// Version stamped on every outcome.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A region and sector resolved from the registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// Region id actually used.
    pub region_id: &'a str,
    /// Region rules.
    pub region: &'a RegionRule,
    /// Sector id actually used.
    pub sector_id: &'a str,
    /// Sector rules.
    pub sector: &'a SectorRule,
}

/// Composes the calculation steps into one pipeline and applies the failure
/// policy.
///
/// The engine holds a frozen [`RuleRegistry`] and never mutates it, so one
/// engine can be shared across threads behind an `Arc`.
///
/// # Example
///
/// ```
/// use payroll_engine::config::builtin_registry;
/// use payroll_engine::engine::PayrollEngine;
/// use payroll_engine::models::{FamilyInput, Jurisdiction, SectorOptions, WorkerInput};
/// use rust_decimal::Decimal;
///
/// let engine = PayrollEngine::new(builtin_registry().unwrap().into());
/// let outcome = engine
///     .compute_full_payroll(
///         &WorkerInput::new("cocinero", "TABLA_I", "LEVEL_III"),
///         &FamilyInput::default(),
///         &SectorOptions::default(),
///         &Jurisdiction::region("valencia"),
///     )
///     .unwrap();
///
/// assert_eq!(outcome.report().income.gross_total, Decimal::new(151855, 2));
/// assert!(outcome.validation.is_valid());
/// ```
pub struct PayrollEngine {
    registry: Arc<RuleRegistry>,
    policy: EnginePolicy,
    rate_gate: Arc<dyn RateGate>,
    region_findings: Vec<(String, Vec<Finding>)>,
}

impl std::fmt::Debug for PayrollEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayrollEngine")
            .field("policy", &self.policy)
            .field("regions", &self.registry.regions().count())
            .field("sectors", &self.registry.sectors().count())
            .finish_non_exhaustive()
    }
}

fn payload<T: Serialize>(name: &str, rule: &T) -> EngineResult<serde_json::Value> {
    serde_json::to_value(rule).map_err(|e| EngineError::invalid_config(name, e.to_string()))
}

impl PayrollEngine {
    /// Creates an engine with the default policy, no rate limit and no
    /// startup phase.
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        let region_findings = registry
            .regions()
            .map(|(id, region)| (id.to_string(), audit_region(id, region)))
            .collect();
        Self {
            registry,
            policy: EnginePolicy::default(),
            rate_gate: Arc::new(Unlimited),
            region_findings,
        }
    }

    /// The explicit startup phase.
    ///
    /// Verifies every registered rule set with `checker`, concurrently on
    /// the blocking pool, and audits every region's schedules. The engine only
    /// exists once all checks have passed, so there is nothing to re-check
    /// per computation.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the checker, or
    /// [`EngineError::IntegrityViolation`] if a check task panicked.
    pub async fn initialize(
        registry: Arc<RuleRegistry>,
        policy: EnginePolicy,
        checker: Arc<dyn IntegrityChecker>,
    ) -> EngineResult<Self> {
        let mut tasks = JoinSet::new();
        for (id, region) in registry.regions() {
            let name = format!("region:{id}");
            let data = payload(&name, region)?;
            let checker = Arc::clone(&checker);
            tasks.spawn_blocking(move || checker.verify(&name, &data).map(|()| name));
        }
        for (id, sector) in registry.sectors() {
            let name = format!("sector:{id}");
            let data = payload(&name, sector)?;
            let checker = Arc::clone(&checker);
            tasks.spawn_blocking(move || checker.verify(&name, &data).map(|()| name));
        }

        let mut verified = 0usize;
        while let Some(joined) = tasks.join_next().await {
            let name = joined.map_err(|e| EngineError::IntegrityViolation {
                name: "integrity task".to_string(),
                message: e.to_string(),
            })??;
            debug!(rule_set = %name, "rule set verified");
            verified += 1;
        }
        info!(rule_sets = verified, "rule data integrity verified");

        Ok(Self::new(registry).with_policy(policy))
    }

    /// Replaces the failure policy.
    pub fn with_policy(mut self, policy: EnginePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the rate gate.
    pub fn with_rate_gate(mut self, rate_gate: Arc<dyn RateGate>) -> Self {
        self.rate_gate = rate_gate;
        self
    }

    /// The rule registry.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// The failure policy.
    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    /// Schedule-sanity findings per region, computed once when the engine was built.
    pub fn region_findings(&self) -> &[(String, Vec<Finding>)] {
        &self.region_findings
    }

    /// Resolves a jurisdiction to registered rule sets.
    ///
    /// A missing sector id selects the policy's default sector. Unknown ids
    /// fall back to the policy defaults only when the policy allows it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownJurisdiction`] when an id is unknown and
    /// fallback is disabled, or when the default itself is not registered.
    pub fn resolve<'a>(&'a self, jurisdiction: &'a Jurisdiction) -> EngineResult<Resolved<'a>> {
        let (region_id, region) = self.lookup(
            "region",
            &jurisdiction.region,
            |id| self.registry.region(id),
            &self.policy.default_region,
        )?;

        let requested = jurisdiction
            .sector
            .as_deref()
            .unwrap_or(&self.policy.default_sector);
        let (sector_id, sector) = self.lookup(
            "sector",
            requested,
            |id| self.registry.sector(id),
            &self.policy.default_sector,
        )?;

        Ok(Resolved {
            region_id,
            region,
            sector_id,
            sector,
        })
    }

    fn lookup<'a, T>(
        &'a self,
        kind: &str,
        id: &'a str,
        get: impl Fn(&str) -> Option<&'a T>,
        default: &'a str,
    ) -> EngineResult<(&'a str, &'a T)> {
        if let Some(rule) = get(id) {
            return Ok((id, rule));
        }
        let unknown = || EngineError::UnknownJurisdiction {
            kind: kind.to_string(),
            id: id.to_string(),
        };
        if !self.policy.fallback_to_default {
            return Err(unknown());
        }
        let rule = get(default).ok_or_else(unknown)?;
        warn!(kind, requested = id, fallback = default, "unknown jurisdiction, using default");
        Ok((default, rule))
    }

    /// Computes and verifies a worker's monthly payroll.
    ///
    /// Runs the rate gate, the input contract, jurisdiction resolution, the
    /// calculation, the coherence and sector checks and the audit, then
    /// applies the failure policy. Every finding that did not stop the call is
    /// returned on the outcome.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RateLimited`] when the rate gate refuses.
    /// - [`EngineError::InvalidInput`] when the input contract is broken.
    /// - [`EngineError::UnknownJurisdiction`] when the region or sector is not registered.
    /// - [`EngineError::InvalidCategory`] when the wage table has no such level.
    /// - [`EngineError::CalculationRejected`] when the policy makes a finding fatal.
    pub fn compute_full_payroll(
        &self,
        worker: &WorkerInput,
        family: &FamilyInput,
        options: &SectorOptions,
        jurisdiction: &Jurisdiction,
    ) -> EngineResult<PayrollOutcome> {
        self.rate_gate.check()?;
        check_shape(worker, family)?;
        let resolved = self.resolve(jurisdiction)?;
        check_against_sector(worker, resolved.sector)?;

        let breakdown = compute_breakdown(worker, family, resolved.sector, resolved.region)?;

        let mut validation = ValidationResult::new();
        validation.extend(validate_coherence(&breakdown, worker, resolved.sector));
        validation.extend(
            resolved
                .sector
                .check
                .run(&breakdown, worker, options, resolved.sector),
        );
        validation.extend(audit_breakdown(&breakdown, family, resolved.region));

        let fatal = validation
            .first(Severity::Critical)
            .or_else(|| {
                validation
                    .findings()
                    .iter()
                    .find(|finding| self.policy.is_fatal(finding))
            });
        if let Some(finding) = fatal {
            warn!(
                region = resolved.region_id,
                sector = resolved.sector_id,
                code = %finding.code,
                findings = validation.len(),
                "calculation rejected"
            );
            return Err(EngineError::CalculationRejected {
                code: finding.code.clone(),
                message: finding.message.clone(),
            });
        }

        let outcome = PayrollOutcome {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            region: resolved.region_id.to_string(),
            sector: resolved.sector_id.to_string(),
            breakdown,
            validation,
        };
        info!(
            calculation_id = %outcome.calculation_id,
            region = %outcome.region,
            sector = %outcome.sector,
            gross = %outcome.breakdown.gross_total,
            net = %outcome.breakdown.net_pay,
            findings = outcome.validation.len(),
            "payroll computed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FailureMode, RuleLoader, builtin_registry};
    use crate::engine::NoIntegrityCheck;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn engine() -> PayrollEngine {
        PayrollEngine::new(Arc::new(builtin_registry().unwrap()))
    }

    fn cook() -> WorkerInput {
        WorkerInput::new("cocinero", "TABLA_I", "LEVEL_III")
    }

    fn compute(engine: &PayrollEngine, worker: &WorkerInput, jurisdiction: &Jurisdiction) -> EngineResult<PayrollOutcome> {
        engine.compute_full_payroll(
            worker,
            &FamilyInput::default(),
            &SectorOptions::default(),
            jurisdiction,
        )
    }

    struct Refuse;

    impl RateGate for Refuse {
        fn check(&self) -> EngineResult<()> {
            Err(EngineError::RateLimited {
                message: "too many requests".to_string(),
            })
        }
    }

    struct RejectSector(&'static str);

    impl IntegrityChecker for RejectSector {
        fn verify(&self, name: &str, payload: &serde_json::Value) -> EngineResult<()> {
            assert!(payload.get("name").is_some());
            if name == self.0 {
                return Err(EngineError::IntegrityViolation {
                    name: name.to_string(),
                    message: "checksum mismatch".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_outcome_carries_identity_and_findings() {
        let outcome = compute(&engine(), &cook(), &Jurisdiction::region("valencia")).unwrap();
        assert_eq!(outcome.region, "valencia");
        assert_eq!(outcome.sector, "hosteleria_valencia");
        assert_eq!(outcome.engine_version, ENGINE_VERSION);
        assert_eq!(outcome.breakdown.net_pay, dec("1265.9066078"));
        assert!(outcome.validation.is_empty());
    }

    #[test]
    fn test_unknown_region_without_fallback() {
        let result = compute(&engine(), &cook(), &Jurisdiction::region("atlantida"));
        match result {
            Err(EngineError::UnknownJurisdiction { kind, id }) => {
                assert_eq!(kind, "region");
                assert_eq!(id, "atlantida");
            }
            other => panic!("expected UnknownJurisdiction, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_ids_fall_back_when_allowed() {
        let policy = EnginePolicy {
            fallback_to_default: true,
            ..EnginePolicy::default()
        };
        let engine = engine().with_policy(policy);
        let outcome = compute(
            &engine,
            &cook(),
            &Jurisdiction::new("atlantida", "mineria"),
        )
        .unwrap();
        assert_eq!(outcome.region, "valencia");
        assert_eq!(outcome.sector, "hosteleria_valencia");
    }

    #[test]
    fn test_critical_finding_rejects_in_default_mode() {
        let worker = WorkerInput::new("cocinero", "TABLA_I", "LEVEL_V");
        let result = compute(&engine(), &worker, &Jurisdiction::region("valencia"));
        match result {
            Err(EngineError::CalculationRejected { code, .. }) => {
                assert_eq!(code, "BASE_EXCEEDS_GROSS")
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_warnings_do_not_reject_in_default_mode() {
        let options = SectorOptions {
            overtime_hours: 100,
            ..SectorOptions::default()
        };
        let outcome = engine()
            .compute_full_payroll(
                &cook(),
                &FamilyInput::default(),
                &options,
                &Jurisdiction::region("valencia"),
            )
            .unwrap();
        assert!(outcome.validation.has_code("OVERTIME_HIGH"));
        assert!(outcome.validation.is_valid());
    }

    #[test]
    fn test_strict_mode_escalates_listed_warning() {
        let mut policy = EnginePolicy::strict();
        policy.strict_codes.insert("OVERTIME_HIGH".to_string());
        assert_eq!(policy.mode, FailureMode::Strict);
        let engine = engine().with_policy(policy);
        let options = SectorOptions {
            overtime_hours: 100,
            ..SectorOptions::default()
        };
        let result = engine.compute_full_payroll(
            &cook(),
            &FamilyInput::default(),
            &options,
            &Jurisdiction::region("valencia"),
        );
        assert!(matches!(
            result,
            Err(EngineError::CalculationRejected { ref code, .. }) if code == "OVERTIME_HIGH"
        ));
    }

    #[test]
    fn test_rate_gate_runs_first() {
        let engine = engine().with_rate_gate(Arc::new(Refuse));
        let result = compute(&engine, &cook(), &Jurisdiction::region("atlantida"));
        assert!(matches!(result, Err(EngineError::RateLimited { .. })));
    }

    #[test]
    fn test_region_findings_are_computed_once() {
        let engine = engine();
        let findings = engine.region_findings();
        assert_eq!(findings.len(), 5);
        assert!(findings.iter().all(|(_, f)| f.iter().all(|f| f.severity == Severity::Info)));
    }

    #[tokio::test]
    async fn test_initialize_verifies_every_rule_set() {
        let registry = Arc::new(builtin_registry().unwrap());
        let engine = PayrollEngine::initialize(
            Arc::clone(&registry),
            EnginePolicy::default(),
            Arc::new(NoIntegrityCheck),
        )
        .await
        .unwrap();
        assert!(compute(&engine, &cook(), &Jurisdiction::region("madrid")).is_ok());

        let result = PayrollEngine::initialize(
            registry,
            EnginePolicy::default(),
            Arc::new(RejectSector("sector:limpieza_nacional")),
        )
        .await;
        match result {
            Err(EngineError::IntegrityViolation { name, .. }) => {
                assert_eq!(name, "sector:limpieza_nacional")
            }
            other => panic!("expected IntegrityViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_accident_rate_is_rejected() {
        let loader = RuleLoader::embedded().unwrap();
        let mut region = loader
            .parse_region(
                "broken",
                "name: Broken\nregional_brackets:\n  - rate: 1\n",
                "broken.yaml",
            )
            .unwrap();
        region.social_insurance.employer.occupational_accident = Decimal::ZERO;

        let mut builder = RuleLoader::embedded_registry().unwrap();
        builder.register_region("broken", region).unwrap();
        let engine = PayrollEngine::new(Arc::new(builder.freeze()));

        let result = compute(&engine, &cook(), &Jurisdiction::region("broken"));
        match result {
            Err(EngineError::CalculationRejected { code, message }) => {
                assert_eq!(code, "ACCIDENT_RATE_ZERO");
                assert!(message.contains("RD 2064/1995"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
