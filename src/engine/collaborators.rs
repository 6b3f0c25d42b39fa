//! Seams to the code surrounding the engine.
//!
//! Rule-data integrity and request throttling are owned by the embedding
//! application; the engine only calls them at fixed points.

use serde_json::Value;

use crate::error::EngineResult;

/// Verifies that a loaded rule set has not been tampered with.
///
/// Called once per registered rule set by
/// [`PayrollEngine::initialize`](super::PayrollEngine::initialize), on
/// tokio's blocking pool.
pub trait IntegrityChecker: Send + Sync {
    /// Checks one rule set, given as its serialized form.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::IntegrityViolation`](crate::error::EngineError::IntegrityViolation)
    /// when the data does not verify.
    fn verify(&self, name: &str, payload: &Value) -> EngineResult<()>;
}

/// Accepts every rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIntegrityCheck;

impl IntegrityChecker for NoIntegrityCheck {
    fn verify(&self, _name: &str, _payload: &Value) -> EngineResult<()> {
        Ok(())
    }
}

/// Decides whether a computation may run. Called once per computation.
pub trait RateGate: Send + Sync {
    /// # Errors
    ///
    /// Returns [`EngineError::RateLimited`](crate::error::EngineError::RateLimited)
    /// to refuse the call.
    fn check(&self) -> EngineResult<()>;
}

/// Never refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl RateGate for Unlimited {
    fn check(&self) -> EngineResult<()> {
        Ok(())
    }
}
