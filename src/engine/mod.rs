//! The orchestrator and its collaborators.
//!
//! [`PayrollEngine`] is built once, either directly from a frozen registry or
//! through the async [`PayrollEngine::initialize`] startup phase, and then
//! serves any number of [`compute_full_payroll`](PayrollEngine::compute_full_payroll)
//! calls.

mod collaborators;
mod input;
mod orchestrator;

pub use collaborators::{IntegrityChecker, NoIntegrityCheck, RateGate, Unlimited};
pub use input::{check_against_sector, check_shape};
pub use orchestrator::{ENGINE_VERSION, PayrollEngine, Resolved};
