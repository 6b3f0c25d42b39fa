//! HTTP API for the payroll engine.
//!
//! A single endpoint, `POST /payroll`, runs the engine's full computation and
//! returns the rounded report together with every non-fatal finding.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::PayrollRequest;
pub use response::{ApiError, ApiErrorResponse, PayrollResponse};
pub use state::AppState;
