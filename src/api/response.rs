//! Response types for the payroll API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{PayrollOutcome, PayrollReport, ValidationResult};

/// Successful response body for `POST /payroll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollResponse {
    /// Calculation id.
    pub calculation_id: Uuid,
    /// When the calculation ran.
    pub timestamp: DateTime<Utc>,
    /// Engine version.
    pub engine_version: String,
    /// Region used.
    pub region: String,
    /// Sector used.
    pub sector: String,
    /// Rounded report.
    pub report: PayrollReport,
    /// Every non-fatal finding.
    pub validation: ValidationResult,
}

impl From<PayrollOutcome> for PayrollResponse {
    fn from(outcome: PayrollOutcome) -> Self {
        let report = outcome.report();
        Self {
            calculation_id: outcome.calculation_id,
            timestamp: outcome.timestamp,
            engine_version: outcome.engine_version,
            region: outcome.region,
            sector: outcome.sector,
            report,
            validation: outcome.validation,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::InvalidInput { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("INVALID_INPUT", message, field),
            ),
            EngineError::UnknownJurisdiction { kind, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("UNKNOWN_JURISDICTION", message, kind),
            ),
            EngineError::InvalidCategory { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_CATEGORY", message),
            ),
            EngineError::CalculationRejected { code, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details("CALCULATION_REJECTED", message, code),
            ),
            EngineError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                ApiError::new("RATE_LIMITED", message),
            ),
            EngineError::InvalidConfig { .. }
            | EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::IntegrityViolation { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_skips_empty_details() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_input_errors_are_bad_requests() {
        let response: ApiErrorResponse = EngineError::invalid_input("level", "bad").into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.details.as_deref(), Some("level"));

        let response: ApiErrorResponse = EngineError::UnknownJurisdiction {
            kind: "region".to_string(),
            id: "atlantida".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "UNKNOWN_JURISDICTION");
    }

    #[test]
    fn test_rejection_is_unprocessable() {
        let response: ApiErrorResponse = EngineError::CalculationRejected {
            code: "BASE_EXCEEDS_GROSS".to_string(),
            message: "contribution base 1381.20 exceeds gross total 1375.58".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.error.message,
            "contribution base 1381.20 exceeds gross total 1375.58"
        );
        assert_eq!(response.error.details.as_deref(), Some("BASE_EXCEEDS_GROSS"));
    }

    #[test]
    fn test_configuration_errors_are_server_errors() {
        let response: ApiErrorResponse = EngineError::invalid_config("valencia", "empty").into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "CONFIG_ERROR");
    }
}
