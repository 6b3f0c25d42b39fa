//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that can stop a payroll computation or a rule-set
//! registration.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// Component functions never swallow errors; they return this type and the
/// orchestrator decides what terminates a call.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::InvalidCategory {
///     table: "TABLA_I".to_string(),
///     level: "LEVEL_IX".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Wage table/level combination not found: TABLA_I/LEVEL_IX"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A rule set or rule file is malformed.
    #[error("Invalid configuration for '{id}': {message}")]
    InvalidConfig {
        /// The identifier of the rule set (or file) at fault.
        id: String,
        /// A description of what is wrong.
        message: String,
    },

    /// Rule file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Rule file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A region or sector identifier is not registered.
    #[error("Unknown {kind}: {id}")]
    UnknownJurisdiction {
        /// Either "region" or "sector".
        kind: String,
        /// The identifier that was requested.
        id: String,
    },

    /// The wage table has no entry for the table/level pair.
    #[error("Wage table/level combination not found: {table}/{level}")]
    InvalidCategory {
        /// The wage table requested.
        table: String,
        /// The level requested.
        level: String,
    },

    /// Worker or family input breaks the input contract.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// A description of the violation.
        message: String,
    },

    /// A finding was promoted to fatal by the failure policy.
    #[error("Calculation rejected [{code}]: {message}")]
    CalculationRejected {
        /// The finding code that caused the rejection.
        code: String,
        /// The human-readable finding message.
        message: String,
    },

    /// The startup integrity gate reported tampered rule data.
    #[error("Integrity check failed for '{name}': {message}")]
    IntegrityViolation {
        /// The rule set that failed verification.
        name: String,
        /// A description of the failure.
        message: String,
    },

    /// The rate gate refused the request.
    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        /// A description supplied by the rate gate.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidConfig`].
    pub fn invalid_config(id: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
