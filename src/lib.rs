//! Payroll computation and verification engine for Spanish payroll.
//!
//! This crate computes a worker's monthly payroll (gross pay, social-insurance
//! contributions, progressive income-tax withholding, employer cost and state
//! take) under pluggable region and sector rule sets, then re-verifies every
//! figure through coherence checks and an independent audit before releasing
//! it.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
