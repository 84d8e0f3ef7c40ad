//! Integration tests for the mixplan modeling pipeline
//!
//! Tests are organized by topic:
//! - `features` - Date alignment and lag layout of the design matrix
//! - `attribution` - Coefficient recovery, metrics and bootstrap intervals
//! - `optimizer` - Budget conservation, bounds and monotonicity
//! - `scenarios` - What-if scoring against the requested budget
//! - `forecast` - Forward revenue projection from planned spend
//!
//! `fixtures` holds the synthetic data generators shared by all of them.

mod attribution;
mod fixtures;
mod forecast;
