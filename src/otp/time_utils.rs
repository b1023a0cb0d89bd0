//! Time utilities for safe timestamp handling.
//!
//! This module provides safe alternatives to direct SystemTime operations
//! that could potentially panic, plus the injectable clock type used by
//! the issuance and verification pipelines.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::otp::error::AuthError;

/// A function that provides the current Unix timestamp in seconds.
///
/// The default clock reads the system time; tests inject fixed or
/// steppable clocks through the builder to exercise expiry without
/// sleeping.
pub type ClockFn = Arc<dyn Fn() -> Result<i64, AuthError> + Send + Sync>;

/// Get current timestamp in seconds since Unix epoch.
///
/// This function handles potential system time errors gracefully.
/// In the extremely rare case where system time is before Unix epoch,
/// it returns an error instead of panicking.
pub(crate) fn current_timestamp() -> Result<i64, AuthError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .map_err(|_| AuthError::internal("System time is before Unix epoch"))
}

/// The default clock, backed by the system time.
pub(crate) fn system_clock() -> ClockFn {
    Arc::new(current_timestamp)
}
