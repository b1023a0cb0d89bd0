//! Delivery seam for issued login codes.
//!
//! The issuing pipeline hands every fresh code to a [`Notifier`]; how
//! it reaches the user is the implementation's business. The crate
//! ships an SMTP implementation behind the `smtp-notifier` feature,
//! and tests inject recording doubles through the same trait.

use crate::AuthError;
use async_trait::async_trait;
use std::time::Duration;

/// Abstract delivery channel for login codes.
///
/// # Contract
///
/// - Report transport failure as [`AuthError::DeliveryFailed`] so
///   callers can tell "could not send" apart from "could not issue".
/// - Delivery never touches stored state. A failed send leaves the
///   already persisted code valid, and the user can retry or request a
///   new one.
///
/// # Thread Safety
///
/// Implementations are shared across tasks behind an `Arc`, so they
/// must be `Send + Sync`.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `code` to `email`, mentioning how long it stays valid.
    async fn send(&self, email: &str, code: &str, valid_for: Duration) -> Result<(), AuthError>;
}
