//! # OTP Auth
//!
//! A Rust library for passwordless email login using one-time passwords.
//!
//! This library provides the complete server-side flow for OTP login:
//! account registration, code issuing with email delivery, and code
//! verification. Codes are 6-digit, single-use, and expire after a
//! configurable validity window.
//!
//! ## Features
//!
//! - **Single-Use Codes**: Each code is atomically consumed on first successful verification
//! - **Expiry Enforcement**: Codes die at their expiry instant, strictly
//! - **Cryptographic Randomness**: Codes are drawn uniformly from the OS random source
//! - **Pluggable Storage**: In-memory by default, SQLite behind a feature flag, or bring your own
//! - **Pluggable Delivery**: SMTP behind a feature flag, or any custom [`Notifier`]
//! - **Injectable Clock and Generator**: Deterministic expiry and codes under test
//! - **Async Support**: Fully asynchronous API design
//!
//! ## Quick Start
//!
//! ```rust
//! use otp_auth::{NewUser, Notifier, OtpAuth};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! // Any delivery channel works; this one just logs the code.
//! struct LogNotifier;
//!
//! #[async_trait]
//! impl Notifier for LogNotifier {
//!     async fn send(
//!         &self,
//!         email: &str,
//!         code: &str,
//!         _valid_for: Duration,
//!     ) -> Result<(), otp_auth::AuthError> {
//!         println!("to {email}: your code is {code}");
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<(), otp_auth::AuthError> {
//! let auth = OtpAuth::builder()
//!     .with_notifier(Arc::new(LogNotifier))
//!     .build_and_init()
//!     .await?;
//!
//! auth.register(NewUser {
//!     name: "Ann".to_string(),
//!     email: "ann@example.com".to_string(),
//!     password: "hunter2".to_string(),
//!     wallet_address: None,
//! })
//! .await?;
//!
//! // Issues a code and hands it to the notifier.
//! auth.request_otp("ann@example.com").await?;
//!
//! // The user reads the code from their inbox and submits it back.
//! match auth.verify_otp("ann@example.com", "123456").await {
//!     Ok(profile) => println!("logged in as {}", profile.name),
//!     Err(e) => println!("verification failed: {e}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! The code validity window can be configured using the `OTP_AUTH_TTL`
//! environment variable:
//!
//! ```bash
//! # Codes stay valid for 10 minutes
//! export OTP_AUTH_TTL=600
//! ```
//!
//! If not set, it defaults to 300 seconds (5 minutes). The SMTP backend
//! reads its own `OTP_AUTH_SMTP_*` variables; see the `smtp` module
//! behind the `smtp-notifier` feature.
//!
//! ## Architecture
//!
//! The library keeps the flow's collaborators behind small traits:
//!
//! - **[`OtpAuth`]**: The service tying registration, issuing, and verification together
//! - **[`store::UserStore`] / [`store::OtpStore`]**: Persistence seams for accounts and codes
//! - **[`Notifier`]**: Delivery seam for issued codes
//! - **[`Profile`]**: What a successful verification returns
//! - **[`AuthError`]**: Comprehensive error handling for all failure modes

use serde::{Deserialize, Serialize};

pub mod otp;

// Re-export commonly used types
pub use otp::store;
pub use otp::{AuthError, ConfigPreset, NewUser, Notifier, OtpAuth, OtpAuthBuilder, OtpConfig};

#[cfg(feature = "smtp-notifier")]
pub use otp::smtp;

/// The account view returned by a successful verification.
///
/// This is the only data the flow hands back to a caller after login,
/// and it deliberately carries no credential material: no password, no
/// code, no internal identifiers. It is safe to serialize straight into
/// an API response.
///
/// # Example
///
/// ```rust
/// use otp_auth::Profile;
///
/// let profile = Profile {
///     name: "Ann".to_string(),
///     wallet_address: Some("0xabc123".to_string()),
/// };
///
/// // Embed in a larger response structure
/// #[derive(serde::Serialize)]
/// struct LoginResponse {
///     message: String,
///     profile: Profile,
/// }
///
/// let response = LoginResponse {
///     message: "Login successful".to_string(),
///     profile,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Display name of the account.
    pub name: String,

    /// Optional external account reference, e.g. an on-chain wallet
    /// address. `None` when the account registered without one.
    pub wallet_address: Option<String>,
}
