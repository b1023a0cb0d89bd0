use thiserror::Error;

/// Error types that can occur during OTP login operations.
///
/// This enum represents all possible errors that can occur when using
/// the library. Each variant corresponds to a specific failure mode in
/// the registration, issuance, or verification flow.
///
/// # Error Categories
///
/// - **Domain Errors**: `NotFound`, `Conflict`, `Unauthorized`, `DeliveryFailed`
/// - **System Errors**: `Database`, `Internal`
///
/// # Example
///
/// ```rust
/// use otp_auth::{AuthError, OtpAuth};
/// # use async_trait::async_trait;
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # struct NullNotifier;
/// # #[async_trait]
/// # impl otp_auth::Notifier for NullNotifier {
/// #     async fn send(&self, _email: &str, _code: &str, _valid_for: Duration) -> Result<(), AuthError> {
/// #         Ok(())
/// #     }
/// # }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let auth = OtpAuth::builder()
///     .with_notifier(Arc::new(NullNotifier))
///     .build_and_init()
///     .await?;
///
/// // Handle different error types
/// match auth.verify_otp("ann@example.com", "123456").await {
///     Ok(profile) => println!("Welcome back, {}", profile.name),
///     Err(AuthError::Unauthorized) => println!("Invalid or expired code"),
///     Err(AuthError::NotFound) => println!("No such account"),
///     Err(e) => println!("Other error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum AuthError {
    /// No account exists for the given email address.
    ///
    /// Issuing a login code requires a registered account, so requesting
    /// one for an unknown email fails up front, before anything is
    /// stored or sent.
    ///
    /// # When This Occurs
    ///
    /// - A code is requested for an email that was never registered
    /// - The account disappeared between code issuance and verification
    ///
    /// # Resolution
    ///
    /// Register the account first, then request a code.
    #[error("User not found")]
    NotFound,

    /// The email address is already taken by another account.
    ///
    /// Email addresses are unique across accounts. The duplicate check
    /// and the insert are atomic in every storage backend, so two
    /// concurrent registrations for the same address cannot both
    /// succeed.
    ///
    /// # Resolution
    ///
    /// Log in to the existing account instead of registering again.
    #[error("User already exists")]
    Conflict,

    /// The submitted login code was rejected.
    ///
    /// This variant deliberately does not distinguish between its
    /// causes. A caller probing the endpoint learns nothing about
    /// whether a code was ever issued for the address.
    ///
    /// # When This Occurs
    ///
    /// - No code was ever issued for the email
    /// - The newest code has expired
    /// - The submitted string differs from the stored code
    /// - The code was already consumed, by this caller or a concurrent one
    ///
    /// # Resolution
    ///
    /// Request a fresh code and submit it within its validity window.
    #[error("Invalid or expired OTP")]
    Unauthorized,

    /// The login code could not be delivered.
    ///
    /// The code was generated and persisted before delivery was
    /// attempted, and the stored record is kept on failure. The payload
    /// carries the transport's error message.
    ///
    /// # When This Occurs
    ///
    /// - The mail relay is unreachable or rejects the connection
    /// - The relay credentials are wrong
    /// - The recipient address cannot be parsed into a mailbox
    ///
    /// # Resolution
    ///
    /// Check relay connectivity and credentials, then request again.
    #[error("Failed to send OTP email: {0}")]
    DeliveryFailed(String),

    /// A storage backend operation failed.
    ///
    /// This error occurs when there's a problem with the underlying
    /// database, such as connection issues, disk space problems, or
    /// corruption.
    ///
    /// # Resolution
    ///
    /// - Check database file permissions and disk space
    /// - Verify database file integrity
    /// - Ensure proper database initialization
    #[error("Database error: {0}")]
    Database(String),

    /// An internal invariant or system facility failed.
    ///
    /// Covers failures outside the domain taxonomy: a misconfigured
    /// service (for example, building without a notifier), a system
    /// clock before the Unix epoch, or an invalid sender address.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Creates a [`AuthError::Database`] from a backend error message.
    ///
    /// Storage backends use this to map driver-specific errors that have
    /// no domain meaning.
    pub fn from_database_message(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Creates an [`AuthError::Internal`] from a message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
