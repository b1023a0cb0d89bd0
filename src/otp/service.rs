//! The main service type for the email login flow.

use super::issuer::OtpIssuer;
use super::service_builder::OtpAuthBuilder;
use super::store::{NewUser, UserRecord, UserStore, normalize_email};
use super::verifier::OtpVerifier;
use crate::{AuthError, Profile};
use std::sync::Arc;
use std::time::Duration;

/// Email login service with pluggable storage and delivery backends.
///
/// `OtpAuth` ties the three operations of the flow together:
/// [`register`](Self::register) creates an account,
/// [`request_otp`](Self::request_otp) issues and delivers a code, and
/// [`verify_otp`](Self::verify_otp) trades a valid code for the
/// account's profile. Instances are built through
/// [`OtpAuth::builder`] and are cheap to share behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use otp_auth::{NewUser, OtpAuth};
/// # use async_trait::async_trait;
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # struct NullNotifier;
/// # #[async_trait]
/// # impl otp_auth::Notifier for NullNotifier {
/// #     async fn send(
/// #         &self,
/// #         _email: &str,
/// #         _code: &str,
/// #         _valid_for: Duration,
/// #     ) -> Result<(), otp_auth::AuthError> {
/// #         Ok(())
/// #     }
/// # }
/// # async fn example() -> Result<(), otp_auth::AuthError> {
/// let auth = OtpAuth::builder()
///     .with_notifier(Arc::new(NullNotifier))
///     .build_and_init()
///     .await?;
///
/// auth.register(NewUser {
///     name: "Ann".to_string(),
///     email: "ann@example.com".to_string(),
///     password: "hunter2".to_string(),
///     wallet_address: None,
/// })
/// .await?;
///
/// // Issues a 6-digit code and hands it to the notifier.
/// auth.request_otp("ann@example.com").await?;
/// # Ok(())
/// # }
/// ```
pub struct OtpAuth {
    issuer: OtpIssuer,
    verifier: OtpVerifier,
    users: Arc<dyn UserStore>,
}

impl OtpAuth {
    /// Returns a builder for configuring a new service instance.
    pub fn builder() -> OtpAuthBuilder {
        OtpAuthBuilder::new()
    }

    pub(crate) fn new(issuer: OtpIssuer, verifier: OtpVerifier, users: Arc<dyn UserStore>) -> Self {
        Self {
            issuer,
            verifier,
            users,
        }
    }

    /// Registers a new account.
    ///
    /// The email is normalized (trimmed, lowercased) before it is
    /// stored, so `Ann@Example.COM` and `ann@example.com` are the same
    /// account. Fails with [`AuthError::Conflict`] when the address is
    /// already taken.
    pub async fn register(&self, user: NewUser) -> Result<UserRecord, AuthError> {
        let user = NewUser {
            email: normalize_email(&user.email),
            ..user
        };
        let record = self.users.create(user).await?;
        tracing::debug!("Registered account {} ({})", record.id, record.email);
        Ok(record)
    }

    /// Issues a login code for `email` and delivers it through the
    /// configured notifier. See [`AuthError::NotFound`] and
    /// [`AuthError::DeliveryFailed`] for the failure modes.
    pub async fn request_otp(&self, email: &str) -> Result<(), AuthError> {
        self.issuer.request_otp(email).await
    }

    /// Verifies a submitted code and returns the account's [`Profile`]
    /// on success. All rejection reasons collapse into
    /// [`AuthError::Unauthorized`].
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<Profile, AuthError> {
        self.verifier.verify_otp(email, code).await
    }

    /// Returns how long issued codes stay valid.
    pub fn ttl(&self) -> Duration {
        self.issuer.ttl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::notifier::Notifier;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CapturingNotifier {
        last_code: Mutex<Option<String>>,
    }

    impl CapturingNotifier {
        fn new() -> Self {
            Self {
                last_code: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Notifier for CapturingNotifier {
        async fn send(
            &self,
            _email: &str,
            code: &str,
            _valid_for: Duration,
        ) -> Result<(), AuthError> {
            *self.last_code.lock().unwrap() = Some(code.to_string());
            Ok(())
        }
    }

    fn ann() -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password: "hunter2".to_string(),
            wallet_address: Some("0xabc123".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let auth = OtpAuth::builder()
            .with_notifier(Arc::new(CapturingNotifier::new()))
            .build_and_init()
            .await
            .unwrap();

        let record = auth
            .register(NewUser {
                email: "  Ann@Example.COM ".to_string(),
                ..ann()
            })
            .await
            .unwrap();
        assert_eq!(record.email, "ann@example.com");
    }

    #[tokio::test]
    async fn test_register_case_variant_conflicts() {
        let auth = OtpAuth::builder()
            .with_notifier(Arc::new(CapturingNotifier::new()))
            .build_and_init()
            .await
            .unwrap();

        auth.register(ann()).await.unwrap();

        let result = auth
            .register(NewUser {
                email: "ANN@EXAMPLE.COM".to_string(),
                ..ann()
            })
            .await;
        assert!(matches!(result, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn test_full_flow_through_service() {
        let notifier = Arc::new(CapturingNotifier::new());
        let auth = OtpAuth::builder()
            .with_notifier(notifier.clone())
            .build_and_init()
            .await
            .unwrap();

        auth.register(ann()).await.unwrap();
        auth.request_otp("ann@example.com").await.unwrap();

        let code = notifier.last_code.lock().unwrap().clone().unwrap();
        let profile = auth.verify_otp("ann@example.com", &code).await.unwrap();
        assert_eq!(profile.name, "Ann");
        assert_eq!(profile.wallet_address.as_deref(), Some("0xabc123"));

        // Codes are single-use.
        let replay = auth.verify_otp("ann@example.com", &code).await;
        assert!(matches!(replay, Err(AuthError::Unauthorized)));
    }
}
