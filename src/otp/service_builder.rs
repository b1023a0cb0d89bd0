use std::sync::Arc;
use std::time::Duration;

use super::code::{CodeGeneratorFn, default_generator};
use super::config::OtpConfig;
use super::issuer::OtpIssuer;
use super::notifier::Notifier;
use super::service::OtpAuth;
use super::store::{MemoryStore, OtpStore, UserStore};
use super::time_utils::{ClockFn, system_clock};
use super::verifier::OtpVerifier;
use crate::AuthError;

/// A builder for creating an `OtpAuth` instance.
///
/// This builder defaults to a single shared [`MemoryStore`] for both
/// store roles and allows for ergonomic configuration of all service
/// parameters. A notifier has no sensible default and must be set
/// before [`build_and_init`](Self::build_and_init) is called.
#[must_use = "The builder does nothing unless `.build_and_init()` is called."]
pub struct OtpAuthBuilder {
    users: Arc<dyn UserStore>,
    otps: Arc<dyn OtpStore>,
    notifier: Option<Arc<dyn Notifier>>,
    config: OtpConfig,
    clock: Option<ClockFn>,
    generate_code: Option<CodeGeneratorFn>,
}

impl OtpAuthBuilder {
    /// Creates a new builder.
    ///
    /// By default, this builder uses a shared `MemoryStore`. Use
    /// `.with_storage()` to provide a different storage backend.
    pub(crate) fn new() -> Self {
        let shared = Arc::new(MemoryStore::new());
        Self {
            users: shared.clone(),
            otps: shared,
            notifier: None,
            config: OtpConfig::default(),
            clock: None,
            generate_code: None,
        }
    }

    /// Specifies a storage backend serving both store roles.
    ///
    /// Most backends, like [`MemoryStore`] and the feature-gated
    /// `SqliteStore`, implement both [`UserStore`] and [`OtpStore`];
    /// this sets the same instance for accounts and codes. Use
    /// [`with_user_store`](Self::with_user_store) and
    /// [`with_otp_store`](Self::with_otp_store) to split the roles.
    ///
    /// # Example
    ///
    /// ```rust
    /// use otp_auth::OtpAuth;
    /// use otp_auth::store::MemoryStore;
    /// use std::sync::Arc;
    /// # use async_trait::async_trait;
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
    ///
    /// # async fn example() -> Result<(), otp_auth::AuthError> {
    /// let storage = Arc::new(MemoryStore::new());
    /// let auth = OtpAuth::builder()
    ///     .with_storage(storage)
    ///     .with_notifier(Arc::new(NullNotifier))
    ///     .build_and_init()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_storage<T: UserStore + OtpStore + 'static>(mut self, storage: Arc<T>) -> Self {
        self.users = storage.clone();
        self.otps = storage;
        self
    }

    /// Specifies the backend holding registered accounts.
    pub fn with_user_store(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = users;
        self
    }

    /// Specifies the backend holding issued codes.
    pub fn with_otp_store(mut self, otps: Arc<dyn OtpStore>) -> Self {
        self.otps = otps;
        self
    }

    /// Specifies the delivery channel for issued codes. Required.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Applies a full configuration, replacing any earlier `with_ttl`.
    ///
    /// Accepts an [`OtpConfig`] or a [`ConfigPreset`](super::ConfigPreset).
    pub fn with_config(mut self, config: impl Into<OtpConfig>) -> Self {
        self.config = config.into();
        self
    }

    /// Sets a custom time-to-live for issued codes.
    ///
    /// If not set, defaults to 5 minutes (or `OTP_AUTH_TTL` when the
    /// environment provides it).
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = ttl;
        self
    }

    /// Overrides the clock used for expiry decisions.
    ///
    /// The default reads the system time. Injecting a clock makes
    /// expiry behavior deterministic under test.
    ///
    /// # Example
    ///
    /// ```rust
    /// use otp_auth::OtpAuth;
    ///
    /// // Freeze time for deterministic tests
    /// let builder = OtpAuth::builder().with_clock(|| Ok(1_700_000_000));
    /// ```
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> Result<i64, AuthError> + Send + Sync + 'static,
    {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Overrides the login-code generator.
    ///
    /// The default draws a uniform 6-digit code from the OS random
    /// source. Replacing it is mainly useful for pinning codes in
    /// tests.
    ///
    /// # Example
    ///
    /// ```rust
    /// use otp_auth::OtpAuth;
    ///
    /// let builder = OtpAuth::builder().with_code_generator(|| "123456".to_string());
    /// ```
    pub fn with_code_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.generate_code = Some(Box::new(generator));
        self
    }

    /// Builds and initializes the `OtpAuth` service.
    ///
    /// This method consumes the builder and returns a fully configured
    /// service. It calls `init()` on both storage backends (once each,
    /// so a backend serving both roles must initialize idempotently)
    /// and logs a warning for every suspicious configuration value.
    pub async fn build_and_init(self) -> Result<OtpAuth, AuthError> {
        let notifier = self.notifier.ok_or_else(|| {
            AuthError::internal("No notifier configured; set one with `.with_notifier()`")
        })?;

        for warning in self.config.validate() {
            tracing::warn!("Configuration warning: {}", warning);
        }

        self.users.init().await?;
        self.otps.init().await?;

        let clock = self.clock.unwrap_or_else(system_clock);
        let generate_code = self.generate_code.unwrap_or_else(default_generator);

        let issuer = OtpIssuer::new(
            self.users.clone(),
            self.otps.clone(),
            notifier,
            clock.clone(),
            generate_code,
            self.config.ttl,
        );
        let verifier = OtpVerifier::new(self.users.clone(), self.otps, clock);

        Ok(OtpAuth::new(issuer, verifier, self.users))
    }
}
