//! Login-code issuing pipeline.

use super::code::CodeGeneratorFn;
use super::notifier::Notifier;
use super::store::{OtpStore, UserStore, normalize_email};
use super::time_utils::ClockFn;
use crate::AuthError;
use std::sync::Arc;
use std::time::Duration;

/// Issues login codes for registered accounts.
///
/// One request runs the full pipeline: account lookup, code draw,
/// persistence, delivery. The persisted record is the source of truth;
/// delivery is best-effort on top of it.
pub struct OtpIssuer {
    users: Arc<dyn UserStore>,
    otps: Arc<dyn OtpStore>,
    notifier: Arc<dyn Notifier>,
    clock: ClockFn,
    generate_code: CodeGeneratorFn,
    ttl: Duration,
}

impl OtpIssuer {
    pub(crate) fn new(
        users: Arc<dyn UserStore>,
        otps: Arc<dyn OtpStore>,
        notifier: Arc<dyn Notifier>,
        clock: ClockFn,
        generate_code: CodeGeneratorFn,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            otps,
            notifier,
            clock,
            generate_code,
            ttl,
        }
    }

    /// Issues a fresh login code for `email` and hands it to the
    /// notifier.
    ///
    /// Fails with [`AuthError::NotFound`] when no account is registered
    /// under the address, and with [`AuthError::DeliveryFailed`] when
    /// the code was stored but could not be sent. In the latter case
    /// the record remains valid until it expires, so a later
    /// verification with the undelivered code still succeeds.
    pub async fn request_otp(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);

        if self.users.find_by_email(&email).await?.is_none() {
            return Err(AuthError::NotFound);
        }

        let code = (self.generate_code)();
        let now = (self.clock)()?;
        let expires_at = now + self.ttl.as_secs() as i64;

        let record = self.otps.insert(&email, &code, expires_at).await?;
        tracing::debug!("Issued login code (id {}) for {}", record.id, email);

        // Deliberately not rolled back on failure: the stored code is
        // already valid, delivery just didn't reach the user this time.
        if let Err(e) = self.notifier.send(&email, &code, self.ttl).await {
            tracing::warn!("Login code delivery to {} failed: {}", email, e);
            return Err(e);
        }

        Ok(())
    }

    /// Returns how long issued codes stay valid.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::code::default_generator;
    use crate::otp::store::{MemoryStore, NewUser};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingNotifier {
        deliveries: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                deliveries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(
            &self,
            email: &str,
            code: &str,
            _valid_for: Duration,
        ) -> Result<(), AuthError> {
            self.deliveries
                .lock()
                .unwrap()
                .push((email.to_string(), code.to_string()));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(
            &self,
            _email: &str,
            _code: &str,
            _valid_for: Duration,
        ) -> Result<(), AuthError> {
            Err(AuthError::DeliveryFailed("mailbox unavailable".to_string()))
        }
    }

    fn fixed_clock(at: i64) -> ClockFn {
        Arc::new(move || Ok(at))
    }

    fn issuer_with(
        store: Arc<MemoryStore>,
        notifier: Arc<dyn Notifier>,
        clock: ClockFn,
    ) -> OtpIssuer {
        OtpIssuer::new(
            store.clone(),
            store,
            notifier,
            clock,
            default_generator(),
            Duration::from_secs(300),
        )
    }

    fn ann() -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password: "hunter2".to_string(),
            wallet_address: None,
        }
    }

    #[tokio::test]
    async fn test_request_otp_unknown_email() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let issuer = issuer_with(store.clone(), notifier.clone(), fixed_clock(1_000_000));

        let result = issuer.request_otp("ghost@example.com").await;
        assert!(matches!(result, Err(AuthError::NotFound)));

        // Nothing was stored and nothing went out.
        assert_eq!(store.otp_count().await, 0);
        assert!(notifier.deliveries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_otp_happy_path() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let issuer = issuer_with(store.clone(), notifier.clone(), fixed_clock(1_000_000));

        store.create(ann()).await.unwrap();
        issuer.request_otp("ann@example.com").await.unwrap();

        let record = store
            .find_active("ann@example.com", 1_000_000)
            .await
            .unwrap()
            .expect("code should be stored and active");
        assert_eq!(record.expires_at, 1_000_300);
        assert_eq!(record.code.len(), 6);
        let value: u32 = record.code.parse().unwrap();
        assert!((100_000..=999_999).contains(&value));

        // The notifier saw the same code that was persisted.
        let deliveries = notifier.deliveries.lock().unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "ann@example.com");
        assert_eq!(deliveries[0].1, record.code);
    }

    #[tokio::test]
    async fn test_request_otp_normalizes_email() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let issuer = issuer_with(store.clone(), notifier.clone(), fixed_clock(1_000_000));

        store.create(ann()).await.unwrap();
        issuer.request_otp("  Ann@Example.COM ").await.unwrap();

        assert!(
            store
                .find_active("ann@example.com", 1_000_000)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_code() {
        let store = Arc::new(MemoryStore::new());
        let issuer =
            issuer_with(store.clone(), Arc::new(FailingNotifier), fixed_clock(1_000_000));

        store.create(ann()).await.unwrap();

        let result = issuer.request_otp("ann@example.com").await;
        assert!(matches!(result, Err(AuthError::DeliveryFailed(_))));

        // The undelivered code is still stored and active.
        assert!(
            store
                .find_active("ann@example.com", 1_000_000)
                .await
                .unwrap()
                .is_some()
        );
    }
}
