//! Login-code verification pipeline.

use super::code::constant_time_eq;
use super::store::{OtpStore, UserStore, normalize_email};
use super::time_utils::ClockFn;
use crate::{AuthError, Profile};
use std::sync::Arc;

/// Verifies submitted login codes against stored ones.
///
/// A verification either consumes the active code and returns the
/// account profile, or fails with [`AuthError::Unauthorized`] without
/// saying which check broke. Missing, expired, wrong, and already-used
/// codes are indistinguishable to the caller.
pub struct OtpVerifier {
    users: Arc<dyn UserStore>,
    otps: Arc<dyn OtpStore>,
    clock: ClockFn,
}

impl OtpVerifier {
    pub(crate) fn new(users: Arc<dyn UserStore>, otps: Arc<dyn OtpStore>, clock: ClockFn) -> Self {
        Self {
            users,
            otps,
            clock,
        }
    }

    /// Checks `code` against the active code for `email` and, on
    /// success, returns the account's profile.
    ///
    /// The active code is the newest unconsumed, unexpired one; an
    /// older still-valid code is shadowed until the newer one is
    /// consumed or expires. Matching compares the exact submitted
    /// string, so a code with a leading zero must be typed with it.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<Profile, AuthError> {
        let email = normalize_email(email);
        let now = (self.clock)()?;

        let record = self
            .otps
            .find_active(&email, now)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !constant_time_eq(record.code.as_bytes(), code.as_bytes()) {
            return Err(AuthError::Unauthorized);
        }

        // Consume before touching the account table. The flip is
        // conditional, so of two racing verifications exactly one gets
        // `true` here; the loser is turned away like any bad code.
        if !self.otps.mark_consumed(record.id).await? {
            return Err(AuthError::Unauthorized);
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::NotFound)?;

        tracing::debug!("Verified login code (id {}) for {}", record.id, email);

        Ok(Profile {
            name: user.name,
            wallet_address: user.wallet_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::store::{MemoryStore, NewUser, UserRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn fixed_clock(at: i64) -> ClockFn {
        Arc::new(move || Ok(at))
    }

    fn steppable_clock(now: Arc<AtomicI64>) -> ClockFn {
        Arc::new(move || Ok(now.load(Ordering::SeqCst)))
    }

    fn verifier_with(store: Arc<MemoryStore>, clock: ClockFn) -> OtpVerifier {
        OtpVerifier::new(store.clone(), store, clock)
    }

    async fn store_with_ann() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .create(NewUser {
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
                password: "hunter2".to_string(),
                wallet_address: Some("0xabc123".to_string()),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_verify_without_issued_code() {
        let store = store_with_ann().await;
        let verifier = verifier_with(store, fixed_clock(1_000));

        let result = verifier.verify_otp("ann@example.com", "123456").await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_wrong_code_leaves_record_active() {
        let store = store_with_ann().await;
        store.insert("ann@example.com", "123456", 2_000).await.unwrap();
        let verifier = verifier_with(store.clone(), fixed_clock(1_000));

        let result = verifier.verify_otp("ann@example.com", "654321").await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));

        // The failed guess did not consume anything.
        let profile = verifier
            .verify_otp("ann@example.com", "123456")
            .await
            .unwrap();
        assert_eq!(profile.name, "Ann");
        assert_eq!(profile.wallet_address.as_deref(), Some("0xabc123"));
    }

    #[tokio::test]
    async fn test_leading_zeros_matter() {
        let store = store_with_ann().await;
        store.insert("ann@example.com", "024680", 2_000).await.unwrap();
        let verifier = verifier_with(store, fixed_clock(1_000));

        // "24680" is numerically equal but not the same string.
        let result = verifier.verify_otp("ann@example.com", "24680").await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));

        assert!(verifier.verify_otp("ann@example.com", "024680").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_code_rejected() {
        let store = store_with_ann().await;
        store.insert("ann@example.com", "123456", 2_000).await.unwrap();

        let now = Arc::new(AtomicI64::new(1_999));
        let verifier = verifier_with(store, steppable_clock(now.clone()));

        // One second before expiry the code works; roll the clock back
        // only after proving the boundary.
        now.store(2_000, Ordering::SeqCst);
        let result = verifier.verify_otp("ann@example.com", "123456").await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));

        now.store(1_999, Ordering::SeqCst);
        assert!(verifier.verify_otp("ann@example.com", "123456").await.is_ok());
    }

    #[tokio::test]
    async fn test_replay_rejected() {
        let store = store_with_ann().await;
        store.insert("ann@example.com", "123456", 2_000).await.unwrap();
        let verifier = verifier_with(store, fixed_clock(1_000));

        assert!(verifier.verify_otp("ann@example.com", "123456").await.is_ok());

        let result = verifier.verify_otp("ann@example.com", "123456").await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_newest_code_shadows_older() {
        let store = store_with_ann().await;
        store.insert("ann@example.com", "111111", 2_000).await.unwrap();
        store.insert("ann@example.com", "222222", 2_000).await.unwrap();
        let verifier = verifier_with(store, fixed_clock(1_000));

        // The older code is shadowed while the newer one is active.
        let result = verifier.verify_otp("ann@example.com", "111111").await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));

        assert!(verifier.verify_otp("ann@example.com", "222222").await.is_ok());

        // With the newest consumed, the older unconsumed code surfaces.
        assert!(verifier.verify_otp("ann@example.com", "111111").await.is_ok());
    }

    #[tokio::test]
    async fn test_normalized_email_matches() {
        let store = store_with_ann().await;
        store.insert("ann@example.com", "123456", 2_000).await.unwrap();
        let verifier = verifier_with(store, fixed_clock(1_000));

        assert!(
            verifier
                .verify_otp("  ANN@Example.com ", "123456")
                .await
                .is_ok()
        );
    }

    /// Account lookups always come up empty, simulating an account that
    /// vanished between code issue and verification.
    struct VanishedUserStore;

    #[async_trait]
    impl UserStore for VanishedUserStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, AuthError> {
            Ok(None)
        }

        async fn create(&self, _user: NewUser) -> Result<UserRecord, AuthError> {
            Err(AuthError::internal("read-only store"))
        }
    }

    #[tokio::test]
    async fn test_vanished_account_after_consume() {
        let otps = Arc::new(MemoryStore::new());
        otps.insert("ann@example.com", "123456", 2_000).await.unwrap();

        let verifier = OtpVerifier::new(
            Arc::new(VanishedUserStore),
            otps.clone(),
            fixed_clock(1_000),
        );

        let result = verifier.verify_otp("ann@example.com", "123456").await;
        assert!(matches!(result, Err(AuthError::NotFound)));

        // The code was consumed before the account lookup ran.
        assert!(
            otps.find_active("ann@example.com", 1_000)
                .await
                .unwrap()
                .is_none()
        );
    }
}
