//! In-memory storage backend.
//!
//! Keeps accounts and login codes in process memory behind `RwLock`ed
//! maps. Data does not survive a restart, which makes this backend a
//! fit for tests, examples, and short-lived tools rather than
//! production deployments.

use super::{NewUser, OtpRecord, OtpStore, UserRecord, UserStore};
use crate::AuthError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// In-memory storage implementation serving both store roles.
///
/// Accounts are keyed by email exactly as given (the service normalizes
/// addresses before they reach a store), codes by their assigned id.
/// Ids are handed out from atomic counters so they grow monotonically,
/// mirroring what an autoincrement column would do.
///
/// # Example
///
/// ```rust
/// use otp_auth::store::{MemoryStore, NewUser, UserStore};
///
/// # async fn example() -> Result<(), otp_auth::AuthError> {
/// let store = MemoryStore::new();
/// store
///     .create(NewUser {
///         name: "Ann".to_string(),
///         email: "ann@example.com".to_string(),
///         password: "hunter2".to_string(),
///         wallet_address: None,
///     })
///     .await?;
/// assert!(store.find_by_email("ann@example.com").await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    otps: RwLock<HashMap<i64, OtpRecord>>,
    next_user_id: AtomicI64,
    next_otp_id: AtomicI64,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered accounts.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns the number of stored codes, consumed ones included.
    pub async fn otp_count(&self) -> usize {
        self.otps.read().await.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            otps: RwLock::new(HashMap::new()),
            next_user_id: AtomicI64::new(1),
            next_otp_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AuthError> {
        // Check-and-insert under one write guard keeps registration atomic.
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(AuthError::Conflict);
        }
        let record = UserRecord {
            id: self.next_user_id.fetch_add(1, Ordering::SeqCst),
            name: user.name,
            email: user.email,
            password: user.password,
            wallet_address: user.wallet_address,
        };
        users.insert(record.email.clone(), record.clone());
        Ok(record)
    }
}

#[async_trait]
impl OtpStore for MemoryStore {
    async fn insert(
        &self,
        email: &str,
        code: &str,
        expires_at: i64,
    ) -> Result<OtpRecord, AuthError> {
        let mut otps = self.otps.write().await;
        let record = OtpRecord {
            id: self.next_otp_id.fetch_add(1, Ordering::SeqCst),
            email: email.to_string(),
            code: code.to_string(),
            expires_at,
            consumed: false,
        };
        otps.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_active(&self, email: &str, now: i64) -> Result<Option<OtpRecord>, AuthError> {
        let otps = self.otps.read().await;
        Ok(otps
            .values()
            .filter(|r| r.email == email && !r.consumed && r.expires_at > now)
            .max_by_key(|r| r.id)
            .cloned())
    }

    async fn mark_consumed(&self, id: i64) -> Result<bool, AuthError> {
        let mut otps = self.otps.write().await;
        match otps.get_mut(&id) {
            Some(record) if !record.consumed => {
                record.consumed = true;
                Ok(true)
            }
            // Already consumed, or no such record.
            _ => Ok(false),
        }
    }
}
