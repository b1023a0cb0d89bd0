//! Pluggable storage backends for accounts and login codes.
//!
//! This module provides a trait-based storage system that allows
//! different backends to be used for persistence. The available backends
//! depend on the enabled features. Both seams are deliberately small:
//! [`UserStore`] covers account lookup and creation, [`OtpStore`] covers
//! the append-only code table and its single-use consumption.

use crate::AuthError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Always available
mod memory;
pub use memory::MemoryStore;

// Feature-gated storage backends
#[cfg(feature = "sqlite-storage")]
mod sqlite;
#[cfg(feature = "sqlite-storage")]
pub use sqlite::SqliteStore;

/// A registered account.
///
/// The `password` field holds the credential exactly as it was supplied
/// at registration; it never leaves the library through the verification
/// result.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Backend-assigned identifier, monotonically increasing.
    pub id: i64,
    /// Display name of the account.
    pub name: String,
    /// Normalized (trimmed, lowercased) email address, unique per account.
    pub email: String,
    /// Credential secret, stored as supplied.
    pub password: String,
    /// Optional external account reference, e.g. an on-chain wallet address.
    pub wallet_address: Option<String>,
}

/// Input for registering a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name of the account.
    pub name: String,
    /// Email address; normalized by the service before it reaches a store.
    pub email: String,
    /// Credential secret.
    pub password: String,
    /// Optional external account reference.
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// A stored login code with its metadata.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    /// Backend-assigned identifier, monotonically increasing; newer codes
    /// have larger ids.
    pub id: i64,
    /// Email address the code was issued for.
    pub email: String,
    /// The 6-digit code, kept as the exact string that was delivered.
    pub code: String,
    /// Unix timestamp after which the code is dead.
    pub expires_at: i64,
    /// Whether the code has been consumed by a successful verification.
    pub consumed: bool,
}

/// Normalizes an email address for storage and lookup.
///
/// Stores compare byte-wise, so every entry point funnels emails through
/// this before touching a backend.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Abstract storage backend for registered accounts.
///
/// # Thread Safety
///
/// All methods are async and must be thread-safe. Implementations should
/// handle concurrent access properly.
///
/// # Error Handling
///
/// All methods return `Result<T, AuthError>` and should map
/// backend-specific errors to appropriate `AuthError` variants;
/// [`AuthError::from_database_message`] covers the generic case.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Optional method for storage backend initialization.
    ///
    /// Called when the service is built. A backend serving both store
    /// roles sees this more than once, so initialization must be
    /// idempotent.
    async fn init(&self) -> Result<(), AuthError> {
        // Default implementation does nothing
        Ok(())
    }

    /// Retrieves the account registered under `email`, if any.
    ///
    /// Lookups compare byte-wise; callers pass emails already trimmed
    /// and lowercased.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Creates a new account and returns the stored record.
    ///
    /// The duplicate check and the insert must be atomic: if the email
    /// is already taken this fails with [`AuthError::Conflict`], and two
    /// concurrent registrations for the same address cannot both
    /// succeed.
    async fn create(&self, user: NewUser) -> Result<UserRecord, AuthError>;
}

/// Abstract storage backend for issued login codes.
///
/// The code table is append-only: issuing never touches earlier rows,
/// and nothing here deletes records. Consumption is a one-way flag flip
/// guarded by a conditional update.
///
/// # Example Implementation
///
/// ```rust
/// use otp_auth::AuthError;
/// use otp_auth::store::{OtpRecord, OtpStore};
/// use async_trait::async_trait;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI64, Ordering};
/// use tokio::sync::RwLock;
///
/// #[derive(Default)]
/// pub struct VecOtpStore {
///     rows: Arc<RwLock<Vec<OtpRecord>>>,
///     next_id: AtomicI64,
/// }
///
/// #[async_trait]
/// impl OtpStore for VecOtpStore {
///     async fn insert(
///         &self,
///         email: &str,
///         code: &str,
///         expires_at: i64,
///     ) -> Result<OtpRecord, AuthError> {
///         let record = OtpRecord {
///             id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
///             email: email.to_string(),
///             code: code.to_string(),
///             expires_at,
///             consumed: false,
///         };
///         self.rows.write().await.push(record.clone());
///         Ok(record)
///     }
///
///     async fn find_active(
///         &self,
///         email: &str,
///         now: i64,
///     ) -> Result<Option<OtpRecord>, AuthError> {
///         let rows = self.rows.read().await;
///         Ok(rows
///             .iter()
///             .filter(|r| r.email == email && !r.consumed && r.expires_at > now)
///             .max_by_key(|r| r.id)
///             .cloned())
///     }
///
///     async fn mark_consumed(&self, id: i64) -> Result<bool, AuthError> {
///         let mut rows = self.rows.write().await;
///         match rows.iter_mut().find(|r| r.id == id) {
///             Some(r) if !r.consumed => {
///                 r.consumed = true;
///                 Ok(true)
///             }
///             _ => Ok(false),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Optional method for storage backend initialization. Same contract
    /// as [`UserStore::init`].
    async fn init(&self) -> Result<(), AuthError> {
        // Default implementation does nothing
        Ok(())
    }

    /// Stores a freshly issued code and returns the created record.
    ///
    /// Earlier rows for the same email are left untouched.
    async fn insert(
        &self,
        email: &str,
        code: &str,
        expires_at: i64,
    ) -> Result<OtpRecord, AuthError>;

    /// Returns the newest unconsumed, unexpired code for `email`.
    ///
    /// Unexpired means `expires_at > now`, strictly: a code is dead at
    /// the exact second it expires. Older matching rows are shadowed by
    /// the newest one.
    async fn find_active(&self, email: &str, now: i64) -> Result<Option<OtpRecord>, AuthError>;

    /// Atomically flips a record from unconsumed to consumed.
    ///
    /// Returns `Ok(true)` only for the call that performed the
    /// transition; any later call, or the loser of a concurrent race,
    /// observes `Ok(false)`. This conditional update is what makes codes
    /// single-use under concurrent verification.
    async fn mark_consumed(&self, id: i64) -> Result<bool, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("ann@example.com"), "ann@example.com");
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
        assert_eq!(normalize_email("\tBOB@X.IO\n"), "bob@x.io");
    }
}
