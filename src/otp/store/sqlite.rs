//! SQLite storage backend implementation.
//!
//! This module provides a production-ready SQLite backend for account
//! and login-code persistence. It's ideal for single-instance
//! applications that need data to survive restarts.

use super::{NewUser, OtpRecord, OtpStore, UserRecord, UserStore};
use crate::AuthError;
use async_trait::async_trait;
use rusqlite::{Connection, params};
use std::sync::{Arc, Mutex};

/// SQLite-based storage backend serving both store roles.
///
/// # Features
///
/// - **Persistent storage**: Data survives application restarts
/// - **Atomic registration**: A `UNIQUE` email column rejects duplicates
/// - **Atomic consumption**: Conditional `UPDATE` makes codes single-use
/// - **Thread-safe**: Uses `Arc<Mutex<Connection>>` for concurrent access
///
/// # Example
///
/// ```rust
/// use otp_auth::store::SqliteStore;
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), otp_auth::AuthError> {
/// // File-based storage
/// let store = Arc::new(SqliteStore::new("otp_auth.db")?);
///
/// // Or in-memory SQLite (for testing)
/// let memory_store = Arc::new(SqliteStore::new(":memory:")?);
/// # Ok(())
/// # }
/// ```
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Create a new SQLite storage backend.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the SQLite database file, or ":memory:" for an in-memory database
    pub fn new(db_path: &str) -> Result<Self, AuthError> {
        let connection = if db_path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(db_path)
        };

        let connection = connection.map_err(|e| AuthError::from_database_message(e.to_string()))?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Create the database schema if it doesn't exist.
    ///
    /// Reached through both trait `init` hooks, so everything in here
    /// uses `IF NOT EXISTS`.
    fn init_schema(&self) -> Result<(), AuthError> {
        let conn = self.connection.lock().unwrap();

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                wallet_address TEXT
            )
            "#,
            [],
        )
        .map_err(|e| AuthError::from_database_message(e.to_string()))?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS otp_codes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL,
                code TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                consumed INTEGER NOT NULL DEFAULT 0
            )
            "#,
            [],
        )
        .map_err(|e| AuthError::from_database_message(e.to_string()))?;

        // Covers the active-code lookup in find_active
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_otp_lookup ON otp_codes (email, consumed, expires_at)",
            [],
        )
        .map_err(|e| AuthError::from_database_message(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn init(&self) -> Result<(), AuthError> {
        self.init_schema()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let conn = self.connection.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, name, email, password, wallet_address FROM users WHERE email = ?1",
            )
            .map_err(|e| AuthError::from_database_message(e.to_string()))?;

        let result = stmt.query_row(params![email], |row| {
            Ok(UserRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                wallet_address: row.get(4)?,
            })
        });

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AuthError::from_database_message(e.to_string())),
        }
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AuthError> {
        let conn = self.connection.lock().unwrap();

        conn.execute(
            "INSERT INTO users (name, email, password, wallet_address) VALUES (?1, ?2, ?3, ?4)",
            params![user.name, user.email, user.password, user.wallet_address],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(sqlite_err, _)
                if sqlite_err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AuthError::Conflict
            }
            _ => AuthError::from_database_message(e.to_string()),
        })?;

        Ok(UserRecord {
            id: conn.last_insert_rowid(),
            name: user.name,
            email: user.email,
            password: user.password,
            wallet_address: user.wallet_address,
        })
    }
}

#[async_trait]
impl OtpStore for SqliteStore {
    async fn init(&self) -> Result<(), AuthError> {
        self.init_schema()
    }

    async fn insert(
        &self,
        email: &str,
        code: &str,
        expires_at: i64,
    ) -> Result<OtpRecord, AuthError> {
        let conn = self.connection.lock().unwrap();

        conn.execute(
            "INSERT INTO otp_codes (email, code, expires_at) VALUES (?1, ?2, ?3)",
            params![email, code, expires_at],
        )
        .map_err(|e| AuthError::from_database_message(e.to_string()))?;

        Ok(OtpRecord {
            id: conn.last_insert_rowid(),
            email: email.to_string(),
            code: code.to_string(),
            expires_at,
            consumed: false,
        })
    }

    async fn find_active(&self, email: &str, now: i64) -> Result<Option<OtpRecord>, AuthError> {
        let conn = self.connection.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, email, code, expires_at, consumed FROM otp_codes \
                 WHERE email = ?1 AND consumed = 0 AND expires_at > ?2 \
                 ORDER BY id DESC LIMIT 1",
            )
            .map_err(|e| AuthError::from_database_message(e.to_string()))?;

        let result = stmt.query_row(params![email, now], |row| {
            Ok(OtpRecord {
                id: row.get(0)?,
                email: row.get(1)?,
                code: row.get(2)?,
                expires_at: row.get(3)?,
                consumed: row.get(4)?,
            })
        });

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AuthError::from_database_message(e.to_string())),
        }
    }

    async fn mark_consumed(&self, id: i64) -> Result<bool, AuthError> {
        let conn = self.connection.lock().unwrap();

        // The WHERE clause makes the flip conditional, so only one
        // caller ever sees a changed row.
        let changes = conn
            .execute(
                "UPDATE otp_codes SET consumed = 1 WHERE id = ?1 AND consumed = 0",
                params![id],
            )
            .map_err(|e| AuthError::from_database_message(e.to_string()))?;

        Ok(changes > 0)
    }
}
