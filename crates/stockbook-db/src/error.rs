//! # Database Error Types
//!
//! Error types for database operations, and the error every public
//! operation of this crate returns.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds categorization (Busy, UniqueViolation, ...)             │
//! │       │                                                                 │
//! │       │        CoreError (validation, stock, quota, not found)          │
//! │       │             │                                                   │
//! │       ▼             ▼                                                   │
//! │  LedgerError = Core | Db   ← what callers match on                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ErrorReport { kind, message } ← serialized for the UI                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockbook_core::{CoreError, ErrorKind, ErrorReport, ValidationError};
use thiserror::Error;

/// SQLite primary and extended result codes meaning "could not get the lock".
///
/// 5 BUSY, 6 LOCKED, 261 BUSY_RECOVERY, 262 LOCKED_SHAREDCACHE,
/// 517 BUSY_SNAPSHOT, 773 BUSY_TIMEOUT.
const SQLITE_LOCK_CODES: &[&str] = &["5", "6", "261", "262", "517", "773"];

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and retry decisions.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate SKU or barcode within a store
    /// - Duplicate user email
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent store, customer or product
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A lock could not be acquired within the configured lock timeout.
    ///
    /// ## When This Occurs
    /// - Another transaction holds the database writer lock longer than
    ///   `lock_timeout`
    #[error("Database busy: {0}")]
    Busy(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed (CHECK constraints, append-only triggers).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (no connection within the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether the operation may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Busy(_) | DbError::PoolExhausted => ErrorKind::Busy,
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ErrorKind::InvalidRequest
            }
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound     → DbError::NotFound
/// sqlx::Error::Database        → lock code? Busy : constraint kind
/// sqlx::Error::PoolTimedOut    → DbError::PoolExhausted
/// Other                        → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let locked = db_err
                    .code()
                    .map(|code| SQLITE_LOCK_CODES.contains(&code.as_ref()))
                    .unwrap_or(false);

                if locked || msg.contains("database is locked") || msg.contains("table is locked")
                {
                    DbError::Busy(msg.to_string())
                } else if db_err.is_unique_violation() || msg.contains("UNIQUE constraint failed") {
                    // "UNIQUE constraint failed: products.store_id, products.sku"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if db_err.is_foreign_key_violation()
                    || msg.contains("FOREIGN KEY constraint failed")
                {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Ledger Error
// =============================================================================

/// The error returned by every ledger, report and quota operation.
///
/// ## Matching
/// ```rust,ignore
/// match processor.process_sale(request).await {
///     Ok(done) => print_receipt(&done.sale),
///     Err(e) if e.is_retryable() => retry_later(),
///     Err(e) => show(e.report()),
/// }
/// ```
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Core(err) => err.kind(),
            LedgerError::Db(err) => err.kind(),
        }
    }

    /// True for `Busy`: lock timeout or pool exhaustion.
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::Core(_) => false,
            LedgerError::Db(err) => err.is_retryable(),
        }
    }

    /// The caller-facing `{kind, message}` pair.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        LedgerError::Core(CoreError::not_found(entity, id))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Db(err.into())
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Core(err.into())
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
