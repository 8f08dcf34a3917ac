//! # Persistence Errors
//!
//! Error types for the persistence layer, wrapping sqlx errors and
//! classifying the ones the business layer reacts to: unique-constraint
//! violations (duplicate owner, reference collision) and busy/locked
//! databases (transient write conflicts).

use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Transient; the caller may retry
    #[error("Write conflict: database busy or locked")]
    WriteConflict,

    #[error("Invalid decimal value in column {column}: {value}")]
    InvalidDecimal { column: String, value: String },

    #[error("Invalid enum value: {field} = {value}")]
    InvalidEnumValue { field: String, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Domain error: {0}")]
    Domain(#[from] susu_core::CoreError),
}

/// Result type alias for PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid_decimal(column: &str, value: &str) -> Self {
        Self::InvalidDecimal {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// True when the violated constraint involves the named column.
    pub fn violates(&self, column: &str) -> bool {
        matches!(self, Self::UniqueViolation(msg) if msg.contains(column))
    }
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::UniqueViolation(db_err.message().to_string());
            }
            // SQLITE_BUSY (5) / SQLITE_LOCKED (6), including extended codes
            if let Some(code) = db_err.code() {
                if code == "5" || code == "6" || code == "517" || code == "262" {
                    return Self::WriteConflict;
                }
            }
        }
        Self::Database(err)
    }
}
