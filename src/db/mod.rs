pub mod repository;
pub mod sqlite;

pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Unique constraint violated: {0}")]
    Duplicate(String),

    #[error("Referenced row missing: {0}")]
    MissingReference(String),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },
}

impl DatabaseError {
    /// Classify a rusqlite error so callers can answer with a client error
    /// instead of a 500: foreign-key violations become `MissingReference`,
    /// any other constraint violation becomes `Duplicate`.
    pub fn from_sqlite(err: rusqlite::Error, what: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            if e.code == rusqlite::ErrorCode::ConstraintViolation {
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                    return DatabaseError::MissingReference(what.to_string());
                }
                return DatabaseError::Duplicate(what.to_string());
            }
        }
        DatabaseError::Sqlite(err)
    }
}
