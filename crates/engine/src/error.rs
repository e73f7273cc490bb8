//! The module contains the errors the engine can throw.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("Protected: {0}")]
    Protected(String),
    /// Retryable concurrency failure (lock wait timeout, deadlock,
    /// serialization conflict).
    #[error("Conflict, retry the operation: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        if is_lock_contention(&err) {
            Self::Conflict(err.to_string())
        } else {
            Self::Database(err)
        }
    }
}

/// Classifies driver errors that mean "somebody else holds the row".
///
/// Covers SQLite busy/locked, MySQL lock wait timeout/deadlock, and the
/// Postgres serialization (40001) and lock-not-available (55P03) states.
fn is_lock_contention(err: &DbErr) -> bool {
    let text = err.to_string().to_lowercase();
    text.contains("database is locked")
        || text.contains("database table is locked")
        || text.contains("deadlock")
        || text.contains("lock wait timeout")
        || text.contains("could not serialize")
        || text.contains("lock not available")
        || text.contains("40001")
        || text.contains("55p03")
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Protected(a), Self::Protected(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_database_maps_to_conflict() {
        let err = DbErr::Exec(sea_orm::RuntimeErr::Internal(
            "database is locked".to_string(),
        ));
        assert!(matches!(EngineError::from(err), EngineError::Conflict(_)));
    }

    #[test]
    fn plain_exec_error_maps_to_database() {
        let err = DbErr::Exec(sea_orm::RuntimeErr::Internal(
            "no such table: accounts".to_string(),
        ));
        assert!(matches!(EngineError::from(err), EngineError::Database(_)));
    }
}
