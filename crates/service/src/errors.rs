use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("render error: {0}")]
    Render(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }

    /// Translate a driver error into the service taxonomy. Uniqueness is
    /// enforced by the storage layer, not by check-then-write round trips,
    /// so the unique-violation signal is the source of truth for conflicts.
    pub fn from_db(context: &str, err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict(format!("{} already exists", context))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::Conflict(format!("{} is still referenced", context))
            }
            _ => Self::Db(err.to_string()),
        }
    }
}
