// Central Error Type for the Application
//
// Kinds map 1:1 to the error taxonomy: validation, not_found, conflict,
// storage_unavailable, internal. `Database` doubles as storage_unavailable
// at the RPC boundary (api-rpc::error::to_rpc_error).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

// Infra crates convert sqlx::Error -> String before crossing the port
// boundary, to avoid a circular dependency on sqlx from core (ADR-001).
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Database(err)
    }
}
