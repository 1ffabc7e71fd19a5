// storage/src/errors.rs

use models::ModelError;
pub use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("{kind} with id {id} was not found")]
    NotFound { kind: &'static str, id: u64 },
    #[error("medication code '{0}' already exists")]
    DuplicateCode(String),
    #[error("patient with id {0} does not exist")]
    MissingPatient(u64),
    #[error("medication with id {0} does not exist")]
    MissingMedication(u64),
}

/// A type alias for a `Result` that returns a `StoreError` on failure.
pub type StoreResult<T> = Result<T, StoreError>;
