use thiserror::Error;

use crate::domain::FieldErrors;

/// Failure of the persistence layer under the ledger. Nothing is saved when
/// one of these is returned, and the operation can be retried as is.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open ledger: {0:#}")]
    Open(#[source] anyhow::Error),

    #[error("Failed to read ledger: {0:#}")]
    Read(#[source] anyhow::Error),

    #[error("Failed to write ledger: {0:#}")]
    Write(#[source] anyhow::Error),

    #[error("Stored ledger is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid expense: {0}")]
    Validation(#[from] FieldErrors),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
