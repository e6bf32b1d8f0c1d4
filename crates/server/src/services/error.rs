//! Service error types.

use thiserror::Error;

use phone_dialer_core::{DistributionError, PhoneEntryError, UsernameError};

use super::ocr::RecognitionError;
use crate::store::StoreError;

/// Errors that can occur in the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Username, password or role did not match.
    #[error("incorrect username, password or role")]
    InvalidCredentials,

    /// Input was rejected before any state changed.
    #[error("{0}")]
    Validation(String),

    /// The target already exists or is busy.
    #[error("{0}")]
    Conflict(String),

    /// The target does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation is never allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Distribution could not start.
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// Image recognition failed.
    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    /// Reading or writing a document failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<UsernameError> for ServiceError {
    fn from(err: UsernameError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PhoneEntryError> for ServiceError {
    fn from(err: PhoneEntryError) -> Self {
        Self::Validation(err.to_string())
    }
}
