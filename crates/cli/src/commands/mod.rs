//! CLI command implementations.

pub mod data;
pub mod pool;
pub mod users;

use std::path::PathBuf;

use thiserror::Error;

use phone_dialer_core::RoleParseError;
use phone_dialer_server::services::ServiceError;
use phone_dialer_server::store::StoreError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A service operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The data directory could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid role.
    #[error(transparent)]
    InvalidRole(#[from] RoleParseError),

    /// An input file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
