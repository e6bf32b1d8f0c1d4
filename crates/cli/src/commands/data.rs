//! Data directory commands.

use phone_dialer_server::store::JsonStore;

use super::CliError;

/// Write any missing documents.
///
/// # Errors
///
/// Returns an error if the directory or a document cannot be written.
pub async fn init(store: &JsonStore) -> Result<(), CliError> {
    let seeded = store.initialize().await?;
    if seeded.is_empty() {
        tracing::info!(dir = %store.dir().display(), "All documents already present");
    } else {
        for document in &seeded {
            tracing::info!(file = document.file_name(), "Created document");
        }
    }
    Ok(())
}

/// Delete every document.
///
/// # Errors
///
/// Returns an error if an existing document cannot be removed.
pub async fn clear(store: &JsonStore) -> Result<(), CliError> {
    store.clear_all().await?;
    Ok(())
}
