//! Shared pool commands.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use phone_dialer_server::services::PoolService;
use phone_dialer_server::store::JsonStore;

use super::CliError;

/// Extract numbers from a text file and add the new ones to the pool.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no new valid number.
pub async fn import(store: &JsonStore, file: &Path) -> Result<(), CliError> {
    let bytes = tokio::fs::read(file).await.map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let outcome = PoolService::new(store).import_text(&text).await?;
    tracing::info!(
        file = %file.display(),
        added = outcome.added.len(),
        total = outcome.total,
        "Import complete"
    );
    Ok(())
}

/// Log the pool, one number per line.
///
/// # Errors
///
/// Returns an error if the pool document cannot be read.
pub async fn show(store: &JsonStore) -> Result<(), CliError> {
    let pool = PoolService::new(store).pool().await?;
    for phone in &pool {
        tracing::info!("{phone}");
    }
    tracing::info!(total = pool.len(), "Pool size");
    Ok(())
}

/// Empty the pool.
///
/// # Errors
///
/// Returns an error if the pool document cannot be written.
pub async fn clear(store: &JsonStore) -> Result<(), CliError> {
    PoolService::new(store).clear().await?;
    Ok(())
}

/// Distribute the pool over every salesperson.
///
/// # Errors
///
/// Returns an error when there are no salespeople or the pool is empty.
pub async fn distribute(store: &JsonStore) -> Result<(), CliError> {
    let mut rng = StdRng::from_os_rng();
    let outcome = PoolService::new(store).distribute(&mut rng).await?;
    for (username, phones) in &outcome.assignments {
        tracing::info!(username = %username, count = phones.len(), "Assigned");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use phone_dialer_core::DistributionError;
    use phone_dialer_server::services::ServiceError;

    use super::*;

    #[tokio::test]
    async fn test_import_file_and_distribute() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("data"));
        let file = dir.path().join("numbers.csv");
        tokio::fs::write(&file, "name,phone\nA,13812345678\nB,13912345678\n")
            .await
            .unwrap();

        import(&store, &file).await.unwrap();
        assert_eq!(store.pool().await.unwrap().len(), 2);

        distribute(&store).await.unwrap();
        let assigned: usize = store.assignments().await.unwrap().values().map(Vec::len).sum();
        assert_eq!(assigned, 2);
    }

    #[tokio::test]
    async fn test_missing_file_and_empty_pool() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let err = import(&store, &dir.path().join("nope.txt")).await.unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));

        let err = distribute(&store).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Service(ServiceError::Distribution(DistributionError::EmptyPool))
        ));
    }
}
