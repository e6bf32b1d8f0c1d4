//! Flat-file JSON document store.
//!
//! # Documents
//!
//! One JSON file per resource in the data directory:
//!
//! - `users.json` - username → account
//! - `phonePool.json` - shared pool, an array of digit strings
//! - `assignments.json` - salesperson → allotted numbers
//! - `userData.json` - username → personal list and call counters
//!
//! Each document is read and written whole. A missing file reads as the
//! document's default value. Writes go to a temporary sibling and are moved
//! into place with a rename, and read-modify-write cycles within this process
//! are serialized per document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use phone_dialer_core::{Assignments, CallDataTable, UserTable, seed_users};

/// Store operation errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading, writing or removing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document is not valid JSON for its shape.
    #[error("malformed {document} document: {source}")]
    Json {
        document: Document,
        #[source]
        source: serde_json::Error,
    },
}

/// The persisted resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Users,
    PhonePool,
    Assignments,
    UserData,
}

impl Document {
    /// Every document, in initialization order.
    pub const ALL: [Self; 4] = [Self::Users, Self::PhonePool, Self::Assignments, Self::UserData];

    /// File name within the data directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Users => "users.json",
            Self::PhonePool => "phonePool.json",
            Self::Assignments => "assignments.json",
            Self::UserData => "userData.json",
        }
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Whole-document JSON store rooted at a data directory.
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    users_lock: Mutex<()>,
    pool_lock: Mutex<()>,
    assignments_lock: Mutex<()>,
    user_data_lock: Mutex<()>,
}

impl JsonStore {
    /// Create a store over `dir`. Nothing is touched on disk until the first
    /// write or [`Self::initialize`].
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            users_lock: Mutex::new(()),
            pool_lock: Mutex::new(()),
            assignments_lock: Mutex::new(()),
            user_data_lock: Mutex::new(()),
        }
    }

    const fn lock_for(&self, document: Document) -> &Mutex<()> {
        match document {
            Document::Users => &self.users_lock,
            Document::PhonePool => &self.pool_lock,
            Document::Assignments => &self.assignments_lock,
            Document::UserData => &self.user_data_lock,
        }
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, document: Document) -> PathBuf {
        self.dir.join(document.file_name())
    }

    /// Create the data directory and write every absent document with its
    /// first-run value.
    ///
    /// Returns the documents that were created.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory or a file cannot be created.
    pub async fn initialize(&self) -> Result<Vec<Document>, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let mut created = Vec::new();
        for document in Document::ALL {
            let _guard = self.lock_for(document).lock().await;
            if self.exists(document).await? {
                continue;
            }
            match document {
                Document::Users => self.write_unlocked(document, &seed_users()).await?,
                Document::PhonePool => self.write_unlocked(document, &[] as &[String]).await?,
                Document::Assignments => {
                    self.write_unlocked(document, &Assignments::new()).await?;
                }
                Document::UserData => {
                    self.write_unlocked(document, &CallDataTable::new()).await?;
                }
            }
            created.push(document);
        }

        if !created.is_empty() {
            tracing::info!(dir = %self.dir.display(), ?created, "Initialized data documents");
        }
        Ok(created)
    }

    async fn exists(&self, document: Document) -> Result<bool, StoreError> {
        let path = self.path(document);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }

    /// Read a document, or build its default when the file is missing.
    async fn read_or<T, F>(&self, document: Document, default: F) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let path = self.path(document);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| StoreError::Json { document, source }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(default()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    async fn write_unlocked<T>(&self, document: Document, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|source| StoreError::Json { document, source })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path(document);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io { path, source })?;

        tracing::debug!(%document, "Wrote document");
        Ok(())
    }

    /// Replace a document.
    async fn write<T>(&self, document: Document, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let _guard = self.lock_for(document).lock().await;
        self.write_unlocked(document, value).await
    }

    /// Read, mutate and write back a document under its lock.
    ///
    /// Nothing is written when `f` fails.
    async fn update<T, D, F, R, E>(&self, document: Document, default: D, f: F) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned,
        D: FnOnce() -> T,
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock_for(document).lock().await;
        let mut value = self.read_or(document, default).await?;
        let result = f(&mut value)?;
        self.write_unlocked(document, &value).await?;
        Ok(result)
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    /// The user table. A missing document reads as the seed accounts.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file exists but cannot be read or parsed.
    pub async fn users(&self) -> Result<UserTable, StoreError> {
        self.read_or(Document::Users, seed_users).await
    }

    /// Replace the user table.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the document cannot be written.
    pub async fn put_users(&self, users: &UserTable) -> Result<(), StoreError> {
        self.write(Document::Users, users).await
    }

    /// Mutate the user table in place.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a `StoreError` converted into `E`.
    pub async fn update_users<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut UserTable) -> Result<R, E>,
        E: From<StoreError>,
    {
        self.update(Document::Users, seed_users, f).await
    }

    /// The phone pool.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file exists but cannot be read or parsed.
    pub async fn pool(&self) -> Result<Vec<String>, StoreError> {
        self.read_or(Document::PhonePool, Vec::new).await
    }

    /// Replace the phone pool.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the document cannot be written.
    pub async fn put_pool(&self, pool: &[String]) -> Result<(), StoreError> {
        self.write(Document::PhonePool, pool).await
    }

    /// Mutate the phone pool in place.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a `StoreError` converted into `E`.
    pub async fn update_pool<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<String>) -> Result<R, E>,
        E: From<StoreError>,
    {
        self.update(Document::PhonePool, Vec::new, f).await
    }

    /// The current assignment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file exists but cannot be read or parsed.
    pub async fn assignments(&self) -> Result<Assignments, StoreError> {
        self.read_or(Document::Assignments, Assignments::new).await
    }

    /// Replace the assignment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the document cannot be written.
    pub async fn put_assignments(&self, assignments: &Assignments) -> Result<(), StoreError> {
        self.write(Document::Assignments, assignments).await
    }

    /// Mutate the assignment in place.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a `StoreError` converted into `E`.
    pub async fn update_assignments<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Assignments) -> Result<R, E>,
        E: From<StoreError>,
    {
        self.update(Document::Assignments, Assignments::new, f).await
    }

    /// Per-user call data.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file exists but cannot be read or parsed.
    pub async fn call_data(&self) -> Result<CallDataTable, StoreError> {
        self.read_or(Document::UserData, CallDataTable::new).await
    }

    /// Mutate the call data in place.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a `StoreError` converted into `E`.
    pub async fn update_call_data<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut CallDataTable) -> Result<R, E>,
        E: From<StoreError>,
    {
        self.update(Document::UserData, CallDataTable::new, f).await
    }

    /// Delete every document. Missing files are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if an existing file cannot be removed.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        for document in Document::ALL {
            let _guard = self.lock_for(document).lock().await;
            let path = self.path(document);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
        tracing::warn!(dir = %self.dir.display(), "Cleared all data documents");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use phone_dialer_core::{Role, UserCallData, Username};

    use super::*;

    fn store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("data"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_documents_read_as_defaults() {
        let (_dir, store) = store();

        assert!(store.pool().await.unwrap().is_empty());
        assert!(store.assignments().await.unwrap().is_empty());
        assert!(store.call_data().await.unwrap().is_empty());
        assert_eq!(store.users().await.unwrap(), seed_users());
    }

    #[tokio::test]
    async fn test_initialize_writes_seed_documents_once() {
        let (_dir, store) = store();

        let created = store.initialize().await.unwrap();
        assert_eq!(created, Document::ALL.to_vec());

        let users = tokio::fs::read_to_string(store.dir().join("users.json"))
            .await
            .unwrap();
        assert!(users.contains("\n  \"admin\": {"));
        assert!(users.contains("\"name\": \"System Administrator\""));

        let pool = tokio::fs::read_to_string(store.dir().join("phonePool.json"))
            .await
            .unwrap();
        assert_eq!(pool, "[]");

        assert!(store.initialize().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_documents() {
        let (_dir, store) = store();
        store.put_pool(&["13812345678".to_owned()]).await.unwrap();

        let created = store.initialize().await.unwrap();
        assert!(!created.contains(&Document::PhonePool));
        assert_eq!(store.pool().await.unwrap(), vec!["13812345678".to_owned()]);
    }

    #[tokio::test]
    async fn test_update_failure_writes_nothing() {
        let (_dir, store) = store();
        store.put_pool(&["13812345678".to_owned()]).await.unwrap();

        let result: Result<(), StoreError> = store
            .update_pool(|pool| {
                pool.clear();
                Err(StoreError::Json {
                    document: Document::PhonePool,
                    source: serde_json::from_str::<u8>("x").unwrap_err(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.pool().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_call_data_round_trip() {
        let (_dir, store) = store();
        let name = Username::parse("sales1").unwrap();

        store
            .update_call_data(|table| {
                table.entry(name.clone()).or_default().phones.push("5551234".to_owned());
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();

        let table = store.call_data().await.unwrap();
        assert_eq!(
            table.get(&name),
            Some(&UserCallData {
                phones: vec!["5551234".to_owned()],
                ..UserCallData::default()
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_document() {
        let (_dir, store) = store();
        store.initialize().await.unwrap();
        tokio::fs::write(store.dir().join("assignments.json"), "{not json")
            .await
            .unwrap();

        let err = store.assignments().await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Json {
                document: Document::Assignments,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_clear_all_then_users_fall_back_to_seed() {
        let (_dir, store) = store();
        store
            .update_users(|users| {
                users.retain(|_, user| user.role == Role::Admin);
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();
        assert_eq!(store.users().await.unwrap().len(), 1);

        store.clear_all().await.unwrap();
        store.clear_all().await.unwrap();

        assert!(!store.dir().join("users.json").exists());
        assert_eq!(store.users().await.unwrap(), seed_users());
    }
}
