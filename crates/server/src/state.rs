//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::ocr::recognizer_from_config;
use crate::services::{RecognitionTracker, TextRecognizer};
use crate::store::JsonStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// document store, the OCR recognizer and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: JsonStore,
    recognizer: Box<dyn TextRecognizer>,
    recognitions: RecognitionTracker,
}

impl AppState {
    /// Create a new application state with the recognizer described by the
    /// configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let recognizer = recognizer_from_config(&config.ocr);
        Self::with_recognizer(config, recognizer)
    }

    /// Create a new application state with an explicit recognizer.
    #[must_use]
    pub fn with_recognizer(config: ServerConfig, recognizer: Box<dyn TextRecognizer>) -> Self {
        let store = JsonStore::new(config.data_dir.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                recognizer,
                recognitions: RecognitionTracker::default(),
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &JsonStore {
        &self.inner.store
    }

    /// Get a reference to the OCR recognizer.
    #[must_use]
    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.inner.recognizer.as_ref()
    }

    /// Get a reference to the in-flight recognition tracker.
    #[must_use]
    pub fn recognitions(&self) -> &RecognitionTracker {
        &self.inner.recognitions
    }
}
