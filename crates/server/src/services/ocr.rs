//! Optical character recognition.
//!
//! Recognition is delegated to an external program. The dialer only needs
//! the recognized text; number extraction happens afterwards in core.

use std::collections::HashSet;
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use phone_dialer_core::Username;

use crate::config::OcrConfig;

/// Image extensions accepted for recognition.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

/// Errors from a recognition attempt.
#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    /// No recognizer is configured.
    #[error("image recognition is not available on this server")]
    Disabled,

    /// The recognizer could not be started or fed.
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The recognizer ran but reported failure.
    #[error("recognition failed: {0}")]
    Failed(String),
}

/// Turns an image into text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text in an encoded image.
    async fn recognize(&self, image: &[u8]) -> Result<String, RecognitionError>;
}

/// Build the recognizer described by `config`.
#[must_use]
pub fn recognizer_from_config(config: &OcrConfig) -> Box<dyn TextRecognizer> {
    match &config.command {
        Some(command) => Box::new(TesseractCli::new(command.clone(), config.languages.clone())),
        None => Box::new(DisabledRecognizer),
    }
}

/// Runs a Tesseract-compatible command line: `<command> stdin stdout -l <languages>`.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
    languages: String,
}

impl TesseractCli {
    /// Create a recognizer invoking `command` with the given language string.
    #[must_use]
    pub const fn new(command: String, languages: String) -> Self {
        Self { command, languages }
    }
}

#[async_trait]
impl TextRecognizer for TesseractCli {
    async fn recognize(&self, image: &[u8]) -> Result<String, RecognitionError> {
        let spawn_error = |source| RecognitionError::Spawn {
            command: self.command.clone(),
            source,
        };

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.languages])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RecognitionError::Failed("stdin unavailable".to_string()))?;

        let feed = async move {
            stdin.write_all(image).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(spawn_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::Failed(stderr.trim().to_string()));
        }
        fed.map_err(spawn_error)?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(
            bytes = image.len(),
            chars = text.chars().count(),
            "Recognized image text"
        );
        Ok(text)
    }
}

/// Rejects every recognition request.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRecognizer;

#[async_trait]
impl TextRecognizer for DisabledRecognizer {
    async fn recognize(&self, _image: &[u8]) -> Result<String, RecognitionError> {
        Err(RecognitionError::Disabled)
    }
}

/// Whether `file_name` has an image extension accepted for recognition.
#[must_use]
pub fn is_image_file(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Lowercased extension of `file_name`, if any.
#[must_use]
pub fn extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Tracks which users have a recognition running.
///
/// A second request from the same user while one is in flight is refused
/// rather than queued.
#[derive(Debug, Default)]
pub struct RecognitionTracker {
    active: Mutex<HashSet<Username>>,
}

impl RecognitionTracker {
    /// Mark `user` as recognizing. Returns `None` if a recognition for the
    /// same user is already running.
    pub fn try_begin(&self, user: &Username) -> Option<RecognitionSlot<'_>> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.insert(user.clone()).then(|| RecognitionSlot {
            tracker: self,
            user: user.clone(),
        })
    }
}

/// Held while a recognition runs; releases the user on drop.
#[derive(Debug)]
pub struct RecognitionSlot<'a> {
    tracker: &'a RecognitionTracker,
    user: Username,
}

impl Drop for RecognitionSlot<'_> {
    fn drop(&mut self) {
        self.tracker
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user);
    }
}
