//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `DIALER_HOST` - Bind address (default: 0.0.0.0)
//! - `DIALER_PORT` - Listen port, falls back to `PORT` (default: 3000)
//! - `DIALER_DATA_DIR` - Directory holding the JSON documents (default: data)
//! - `DIALER_BASE_URL` - Public URL; `https://` enables Secure cookies
//!   (default: <http://localhost:3000>)
//! - `DIALER_STATIC_DIR` - Directory of front-end files served at `/`
//! - `DIALER_OCR_COMMAND` - OCR executable, empty disables OCR (default: tesseract)
//! - `DIALER_OCR_LANGUAGES` - OCR language string (default: `chi_sim+eng`)
//! - `DIALER_MAX_UPLOAD_BYTES` - Request body limit for uploads (default: 10 MiB)
//! - `DIALER_LOG_FORMAT` - `json` or `text` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Flattened JSON events.
    Json,
}

/// OCR configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Executable to run, `None` when OCR is disabled.
    pub command: Option<String>,
    /// Language string passed with `-l`.
    pub languages: String,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the JSON documents
    pub data_dir: PathBuf,
    /// Public base URL
    pub base_url: String,
    /// Static front-end directory, if any
    pub static_dir: Option<PathBuf>,
    /// OCR settings
    pub ocr: OcrConfig,
    /// Upload body limit in bytes
    pub max_upload_bytes: usize,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("DIALER_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DIALER_HOST".to_string(), e.to_string()))?;
        let port = get_port()?;
        let data_dir = PathBuf::from(get_env_or_default("DIALER_DATA_DIR", "data"));
        let base_url = get_env_or_default("DIALER_BASE_URL", "http://localhost:3000");
        let static_dir = get_optional_env("DIALER_STATIC_DIR").map(PathBuf::from);

        let ocr_command = get_env_or_default("DIALER_OCR_COMMAND", "tesseract");
        let ocr = OcrConfig {
            command: Some(ocr_command.trim().to_owned()).filter(|c| !c.is_empty()),
            languages: get_env_or_default("DIALER_OCR_LANGUAGES", "chi_sim+eng"),
        };

        let max_upload_bytes = match get_optional_env("DIALER_MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                ConfigError::InvalidEnvVar("DIALER_MAX_UPLOAD_BYTES".to_string(), e.to_string())
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        let log_format = parse_log_format(&get_env_or_default("DIALER_LOG_FORMAT", "text"))?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            host,
            port,
            data_dir,
            base_url,
            static_dir,
            ocr,
            max_upload_bytes,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for a server rooted at `data_dir` with every other
    /// setting at its default and OCR disabled.
    #[must_use]
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            data_dir: data_dir.into(),
            base_url: "http://localhost:3000".to_string(),
            static_dir: None,
            ocr: OcrConfig {
                command: None,
                languages: "chi_sim+eng".to_string(),
            },
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must carry the Secure attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Listen port from `DIALER_PORT`, falling back to the generic `PORT` set by
/// most hosting platforms.
fn get_port() -> Result<u16, ConfigError> {
    let (key, raw) = match get_optional_env("DIALER_PORT") {
        Some(value) => ("DIALER_PORT", value),
        None => ("PORT", get_env_or_default("PORT", "3000")),
    };
    raw.parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_log_format(raw: &str) -> Result<LogFormat, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "text" | "" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(ConfigError::InvalidEnvVar(
            "DIALER_LOG_FORMAT".to_string(),
            format!("expected 'json' or 'text', got '{other}'"),
        )),
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
