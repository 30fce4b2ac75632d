//! # CheckerConfig — run configuration
//!
//! ## Responsibility
//! Define configuration for a checker run: input/output paths, the remote
//! lookup endpoint, worker count, and the retry/timeout policy. Load it
//! from a TOML file and validate it before the run starts.
//!
//! ## Guarantees
//! - Validated: all fields are bounds-checked before use
//! - Defaulted: every field has a sensible default
//! - Serializable: round-trips through serde (TOML ↔ Rust)
//! - I/O errors and parse errors are distinguished in the error type
//!
//! ## NOT Responsible For
//! - Reading the proxy/code lists themselves (see: input.rs)
//! - Interactive collection of the worker count (see: the binary)

use crate::CheckerError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Configuration for one checker run.
///
/// # Fields
///
/// * `proxies_file` — Path to the proxy list (default: `proxies.txt`)
/// * `codes_file` — Path to the code list (default: `codes.txt`)
/// * `output_dir` — Directory for the outcome files (default: `output`)
/// * `record_prefix` — Fixed prefix prepended to every written record
/// * `api_base_url` — Base URL of the remote lookup endpoint
/// * `workers` — Default checker count when not prompted (default: 1)
/// * `retry_attempts` — Lookup attempts per code before giving up (default: 3)
/// * `backoff_ms` — Wait between failed attempts (default: 2000)
/// * `request_timeout_ms` — Whole-request timeout per attempt (default: 5000)
/// * `connect_timeout_ms` — Connect timeout per attempt (default: 5000)
/// * `poll_interval_ms` — Queue re-poll interval while codes are in flight
///   elsewhere (default: 250)
///
/// # Example
///
/// ```rust
/// use promo_checker::config::CheckerConfig;
/// let config = CheckerConfig::default();
/// assert_eq!(config.retry_attempts, 3);
/// ```
///
/// # Panics
///
/// No methods on this type panic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CheckerConfig {
    /// Path to the proxy list file (one endpoint per line).
    #[serde(default = "default_proxies_file")]
    pub proxies_file: PathBuf,

    /// Path to the code list file (one code or pasted URL per line).
    #[serde(default = "default_codes_file")]
    pub codes_file: PathBuf,

    /// Directory the outcome files are created in.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Fixed prefix prepended to every record written to a sink.
    #[serde(default = "default_record_prefix")]
    pub record_prefix: String,

    /// Base URL of the remote lookup endpoint; the code is appended as the
    /// final path segment.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Default number of checkers when the operator is not prompted.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Lookup attempts per code before the verdict is a terminal failure.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    /// Milliseconds to wait between failed lookup attempts.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Whole-request timeout per attempt, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Connect timeout per attempt, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Milliseconds a checker waits before re-polling an apparently empty
    /// queue while other checkers still hold codes in flight.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            proxies_file: default_proxies_file(),
            codes_file: default_codes_file(),
            output_dir: default_output_dir(),
            record_prefix: default_record_prefix(),
            api_base_url: default_api_base_url(),
            workers: default_workers(),
            retry_attempts: default_retry_attempts(),
            backoff_ms: default_backoff_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl CheckerConfig {
    /// Load a configuration from a TOML file and validate it.
    ///
    /// # Arguments
    ///
    /// * `path` — Path to the TOML configuration file
    ///
    /// # Returns
    ///
    /// - `Ok(CheckerConfig)` if the file is readable, well-formed, and valid
    /// - `Err(CheckerError::InputFileNotFound)` if the file does not exist
    /// - `Err(CheckerError::Io)` on any other read failure
    /// - `Err(CheckerError::ConfigParse)` if the TOML is malformed
    /// - `Err(CheckerError::InvalidConfig)` if semantic constraints fail
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn from_file(path: &Path) -> Result<Self, CheckerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CheckerError::InputFileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CheckerError::Io(e)
            }
        })?;

        Self::from_str(&content, &path.display().to_string())
    }

    /// Load a configuration from a TOML string and validate it.
    ///
    /// Useful for testing or embedding configs without file I/O.
    ///
    /// # Arguments
    ///
    /// * `content` — TOML content
    /// * `source_name` — Identifier for the source (used in error messages)
    ///
    /// # Returns
    ///
    /// - `Ok(CheckerConfig)` if the TOML is well-formed and valid
    /// - `Err(CheckerError::ConfigParse)` if the TOML is malformed
    /// - `Err(CheckerError::InvalidConfig)` if semantic constraints fail
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn from_str(content: &str, source_name: &str) -> Result<Self, CheckerError> {
        let config: Self = toml::from_str(content).map_err(|e| CheckerError::ConfigParse {
            file: source_name.to_string(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, collecting every violation.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if all fields are valid
    /// - `Err(CheckerError::InvalidConfig)` with all messages joined by `"; "`
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn validate(&self) -> Result<(), CheckerError> {
        let mut errors = Vec::new();

        if self.workers == 0 {
            errors.push("workers must be > 0".to_string());
        }
        if self.workers > 1024 {
            errors.push("workers must be <= 1024".to_string());
        }
        if self.retry_attempts == 0 {
            errors.push("retry_attempts must be > 0".to_string());
        }
        if self.retry_attempts > 10 {
            errors.push("retry_attempts must be <= 10".to_string());
        }
        if self.backoff_ms > 60_000 {
            errors.push("backoff_ms must be <= 60000".to_string());
        }
        if self.request_timeout_ms == 0 {
            errors.push("request_timeout_ms must be > 0".to_string());
        }
        if self.connect_timeout_ms == 0 {
            errors.push("connect_timeout_ms must be > 0".to_string());
        }
        if self.poll_interval_ms == 0 {
            errors.push("poll_interval_ms must be > 0".to_string());
        }
        if Url::parse(&self.api_base_url).is_err() {
            errors.push(format!("api_base_url is not a valid URL: {}", self.api_base_url));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CheckerError::InvalidConfig(errors.join("; ")))
        }
    }

    /// Return the inter-attempt backoff as a [`Duration`].
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Return the whole-request timeout as a [`Duration`].
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Return the connect timeout as a [`Duration`].
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Return the queue re-poll interval as a [`Duration`].
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Export the configuration JSON schema as a pretty-printed string.
///
/// # Returns
///
/// - `Ok(String)` with the JSON schema
/// - `Err(serde_json::Error)` if serialization fails
///
/// # Panics
///
/// This function never panics.
pub fn export_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(CheckerConfig);
    serde_json::to_string_pretty(&schema)
}

/// Default proxies file: `proxies.txt`.
fn default_proxies_file() -> PathBuf {
    PathBuf::from("proxies.txt")
}

/// Default codes file: `codes.txt`.
fn default_codes_file() -> PathBuf {
    PathBuf::from("codes.txt")
}

/// Default output directory: `output`.
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Default record prefix: the public claim URL.
fn default_record_prefix() -> String {
    "https://promos.discord.gg/".to_string()
}

/// Default lookup endpoint.
fn default_api_base_url() -> String {
    "https://discord.com/api/v9/entitlements/gift-codes".to_string()
}

/// Default worker count: 1.
fn default_workers() -> usize {
    1
}

/// Default lookup attempts per code: 3.
fn default_retry_attempts() -> usize {
    3
}

/// Default inter-attempt backoff: 2000 ms.
fn default_backoff_ms() -> u64 {
    2000
}

/// Default whole-request timeout: 5000 ms.
fn default_request_timeout_ms() -> u64 {
    5000
}

/// Default connect timeout: 5000 ms.
fn default_connect_timeout_ms() -> u64 {
    5000
}

/// Default queue re-poll interval: 250 ms.
fn default_poll_interval_ms() -> u64 {
    250
}
