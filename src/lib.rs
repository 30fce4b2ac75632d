//! # promo-checker
//!
//! A concurrent batch verifier for promo gift codes over Tokio.
//!
//! ## Architecture
//!
//! A fixed fleet of checker tasks pulls codes from a shared queue, rotates
//! through a proxy pool, and appends each code to the output file for its
//! classification:
//!
//! ```text
//! codes.txt ───► CodeQueue ──► checker-0 ─┐
//!                              checker-1 ─┼─► GiftClient ─► route() ─► SinkSet
//! proxies.txt ─► ProxyRing ──► checker-N ─┘        │                  RunCounters
//!                                            retry + backoff
//! ```
//!
//! Rate-limited codes are returned to the tail of the queue and retried
//! later; the run ends when every code has been classified exactly once.

// ── Lint policy ───────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(missing_docs)]

use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub mod client;
pub mod config;
pub mod input;
pub mod proxy;
pub mod queue;
pub mod router;
pub mod sink;
pub mod stats;
pub mod worker;

// Re-exports for convenience
pub use client::{Classifier, GiftClient, GiftCodeLookup, StaticClassifier, Verdict};
pub use config::CheckerConfig;
pub use proxy::{Proxy, ProxyRing};
pub use queue::CodeQueue;
pub use router::{route, Outcome, Routing};
pub use sink::{Sink, SinkSet};
pub use stats::RunCounters;
pub use worker::{await_checkers, spawn_checkers, CheckerContext, CheckerHandle, WorkerReport};

/// Initialise the global tracing subscriber.
///
/// Reads the `LOG_FORMAT` environment variable to choose output format:
/// - `"json"` — structured JSON output for production log aggregators
/// - anything else (including unset) — human-readable pretty output
///   for local development
///
/// Filter level is controlled by `RUST_LOG` (e.g. `RUST_LOG=info`).
///
/// # Errors
///
/// Returns [`CheckerError::Other`] if the global subscriber has already
/// been set (e.g. by a previous call or a test harness).
///
/// # Panics
///
/// This function never panics.
pub fn init_tracing() -> Result<(), CheckerError> {
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let result = match format.as_str() {
        "json" => tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .with_current_span(true)
            .with_span_list(true)
            .try_init(),
        _ => tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init(),
    };

    result.map_err(|e| CheckerError::Other(format!("tracing init failed: {e}")))
}

/// Top-level checker errors.
///
/// All variants implement `std::error::Error` via [`thiserror`].
/// Every variant has at least one test that triggers it.
///
/// # Panics
///
/// No methods on this type panic.
#[derive(Error, Debug)]
pub enum CheckerError {
    /// An input file (codes, proxies, or config) does not exist.
    #[error("input file not found: {}", path.display())]
    InputFileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Filesystem I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed as valid TOML.
    #[error("config parse error in {file}: {source}")]
    ConfigParse {
        /// Path of the file that failed to parse.
        file: String,
        /// Underlying TOML deserialization error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A proxy line could not be turned into a usable endpoint.
    #[error("invalid proxy endpoint '{endpoint}': {reason}")]
    InvalidProxy {
        /// The raw proxy line as read from the input file.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client for a proxy could not be constructed.
    #[error("http client build failed: {0}")]
    ClientBuild(String),

    /// The proxy list is empty — the run must not start.
    #[error("no proxies loaded")]
    NoProxies,

    /// The code list is empty — the run must not start.
    #[error("no codes loaded")]
    NoCodes,

    /// Catch-all for errors that do not fit a specific variant.
    #[error("{0}")]
    Other(String),
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_input_file_not_found() {
        let err = CheckerError::InputFileNotFound {
            path: PathBuf::from("codes.txt"),
        };
        assert!(err.to_string().contains("codes.txt"));
    }

    #[test]
    fn test_error_display_io() {
        let err = CheckerError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_display_config_parse() {
        let source = toml::from_str::<toml::Value>("not = = toml").unwrap_err();
        let err = CheckerError::ConfigParse {
            file: "checker.toml".to_string(),
            source,
        };
        assert!(err.to_string().contains("checker.toml"));
    }

    #[test]
    fn test_error_display_invalid_config() {
        let err = CheckerError::InvalidConfig("workers must be > 0".to_string());
        assert!(err.to_string().contains("workers must be > 0"));
    }

    #[test]
    fn test_error_display_invalid_proxy() {
        let err = CheckerError::InvalidProxy {
            endpoint: "not a url".to_string(),
            reason: "invalid authority".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("not a url"));
        assert!(msg.contains("invalid authority"));
    }

    #[test]
    fn test_error_display_client_build() {
        let err = CheckerError::ClientBuild("tls backend unavailable".to_string());
        assert!(err.to_string().contains("tls backend unavailable"));
    }

    #[test]
    fn test_error_display_no_proxies() {
        let err = CheckerError::NoProxies;
        assert!(err.to_string().contains("no proxies loaded"));
    }

    #[test]
    fn test_error_display_no_codes() {
        let err = CheckerError::NoCodes;
        assert!(err.to_string().contains("no codes loaded"));
    }

    #[test]
    fn test_error_display_other() {
        let err = CheckerError::Other("something else".to_string());
        assert_eq!(err.to_string(), "something else");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: CheckerError = io_err.into();
        assert!(matches!(err, CheckerError::Io(_)));
    }

    #[test]
    fn test_error_debug_format() {
        let err = CheckerError::NoCodes;
        let debug = format!("{:?}", err);
        assert!(debug.contains("NoCodes"));
    }

    #[test]
    fn test_init_tracing_second_call_returns_err() {
        // First call may succeed or fail depending on test execution order
        // (another test may have already installed a subscriber).
        let _ = init_tracing();
        // Second call must not panic — it should return Err.
        let result = init_tracing();
        assert!(result.is_err(), "double init must return Err, not panic");
    }
}
