//! # Sink — per-outcome result files
//!
//! ## Responsibility
//! Own the four outcome files, prepend the record prefix to every code, and
//! keep concurrent appends from interleaving.
//!
//! ## Guarantees
//! - Files are created fresh (truncated) at the start of every run
//! - One record is one whole line: the write happens under the sink's lock
//!   and is flushed before the lock is released
//! - Missing parent directories are created on the way in
//!
//! ## NOT Responsible For
//! - Choosing WHICH sink a code belongs in (see: router.rs)
//! - Counting outcomes (see: stats.rs)

use crate::router::Outcome;
use crate::CheckerError;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// File name for codes carrying the 3-month promotion.
pub const THREE_MONTH_FILE: &str = "3month.txt";
/// File name for codes carrying any other promotion.
pub const ONE_MONTH_FILE: &str = "1month.txt";
/// File name for codes the service does not recognize.
pub const INVALID_FILE: &str = "invalid.txt";
/// File name for fully redeemed codes.
pub const USED_FILE: &str = "used.txt";

/// One append-only outcome file.
///
/// Clone-free: share via [`std::sync::Arc`] (usually through [`SinkSet`]).
#[derive(Debug)]
pub struct Sink {
    path: PathBuf,
    prefix: String,
    /// Guarded writer; each record is written and flushed under this lock.
    file: Mutex<File>,
}

impl Sink {
    /// Create (and truncate) the sink file, making parent directories as
    /// needed.
    ///
    /// # Arguments
    ///
    /// * `path` — Destination file
    /// * `prefix` — Fixed string prepended to every appended code
    ///
    /// # Returns
    ///
    /// - `Ok(Sink)` once the file is open
    /// - `Err(CheckerError::Io)` if the directory or file cannot be created
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub async fn create(path: PathBuf, prefix: &str) -> Result<Self, CheckerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let file = File::create(&path).await?;
        Ok(Self {
            path,
            prefix: prefix.to_string(),
            file: Mutex::new(file),
        })
    }

    /// Append one code as a prefixed, newline-terminated record.
    ///
    /// The lock is held for the write and flush only, and is released on
    /// error paths too.
    pub async fn append(&self, code: &str) -> Result<(), CheckerError> {
        let line = format!("{}{}\n", self.prefix, code);
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Where this sink writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The four outcome sinks of a run, keyed by [`Outcome`].
#[derive(Debug)]
pub struct SinkSet {
    three_month: Sink,
    one_month: Sink,
    invalid: Sink,
    used: Sink,
}

impl SinkSet {
    /// Create all four sink files under `output_dir`, truncating leftovers
    /// from a previous run.
    ///
    /// # Panics
    ///
    /// This function never panics.
    pub async fn create(output_dir: &Path, prefix: &str) -> Result<Self, CheckerError> {
        Ok(Self {
            three_month: Sink::create(output_dir.join(THREE_MONTH_FILE), prefix).await?,
            one_month: Sink::create(output_dir.join(ONE_MONTH_FILE), prefix).await?,
            invalid: Sink::create(output_dir.join(INVALID_FILE), prefix).await?,
            used: Sink::create(output_dir.join(USED_FILE), prefix).await?,
        })
    }

    /// The sink an outcome is persisted to, or `None` for
    /// [`Outcome::Unknown`], which is never written anywhere.
    pub fn sink_for(&self, outcome: Outcome) -> Option<&Sink> {
        match outcome {
            Outcome::ThreeMonth => Some(&self.three_month),
            Outcome::OneMonth => Some(&self.one_month),
            Outcome::Invalid => Some(&self.invalid),
            Outcome::Used => Some(&self.used),
            Outcome::Unknown => None,
        }
    }
}
