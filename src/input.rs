//! # Input loading — line files and code normalization
//!
//! ## Responsibility
//! Read line-oriented input files (proxy endpoints, raw codes) into
//! deduplicated, order-preserving string lists, and reduce raw code tokens
//! to their canonical slug before they enter the work queue.
//!
//! ## Guarantees
//! - Deduplicated: first occurrence wins, later duplicates are dropped
//! - Bounded: at most [`MAX_LINES`] unique lines are kept from any file
//! - Normalized: codes keep only the alphanumeric slug after the last `/`
//!
//! ## NOT Responsible For
//! - Proxy endpoint parsing (see: proxy.rs)
//! - Work distribution (see: queue.rs)

use crate::CheckerError;
use std::collections::HashSet;
use std::path::Path;

/// Hard cap on unique lines read from a single input file.
pub const MAX_LINES: usize = 16_777_216;

/// Read a text file into a deduplicated, order-preserving list of lines.
///
/// Lines are trimmed; blank lines are skipped; the first occurrence of a
/// duplicate wins. Reading stops once [`MAX_LINES`] unique lines are kept.
///
/// # Arguments
///
/// * `path` — Path to the input file
///
/// # Returns
///
/// - `Ok(Vec<String>)` with the unique, trimmed lines in file order
/// - `Err(CheckerError::InputFileNotFound)` if the file does not exist
/// - `Err(CheckerError::Io)` on any other read failure
///
/// # Panics
///
/// This function never panics.
pub fn read_lines(path: &Path) -> Result<Vec<String>, CheckerError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CheckerError::InputFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CheckerError::Io(e)
        }
    })?;

    let mut seen = HashSet::new();
    let mut lines = Vec::new();
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if lines.len() >= MAX_LINES {
            break;
        }
        if seen.insert(line.to_string()) {
            lines.push(line.to_string());
        }
    }

    Ok(lines)
}

/// Reduce a raw code token to its canonical slug.
///
/// Takes the segment after the last `/` (so pasted full URLs like
/// `https://promos.discord.gg/AbC123` work), then strips every character
/// that is not ASCII alphanumeric. The result may be empty — callers drop
/// empty slugs.
///
/// # Example
///
/// ```rust
/// use promo_checker::input::normalize_code;
/// assert_eq!(normalize_code("https://promos.discord.gg/AbC123"), "AbC123");
/// assert_eq!(normalize_code("  ab-c1 "), "abc1");
/// ```
pub fn normalize_code(raw: &str) -> String {
    let slug = raw.rsplit('/').next().unwrap_or(raw);
    slug.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Load and normalize the code list from a file.
///
/// Reads via [`read_lines`], normalizes each line via [`normalize_code`],
/// drops slugs that normalize to empty, and deduplicates again — distinct
/// raw lines can normalize to the same slug.
///
/// # Arguments
///
/// * `path` — Path to the codes file
///
/// # Returns
///
/// - `Ok(Vec<String>)` with the unique normalized codes in file order
/// - `Err(CheckerError)` as for [`read_lines`]
///
/// # Panics
///
/// This function never panics.
pub fn load_codes(path: &Path) -> Result<Vec<String>, CheckerError> {
    let mut seen = HashSet::new();
    let mut codes = Vec::new();
    for line in read_lines(path)? {
        let code = normalize_code(&line);
        if code.is_empty() {
            continue;
        }
        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }
    Ok(codes)
}
