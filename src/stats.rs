//! # RunCounters — outcome tallies
//!
//! ## Responsibility
//! Count classified codes per outcome across all checkers, and supply the
//! running total that progress lines print.
//!
//! ## Guarantees
//! - Lock-free: plain atomic increments, safe from any number of checkers
//! - [`RunCounters::record`] returns the post-increment total, so each
//!   classified code observes a unique "done" number
//!
//! ## NOT Responsible For
//! - Writing codes to outcome files (see: sink.rs)
//! - Per-checker statistics (see: worker.rs reports)

use crate::router::Outcome;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared outcome tallies for one run.
#[derive(Debug, Default)]
pub struct RunCounters {
    three_month: AtomicU64,
    one_month: AtomicU64,
    invalid: AtomicU64,
    used: AtomicU64,
    total: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Codes classified as 3-month promotions.
    pub three_month: u64,
    /// Codes classified as 1-month promotions.
    pub one_month: u64,
    /// Codes the service did not recognize.
    pub invalid: u64,
    /// Codes already fully redeemed.
    pub used: u64,
    /// All classified codes, unknowns included.
    pub total: u64,
}

impl CounterSnapshot {
    /// Codes that finished without a recognized outcome (exhausted retries
    /// or an unrecognized response shape). Derived, not stored.
    pub fn unknown(&self) -> u64 {
        self.total
            .saturating_sub(self.three_month + self.one_month + self.invalid + self.used)
    }
}

impl RunCounters {
    /// Fresh counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classified code.
    ///
    /// Persisted outcomes bump their category counter; [`Outcome::Unknown`]
    /// bumps only the total.
    ///
    /// # Returns
    ///
    /// The total after this record, i.e. how many codes have finished so
    /// far including this one.
    pub fn record(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::ThreeMonth => {
                self.three_month.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::OneMonth => {
                self.one_month.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Invalid => {
                self.invalid.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Used => {
                self.used.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Unknown => {}
        }
        self.total.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Copy the current tallies.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            three_month: self.three_month.load(Ordering::Relaxed),
            one_month: self.one_month.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            used: self.used.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
        }
    }
}
