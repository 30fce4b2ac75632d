//! # Outcome routing — verdict classification
//!
//! ## Responsibility
//! Map the raw verdict of one remote lookup to an outcome category, or to
//! a requeue decision for rate-limited codes. This is the only place that
//! interprets response content.
//!
//! ## Guarantees
//! - Pure: no I/O, no state — identical verdicts always route identically
//! - Ordered: rules are checked in a fixed priority; overlapping conditions
//!   (e.g. a rate-limit message alongside usage fields) cannot produce two
//!   different results
//! - Presence-checked: every optional field is tested before use
//!
//! ## NOT Responsible For
//! - Performing the lookup (see: client.rs)
//! - Writing results (see: sink.rs)
//! - Counting results (see: stats.rs)

use crate::client::Verdict;
use std::fmt;

/// Message sent by the remote service when a request is rate limited.
///
/// Matched exactly; a rate-limited code is requeued, not classified.
pub const RATE_LIMITED_MESSAGE: &str = "The resource is being rate limited.";

/// Message sent by the remote service for a nonexistent code.
pub const UNKNOWN_CODE_MESSAGE: &str = "Unknown Gift Code";

/// Substring of the promotion header text that marks a 3-month promo.
pub const THREE_MONTH_MARKER: &str = "3 months";

/// Classification of one processed code.
///
/// Determines which sink receives the code. `Unknown` is never persisted —
/// it is logged and counted in the running total only.
///
/// # Panics
///
/// No methods on this type panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// A valid, unclaimed code carrying a 3-month promotion.
    ThreeMonth,
    /// A valid, unclaimed code carrying a 1-month promotion.
    OneMonth,
    /// The code does not exist.
    Invalid,
    /// The code exists but every use has been claimed.
    Used,
    /// The verdict shape was unrecognized or all lookup attempts failed.
    Unknown,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreeMonth => write!(f, "3-month"),
            Self::OneMonth => write!(f, "1-month"),
            Self::Invalid => write!(f, "invalid"),
            Self::Used => write!(f, "used"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl Outcome {
    /// Returns `true` if codes with this outcome are written to a sink.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// What the worker should do with a code after classification.
///
/// # Panics
///
/// No methods on this type panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// Return the code to the queue tail for a later retry.
    ///
    /// Nothing is written and nothing is counted — the code has not been
    /// consumed.
    Requeue,
    /// The code is classified; record it under the given outcome.
    Record(Outcome),
}

/// Route a verdict to an outcome or a requeue decision.
///
/// Rules are applied in order; the first match wins:
///
/// 1. rate-limited message → [`Routing::Requeue`]
/// 2. unknown-code message → [`Outcome::Invalid`]
/// 3. `uses` and `max_uses` both present and unequal →
///    [`Outcome::ThreeMonth`] if the promotion text contains the 3-month
///    marker, else [`Outcome::OneMonth`]
/// 4. `uses` and `max_uses` both present and equal → [`Outcome::Used`]
///    (including `0 == 0`)
/// 5. anything else, including failed lookups → [`Outcome::Unknown`]
///
/// # Panics
///
/// This function never panics.
///
/// # Example
///
/// ```rust
/// use promo_checker::client::{GiftCodeLookup, Verdict};
/// use promo_checker::router::{route, Outcome, Routing, UNKNOWN_CODE_MESSAGE};
///
/// let verdict = Verdict::Response(GiftCodeLookup {
///     message: Some(UNKNOWN_CODE_MESSAGE.to_string()),
///     ..GiftCodeLookup::default()
/// });
/// assert_eq!(route(&verdict), Routing::Record(Outcome::Invalid));
/// ```
pub fn route(verdict: &Verdict) -> Routing {
    let lookup = match verdict {
        Verdict::Response(lookup) => lookup,
        Verdict::Failed(_) => return Routing::Record(Outcome::Unknown),
    };

    if lookup.message.as_deref() == Some(RATE_LIMITED_MESSAGE) {
        return Routing::Requeue;
    }

    if lookup.message.as_deref() == Some(UNKNOWN_CODE_MESSAGE) {
        return Routing::Record(Outcome::Invalid);
    }

    match (lookup.uses, lookup.max_uses) {
        (Some(uses), Some(max_uses)) if uses != max_uses => {
            let promo_text = lookup
                .promotion
                .as_ref()
                .and_then(|p| p.inbound_header_text.as_deref())
                .unwrap_or("");
            if promo_text.contains(THREE_MONTH_MARKER) {
                Routing::Record(Outcome::ThreeMonth)
            } else {
                Routing::Record(Outcome::OneMonth)
            }
        }
        (Some(_), Some(_)) => Routing::Record(Outcome::Used),
        // One-sided or absent usage fields: not enough signal to classify.
        _ => Routing::Record(Outcome::Unknown),
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{GiftCodeLookup, PromotionInfo};

    fn response(lookup: GiftCodeLookup) -> Verdict {
        Verdict::Response(lookup)
    }

    fn with_message(message: &str) -> GiftCodeLookup {
        GiftCodeLookup {
            message: Some(message.to_string()),
            ..GiftCodeLookup::default()
        }
    }

    fn with_usage(uses: u64, max_uses: u64) -> GiftCodeLookup {
        GiftCodeLookup {
            uses: Some(uses),
            max_uses: Some(max_uses),
            ..GiftCodeLookup::default()
        }
    }

    fn with_promo(uses: u64, max_uses: u64, header: &str) -> GiftCodeLookup {
        GiftCodeLookup {
            uses: Some(uses),
            max_uses: Some(max_uses),
            promotion: Some(PromotionInfo {
                inbound_header_text: Some(header.to_string()),
            }),
            ..GiftCodeLookup::default()
        }
    }

    #[test]
    fn test_route_rate_limited_message_requeues() {
        let verdict = response(with_message(RATE_LIMITED_MESSAGE));
        assert_eq!(route(&verdict), Routing::Requeue);
    }

    #[test]
    fn test_route_unknown_code_message_is_invalid() {
        let verdict = response(with_message(UNKNOWN_CODE_MESSAGE));
        assert_eq!(route(&verdict), Routing::Record(Outcome::Invalid));
    }

    #[test]
    fn test_route_unequal_usage_with_marker_is_three_month() {
        let verdict = response(with_promo(3, 5, "Get 3 months of Nitro"));
        assert_eq!(route(&verdict), Routing::Record(Outcome::ThreeMonth));
    }

    #[test]
    fn test_route_unequal_usage_without_marker_is_one_month() {
        let verdict = response(with_promo(3, 5, "1 month of Nitro on us"));
        assert_eq!(route(&verdict), Routing::Record(Outcome::OneMonth));
    }

    #[test]
    fn test_route_unequal_usage_without_promo_is_one_month() {
        let verdict = response(with_usage(0, 1));
        assert_eq!(route(&verdict), Routing::Record(Outcome::OneMonth));
    }

    #[test]
    fn test_route_equal_usage_is_used() {
        let verdict = response(with_usage(5, 5));
        assert_eq!(route(&verdict), Routing::Record(Outcome::Used));
    }

    #[test]
    fn test_route_zero_equal_usage_is_used() {
        // Equality branch must fire even when both counts are zero.
        let verdict = response(with_usage(0, 0));
        assert_eq!(route(&verdict), Routing::Record(Outcome::Used));
    }

    #[test]
    fn test_route_failed_lookup_is_unknown() {
        let verdict = Verdict::Failed("attempt 1: timeout; attempt 2: timeout".to_string());
        assert_eq!(route(&verdict), Routing::Record(Outcome::Unknown));
    }

    #[test]
    fn test_route_empty_response_is_unknown() {
        let verdict = response(GiftCodeLookup::default());
        assert_eq!(route(&verdict), Routing::Record(Outcome::Unknown));
    }

    #[test]
    fn test_route_one_sided_usage_is_unknown() {
        let only_uses = response(GiftCodeLookup {
            uses: Some(3),
            ..GiftCodeLookup::default()
        });
        assert_eq!(route(&only_uses), Routing::Record(Outcome::Unknown));

        let only_max = response(GiftCodeLookup {
            max_uses: Some(5),
            ..GiftCodeLookup::default()
        });
        assert_eq!(route(&only_max), Routing::Record(Outcome::Unknown));
    }

    #[test]
    fn test_route_unrecognized_message_is_unknown() {
        let verdict = response(with_message("You are being rate limited"));
        assert_eq!(route(&verdict), Routing::Record(Outcome::Unknown));
    }

    #[test]
    fn test_route_rate_limit_wins_over_usage_fields() {
        // Pathological overlap: rate-limit message plus usage fields.
        // Rule 1 must win.
        let verdict = response(GiftCodeLookup {
            message: Some(RATE_LIMITED_MESSAGE.to_string()),
            uses: Some(3),
            max_uses: Some(5),
            ..GiftCodeLookup::default()
        });
        assert_eq!(route(&verdict), Routing::Requeue);
    }

    #[test]
    fn test_route_unknown_code_wins_over_usage_fields() {
        let verdict = response(GiftCodeLookup {
            message: Some(UNKNOWN_CODE_MESSAGE.to_string()),
            uses: Some(5),
            max_uses: Some(5),
            ..GiftCodeLookup::default()
        });
        assert_eq!(route(&verdict), Routing::Record(Outcome::Invalid));
    }

    #[test]
    fn test_route_is_deterministic() {
        let verdict = response(with_promo(1, 5, "Get 3 months of Nitro"));
        let first = route(&verdict);
        let second = route(&verdict);
        assert_eq!(first, second);
    }

    #[test]
    fn test_route_is_idempotent_for_terminal_outcomes() {
        // Re-running an already-classified verdict yields the same outcome:
        // the router holds no state.
        let used = response(with_usage(2, 2));
        let invalid = response(with_message(UNKNOWN_CODE_MESSAGE));
        for _ in 0..3 {
            assert_eq!(route(&used), Routing::Record(Outcome::Used));
            assert_eq!(route(&invalid), Routing::Record(Outcome::Invalid));
        }
    }

    #[test]
    fn test_route_marker_match_is_case_sensitive() {
        let verdict = response(with_promo(1, 5, "Get 3 Months of Nitro"));
        assert_eq!(route(&verdict), Routing::Record(Outcome::OneMonth));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::ThreeMonth.to_string(), "3-month");
        assert_eq!(Outcome::OneMonth.to_string(), "1-month");
        assert_eq!(Outcome::Invalid.to_string(), "invalid");
        assert_eq!(Outcome::Used.to_string(), "used");
        assert_eq!(Outcome::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_outcome_is_persisted() {
        assert!(Outcome::ThreeMonth.is_persisted());
        assert!(Outcome::OneMonth.is_persisted());
        assert!(Outcome::Invalid.is_persisted());
        assert!(Outcome::Used.is_persisted());
        assert!(!Outcome::Unknown.is_persisted());
    }
}
