//! Classifier abstraction and implementations
//!
//! Provides the Classifier trait and two implementations:
//! - GiftClient: real HTTP lookups through a supplied proxy, with retries
//! - StaticClassifier: scripted verdicts for tests and dry runs
//!
//! The HTTP status of a lookup is never consulted. The service answers with
//! a meaningful JSON body on error statuses too, so the decoded body alone
//! determines the outcome (see: router.rs). Only transport and decode
//! failures count as failed attempts.

use crate::config::CheckerConfig;
use crate::proxy::Proxy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Promotion details attached to a recognized code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionInfo {
    /// Human-readable promotion header, e.g. `"3 months of premium"`.
    #[serde(default)]
    pub inbound_header_text: Option<String>,
}

/// Decoded lookup response.
///
/// Every field is optional because the service returns different shapes for
/// recognized codes, unknown codes, and rate limits. Unrecognized fields in
/// the body are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCodeLookup {
    /// Sentinel message carried by error-shaped responses.
    #[serde(default)]
    pub message: Option<String>,
    /// How many times the code has been redeemed.
    #[serde(default)]
    pub uses: Option<u64>,
    /// How many redemptions the code allows in total.
    #[serde(default)]
    pub max_uses: Option<u64>,
    /// Promotion details, present on recognized codes.
    #[serde(default)]
    pub promotion: Option<PromotionInfo>,
}

/// Terminal result of classifying one code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The service answered with a decodable body, whatever the HTTP status.
    Response(GiftCodeLookup),
    /// Every attempt failed at the transport or decode layer; the string
    /// aggregates the per-attempt reasons.
    Failed(String),
}

/// Trait for code classifiers
///
/// Implementations must be thread-safe (Send + Sync) for use across tasks.
/// The trait is object-safe to allow dynamic dispatch via Arc<dyn Classifier>.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Look up `code` through `proxy` and produce a verdict.
    ///
    /// Never returns an error: failures are absorbed into
    /// [`Verdict::Failed`] so the caller always has something to route.
    async fn classify(&self, proxy: &Proxy, code: &str) -> Verdict;
}

// ============================================================================
// Gift Client (HTTP)
// ============================================================================

/// HTTP classifier for the gift-code lookup endpoint.
///
/// Stateless apart from its policy: the HTTP client itself travels with the
/// [`Proxy`] handed to each call, so one `GiftClient` serves every checker.
///
/// ## Example
///
/// ```no_run
/// use promo_checker::{CheckerConfig, GiftClient};
/// use std::sync::Arc;
///
/// let client = Arc::new(GiftClient::new(&CheckerConfig::default()));
/// ```
pub struct GiftClient {
    base_url: String,
    attempts: usize,
    backoff: Duration,
}

impl GiftClient {
    /// Create a classifier with the run's endpoint and retry policy.
    pub fn new(config: &CheckerConfig) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            attempts: config.retry_attempts,
            backoff: config.backoff(),
        }
    }

    /// One lookup attempt: GET the code's URL and decode the body.
    async fn attempt(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<GiftCodeLookup, reqwest::Error> {
        // No error_for_status here: error bodies are valid answers.
        client.get(url).send().await?.json::<GiftCodeLookup>().await
    }
}

#[async_trait]
impl Classifier for GiftClient {
    async fn classify(&self, proxy: &Proxy, code: &str) -> Verdict {
        let url = format!("{}/{}", self.base_url, code);
        let mut failures = Vec::with_capacity(self.attempts);

        for attempt in 1..=self.attempts {
            debug!(code = %code, proxy = %proxy, attempt, "lookup attempt");
            match self.attempt(proxy.client(), &url).await {
                Ok(lookup) => return Verdict::Response(lookup),
                Err(e) => {
                    warn!(
                        code = %code,
                        proxy = %proxy,
                        attempt,
                        error = %e,
                        "lookup attempt failed"
                    );
                    failures.push(format!("attempt {attempt}: {e}"));
                }
            }
            if attempt < self.attempts {
                tokio::time::sleep(self.backoff).await;
            }
        }

        Verdict::Failed(format!(
            "all {} attempts failed: {}",
            self.attempts,
            failures.join("; ")
        ))
    }
}

// ============================================================================
// Static Classifier (Testing)
// ============================================================================

/// Scripted classifier for tests and dry runs.
///
/// Each code carries a queue of verdicts; every `classify` call pops the
/// next one, so a code can be scripted to rate-limit once and then resolve.
/// Calls for an unscripted (or exhausted) code return [`Verdict::Failed`].
#[derive(Debug)]
pub struct StaticClassifier {
    scripts: Mutex<HashMap<String, VecDeque<Verdict>>>,
    /// Simulated lookup latency.
    delay: Duration,
}

impl StaticClassifier {
    /// Empty classifier: every call fails until scripts are added.
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            delay: Duration::ZERO,
        }
    }

    /// Empty classifier that sleeps before answering each call.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Append one verdict to a code's script. Builder-style, call before
    /// the classifier is shared.
    pub fn script(mut self, code: &str, verdict: Verdict) -> Self {
        self.scripts
            .get_mut()
            .entry(code.to_string())
            .or_default()
            .push_back(verdict);
        self
    }
}

impl Default for StaticClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for StaticClassifier {
    async fn classify(&self, _proxy: &Proxy, code: &str) -> Verdict {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut scripts = self.scripts.lock().await;
        match scripts.get_mut(code).and_then(VecDeque::pop_front) {
            Some(verdict) => verdict,
            None => Verdict::Failed(format!("no scripted verdict for code {code}")),
        }
    }
}
