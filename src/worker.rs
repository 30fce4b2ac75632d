//! # Checker fleet — spawning and the per-checker loop
//!
//! ## Responsibility
//! Run N checkers, each looping take-classify-route-record until the queue
//! drains, and collect one report per checker at the end.
//!
//! ## Guarantees
//! - Concurrent: checkers run in parallel tokio tasks
//! - Complete: no checker exits while a code might still be requeued
//! - Observable: every classified code logs its outcome and run progress
//!
//! ## NOT Responsible For
//! - Claiming semantics (see: queue.rs)
//! - Outcome rules (see: router.rs)
//! - File writes (see: sink.rs)

use crate::client::{Classifier, Verdict};
use crate::proxy::ProxyRing;
use crate::queue::CodeQueue;
use crate::router::{route, Outcome, Routing};
use crate::sink::SinkSet;
use crate::stats::RunCounters;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Everything a checker needs, cloned once per spawned task.
///
/// # Panics
///
/// No methods on this type panic.
#[derive(Clone)]
pub struct CheckerContext {
    /// Shared work queue.
    pub queue: Arc<CodeQueue>,
    /// Rotating proxy pool.
    pub ring: Arc<ProxyRing>,
    /// Classifier performing the lookups.
    pub classifier: Arc<dyn Classifier>,
    /// Outcome files.
    pub sinks: Arc<SinkSet>,
    /// Shared outcome tallies.
    pub counters: Arc<RunCounters>,
    /// How long to wait before re-polling an empty-but-undrained queue.
    pub poll_interval: Duration,
}

/// Handle to a running checker.
///
/// # Panics
///
/// No methods on this type panic.
pub struct CheckerHandle {
    /// Unique identifier for this checker.
    pub checker_id: String,
    /// Join handle for the checker's tokio task.
    pub join_handle: JoinHandle<WorkerReport>,
}

/// Statistics for one finished checker.
///
/// # Panics
///
/// No methods on this type panic.
#[derive(Debug, Clone, Default)]
pub struct WorkerReport {
    /// Checker identifier.
    pub checker_id: String,
    /// Codes this checker classified to a terminal outcome.
    pub processed: usize,
    /// Codes that landed in the 3-month or 1-month sinks.
    pub hits: usize,
    /// Rate-limited lookups returned to the queue for a later revisit.
    pub deferrals: usize,
}

/// The main loop for a single checker.
///
/// Takes codes until the queue reports drained, classifying each through
/// the next proxy in rotation, routing the verdict, and recording the
/// outcome. Rate-limited codes go back to the queue and count as
/// deferrals, not processed codes.
///
/// # Arguments
///
/// * `ctx` — Shared run state
/// * `checker_id` — The checker's identifier for logging
///
/// # Panics
///
/// This function never panics.
pub async fn checker_loop(ctx: CheckerContext, checker_id: String) -> WorkerReport {
    let mut report = WorkerReport {
        checker_id: checker_id.clone(),
        ..Default::default()
    };
    let total = ctx.queue.initial_len();

    loop {
        let code = match ctx.queue.take().await {
            Some(code) => code,
            None => {
                if ctx.queue.is_drained().await {
                    tracing::info!(checker = %checker_id, "queue drained, shutting down");
                    break;
                }
                // Nothing pending, but an in-flight code may yet be
                // requeued by a peer.
                tokio::time::sleep(ctx.poll_interval).await;
                continue;
            }
        };

        let proxy = ctx.ring.next();
        let verdict = ctx.classifier.classify(proxy, &code).await;

        match route(&verdict) {
            Routing::Requeue => {
                tracing::warn!(
                    checker = %checker_id,
                    code = %code,
                    proxy = %proxy,
                    "rate limited, requeueing for a later revisit"
                );
                ctx.queue.requeue(code).await;
                report.deferrals += 1;
            }
            Routing::Record(outcome) => {
                if let Some(sink) = ctx.sinks.sink_for(outcome) {
                    if let Err(e) = sink.append(&code).await {
                        tracing::error!(
                            checker = %checker_id,
                            code = %code,
                            outcome = %outcome,
                            error = %e,
                            "failed to record code"
                        );
                    }
                } else if let Verdict::Failed(reason) = &verdict {
                    tracing::error!(
                        checker = %checker_id,
                        code = %code,
                        reason = %reason,
                        "code exhausted all lookup attempts"
                    );
                } else {
                    tracing::warn!(
                        checker = %checker_id,
                        code = %code,
                        "response shape not recognized, code not recorded"
                    );
                }

                let done = ctx.counters.record(outcome);
                ctx.queue.complete().await;
                report.processed += 1;
                if matches!(outcome, Outcome::ThreeMonth | Outcome::OneMonth) {
                    report.hits += 1;
                }

                tracing::info!(
                    checker = %checker_id,
                    code = %code,
                    outcome = %outcome,
                    done,
                    total,
                    "code classified"
                );
            }
        }
    }

    report
}

/// Spawn `requested` checkers over the shared context.
///
/// More checkers than codes would only idle-poll, so the count is clamped
/// to the queue's initial length (with a warning when that bites).
///
/// # Arguments
///
/// * `ctx` — Shared run state, cloned per checker
/// * `requested` — Desired checker count, at least 1
///
/// # Returns
///
/// A vector of `CheckerHandle`, one per spawned checker.
///
/// # Panics
///
/// This function never panics.
pub fn spawn_checkers(ctx: &CheckerContext, requested: usize) -> Vec<CheckerHandle> {
    let mut count = requested.max(1);
    let codes = ctx.queue.initial_len();
    if codes > 0 && count > codes {
        tracing::warn!(
            requested = count,
            codes,
            "more checkers than codes, clamping"
        );
        count = codes;
    }

    let mut handles = Vec::with_capacity(count);
    for i in 0..count {
        let checker_id = format!("checker-{i}");
        let ctx_clone = ctx.clone();
        let id_clone = checker_id.clone();

        let join_handle = tokio::spawn(async move { checker_loop(ctx_clone, id_clone).await });

        handles.push(CheckerHandle {
            checker_id,
            join_handle,
        });
    }

    handles
}

/// Wait for every checker to finish and collect the reports.
///
/// A panicked or aborted checker contributes a default (all-zero) report
/// so the summary still lines up one report per spawned checker.
///
/// # Arguments
///
/// * `handles` — The handles from `spawn_checkers`
///
/// # Returns
///
/// A vector of `WorkerReport`, one per checker.
///
/// # Panics
///
/// This function never panics.
pub async fn await_checkers(handles: Vec<CheckerHandle>) -> Vec<WorkerReport> {
    let mut reports = Vec::with_capacity(handles.len());

    for handle in handles {
        match handle.join_handle.await {
            Ok(report) => {
                tracing::info!(
                    checker = %report.checker_id,
                    processed = report.processed,
                    hits = report.hits,
                    deferrals = report.deferrals,
                    "checker finished"
                );
                reports.push(report);
            }
            Err(e) if e.is_panic() => {
                tracing::error!(
                    checker = %handle.checker_id,
                    error = %e,
                    "checker panicked"
                );
                reports.push(WorkerReport {
                    checker_id: handle.checker_id,
                    ..Default::default()
                });
            }
            Err(e) => {
                tracing::error!(
                    checker = %handle.checker_id,
                    error = %e,
                    "checker task aborted"
                );
                reports.push(WorkerReport {
                    checker_id: handle.checker_id,
                    ..Default::default()
                });
            }
        }
    }

    reports
}
