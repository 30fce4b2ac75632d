//! # CodeQueue — shared work cursor
//!
//! ## Responsibility
//! Hand each pending code to exactly one checker, accept rate-limited codes
//! back for a later revisit, and expose the drain condition the checkers use
//! to decide when the run is over.
//!
//! ## Guarantees
//! - Each code position is taken at most once (single cursor under one lock)
//! - Requeued codes land at the tail, behind every still-pending code
//! - [`CodeQueue::is_drained`] only reports `true` once nothing is pending
//!   AND nothing is in flight, so a checker never exits while a peer might
//!   still requeue work
//!
//! ## NOT Responsible For
//! - Deciding WHICH codes get requeued (see: router.rs)
//! - Normalizing or deduplicating codes (see: input.rs)

use tokio::sync::Mutex;

/// Mutable queue state, guarded by one mutex so the cursor and the
/// in-flight count always move together.
#[derive(Debug)]
struct QueueState {
    /// All codes, in arrival order; requeued codes are appended.
    codes: Vec<String>,
    /// Index of the next code to hand out. Never decreases.
    position: usize,
    /// Codes currently held by a checker (taken, not yet completed or
    /// requeued).
    in_flight: usize,
}

/// Snapshot of queue progress for summaries and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSummary {
    /// Codes not yet handed to any checker.
    pub pending: usize,
    /// Codes currently held by a checker.
    pub in_flight: usize,
    /// Total codes handed out so far, requeued revisits included.
    pub taken: usize,
}

/// Work queue shared by every checker in a run.
///
/// Wrap in an [`std::sync::Arc`] and clone the handle per checker.
#[derive(Debug)]
pub struct CodeQueue {
    state: Mutex<QueueState>,
    /// Length of the original code list, before any requeues.
    initial_len: usize,
}

impl CodeQueue {
    /// Build a queue over the given codes.
    ///
    /// An empty list is accepted; callers that require work should check
    /// before constructing. The queue starts fully pending with nothing in
    /// flight.
    pub fn new(codes: Vec<String>) -> Self {
        let initial_len = codes.len();
        Self {
            state: Mutex::new(QueueState {
                codes,
                position: 0,
                in_flight: 0,
            }),
            initial_len,
        }
    }

    /// Take the next pending code, marking it in flight.
    ///
    /// # Returns
    ///
    /// - `Some(code)` when a pending code exists
    /// - `None` when the cursor has passed the end; the caller must then
    ///   consult [`CodeQueue::is_drained`] before exiting, because a peer
    ///   may still requeue
    pub async fn take(&self) -> Option<String> {
        let mut state = self.state.lock().await;
        if state.position >= state.codes.len() {
            return None;
        }
        let code = state.codes[state.position].clone();
        state.position += 1;
        state.in_flight += 1;
        Some(code)
    }

    /// Return a rate-limited code for a later revisit.
    ///
    /// The code goes to the tail, so every still-pending code is tried
    /// first. Clears the taker's in-flight mark.
    pub async fn requeue(&self, code: String) {
        let mut state = self.state.lock().await;
        state.codes.push(code);
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// Mark one taken code as finished (classified and recorded, or given
    /// up on). Clears the taker's in-flight mark.
    pub async fn complete(&self) {
        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// Whether the run is over: no pending codes and none in flight.
    pub async fn is_drained(&self) -> bool {
        let state = self.state.lock().await;
        state.position >= state.codes.len() && state.in_flight == 0
    }

    /// Length of the original code list. Requeues do not change this, so it
    /// serves as the fixed denominator in progress output.
    pub fn initial_len(&self) -> usize {
        self.initial_len
    }

    /// Current progress snapshot.
    pub async fn summary(&self) -> QueueSummary {
        let state = self.state.lock().await;
        QueueSummary {
            pending: state.codes.len() - state.position,
            in_flight: state.in_flight,
            taken: state.position,
        }
    }
}
