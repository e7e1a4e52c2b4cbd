//! Per-call deadline and cancellation.
//!
//! A `CallContext` is threaded through every generation call. `run` races
//! the backend future against the deadline and the cancel signal; the
//! losing future is dropped, which aborts any in-flight HTTP request.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::LlmError;

/// Deadline and cancellation signal for one call.
///
/// Cheap to clone; clones share the same cancel signal.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every `CallContext` derived from it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CallContext {
    /// A context with no deadline that can never be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Limit the call to `timeout` from now. A timeout too large to
    /// represent as an instant leaves the context without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Limit the call to an absolute deadline. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Attach a fresh cancel signal and return its handle.
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle { tx })
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the cancel signal has already fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |rx| *rx.borrow())
    }

    /// Drive `fut` to completion unless cancelled or past the deadline.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, LlmError> {
        let started = Instant::now();

        tokio::select! {
            biased;

            _ = self.cancelled() => Err(LlmError::Cancelled),
            _ = sleep_until_opt(self.deadline) => Err(LlmError::DeadlineExceeded {
                after: started.elapsed(),
            }),
            out = fut => Ok(out),
        }
    }

    /// Resolves once cancelled; never resolves without a cancel signal.
    async fn cancelled(&self) {
        match &self.cancel {
            Some(rx) => {
                let mut rx = rx.clone();
                let fired = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
                if fired.is_err() {
                    // Handle dropped without cancelling.
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
