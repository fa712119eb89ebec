//! Bounded readiness polling for asynchronously provisioned ledgers.
//!
//! A freshly created ledger is not usable until the control plane reports it
//! ACTIVE. [`ReadinessPoller`] queries the state up to a fixed number of
//! attempts with a fixed delay in between, and reports the last observed
//! state either way — exhausting the budget is an outcome for the caller to
//! judge, not an error.

use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;

use crate::ledger::{LedgerApiError, LedgerControl, LedgerState};

/// Result of one polling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollOutcome {
    /// State observed on the final query.
    pub final_state: LedgerState,
    /// Number of queries issued, including the final one.
    pub attempts_used: u32,
    /// True when the attempt budget ran out before the target state.
    pub timed_out: bool,
}

/// Polls a ledger's state until it matches a target, with a bounded number
/// of attempts and a fixed inter-attempt delay.
///
/// The poller only observes; it never mutates the ledger, never retries a
/// failed query, and holds no state across calls.
#[derive(Debug, Clone)]
pub struct ReadinessPoller {
    max_attempts: u32,
    delay: Duration,
}

impl ReadinessPoller {
    /// A poller with the given attempt budget and inter-attempt delay.
    /// The budget is clamped to at least one attempt.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Query the ledger's state until it equals `target` or the attempt
    /// budget is exhausted.
    ///
    /// For a budget of N this issues at most N queries and sleeps at most
    /// N−1 times: the bound is checked before the sleep, so the poller never
    /// waits after its final query. A query failure propagates immediately.
    pub async fn wait_for(
        &self,
        control: &impl LedgerControl,
        name: &str,
        target: LedgerState,
    ) -> Result<PollOutcome, LedgerApiError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let desc = control.describe(name).await?;
            tracing::info!(
                ledger = name,
                attempt = attempts,
                max_attempts = self.max_attempts,
                state = %desc.state,
                "readiness poll"
            );

            if desc.state == target {
                return Ok(PollOutcome {
                    final_state: desc.state,
                    attempts_used: attempts,
                    timed_out: false,
                });
            }
            if attempts >= self.max_attempts {
                tracing::warn!(
                    ledger = name,
                    attempts,
                    last_state = %desc.state,
                    "readiness poll exhausted attempt budget"
                );
                return Ok(PollOutcome {
                    final_state: desc.state,
                    attempts_used: attempts,
                    timed_out: true,
                });
            }
            sleep(self.delay).await;
        }
    }
}
