//! Status Poller
//!
//! Repeatedly fetches a resource until it reaches a terminal state or a
//! wall-clock budget runs out. Running out of time is not an error: the
//! poller hands back whatever it saw last and lets the status check decide
//! the verdict.
//!
//! Fetch errors are returned as-is on the first occurrence; callers decide
//! whether an error is a domain outcome or an unexpected failure.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Timing knobs for a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptions {
    /// Hard wall-clock budget for the whole poll
    pub timeout: Duration,
    /// Fixed delay between fetches
    pub poll_interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(2000),
        }
    }
}

/// What a poll ended with.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome<T> {
    /// Last value fetched; `None` only if no fetch completed within the budget
    pub value: Option<T>,
    /// Whether `value` satisfied the terminal predicate
    pub reached_terminal: bool,
    /// Number of completed fetches
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Fixed-interval poller bounded by a wall-clock timeout.
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    options: PollOptions,
}

impl StatusPoller {
    pub fn new(options: PollOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Fetch until `is_terminal` holds or the timeout elapses.
    ///
    /// A fetch still in flight when the budget expires is abandoned and the
    /// previously fetched value is returned.
    pub async fn wait_for_terminal<T, E, F, Fut, P>(
        &self,
        mut fetch: F,
        is_terminal: P,
    ) -> Result<PollOutcome<T>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&T) -> bool,
    {
        let started = Instant::now();
        // An unrepresentable deadline means the poll is effectively unbounded.
        let deadline = started.checked_add(self.options.timeout);
        let mut last = None;
        let mut attempts = 0u32;

        loop {
            let remaining = remaining_until(deadline);
            if remaining.is_zero() {
                break;
            }

            let value = match tokio::time::timeout(remaining, fetch()).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::debug!(attempts, "Poll budget expired during fetch");
                    break;
                }
            };
            attempts += 1;

            if is_terminal(&value) {
                return Ok(PollOutcome {
                    value: Some(value),
                    reached_terminal: true,
                    attempts,
                    elapsed: started.elapsed(),
                });
            }
            last = Some(value);

            let remaining = remaining_until(deadline);
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(self.options.poll_interval.min(remaining)).await;
        }

        tracing::debug!(
            attempts,
            timeout_ms = self.options.timeout.as_millis() as u64,
            "Resource did not reach a terminal state before timeout"
        );

        Ok(PollOutcome {
            value: last,
            reached_terminal: false,
            attempts,
            elapsed: started.elapsed(),
        })
    }
}

fn remaining_until(deadline: Option<Instant>) -> Duration {
    match deadline {
        Some(deadline) => deadline.saturating_duration_since(Instant::now()),
        None => Duration::MAX,
    }
}
