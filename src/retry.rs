//! Bounded retry with exponential backoff for remote calls.

use std::future::Future;

use thiserror::Error;
use tokio::time::Duration;

use crate::error::RemoteError;

const SNIPPET_LEN: usize = 120;

pub const EXHAUSTED_MESSAGE: &str =
    "\u{1f6a6} Too many requests right now. Please try again later.";

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Upper bound for a single attempt. A timed out attempt is not retried.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            attempt_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RetryError {
    #[error("still rate limited after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error(transparent)]
    Failed(RemoteError),
}

impl RetryError {
    /// Text safe to show the end user. Remote detail is cut to a short
    /// snippet; the full error is logged where it happens.
    pub fn user_message(&self) -> String {
        match self {
            RetryError::Exhausted { .. } => EXHAUSTED_MESSAGE.to_string(),
            RetryError::Failed(RemoteError::RateLimited) => EXHAUSTED_MESSAGE.to_string(),
            RetryError::Failed(RemoteError::Unauthorized) => {
                "\u{1f511} The remote service rejected our credentials. Please tell the bot owner."
                    .to_string()
            }
            RetryError::Failed(RemoteError::InvalidRequest(_)) => {
                "\u{26a0}\u{fe0f} That request couldn't be processed. Try rephrasing it."
                    .to_string()
            }
            RetryError::Failed(RemoteError::Other(detail)) => format!(
                "\u{1f635} Something went wrong. Try again later.\n({})",
                snippet(detail)
            ),
        }
    }
}

fn snippet(detail: &str) -> String {
    let mut chars = detail.chars();
    let head: String = chars.by_ref().take(SNIPPET_LEN).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub fn backoff_for_attempt(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// Runs `operation` up to `policy.max_attempts` times. Only
/// `RemoteError::RateLimited` is retried, after sleeping `2^attempt` seconds.
pub async fn call_with_retry<F, Fut>(
    mut operation: F,
    policy: &RetryPolicy,
) -> Result<String, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, RemoteError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 0..max_attempts {
        let outcome = match tokio::time::timeout(policy.attempt_timeout, operation()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RemoteError::Other(format!(
                "request timed out after {}s",
                policy.attempt_timeout.as_secs()
            ))),
        };

        match outcome {
            Ok(text) => {
                if attempt > 0 {
                    tracing::info!(attempt, "Remote call succeeded after retry");
                }
                return Ok(text);
            }
            Err(e) if e.is_retryable() => {
                if attempt + 1 < max_attempts {
                    let delay = backoff_for_attempt(attempt);
                    tracing::warn!(
                        attempt,
                        delay_secs = delay.as_secs(),
                        "Remote call rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "Remote call failed");
                return Err(RetryError::Failed(e));
            }
        }
    }

    tracing::warn!(attempts = max_attempts, "Remote call retries exhausted");
    Err(RetryError::Exhausted {
        attempts: max_attempts,
    })
}
