// shoebox/src/retry.rs

//! Bounded retry with exponential backoff around fallible async operations.
//!
//! The executor keeps no state between invocations. Only failures that report
//! themselves as [`Retryable`] consume the retry budget; anything else is
//! returned to the caller on its first occurrence.

use std::future::Future;
use std::time::Duration;
use tracing::{event, Level};

/// Implemented by error types that can tell a transient failure from a permanent one.
pub trait Retryable {
  fn is_retryable(&self) -> bool;
}

/// Returns true when a message or code carries a timeout, termination or
/// connection-loss signature.
pub fn has_transient_signature(message: &str, code: Option<&str>) -> bool {
  if let Some(code) = code {
    if code.to_ascii_uppercase().contains("TIME") {
      return true;
    }
  }
  let message = message.to_ascii_lowercase();
  ["timeout", "timed out", "terminated", "connection"]
    .iter()
    .any(|needle| message.contains(needle))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total number of invocations, first attempt included. Zero behaves like one.
  pub max_attempts: u32,
  /// Wait before the second attempt; doubled for every further attempt.
  pub initial_delay: Duration,
  /// Optional ceiling on a single wait. `None` lets the backoff grow without bound.
  pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 5,
      initial_delay: Duration::from_millis(2000),
      max_delay: None,
    }
  }
}

impl RetryPolicy {
  pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
    Self {
      max_attempts,
      initial_delay,
      max_delay: None,
    }
  }

  /// Fewer attempts with a longer base delay, giving the database more time to recover.
  pub fn patient() -> Self {
    Self::new(3, Duration::from_millis(3000))
  }

  pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
    self.max_delay = Some(max_delay);
    self
  }

  /// Wait after the failed `attempt` (1-indexed): `initial_delay * 2^(attempt - 1)`.
  pub fn delay_for(&self, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    let delay = self.initial_delay.saturating_mul(factor);
    match self.max_delay {
      Some(cap) => delay.min(cap),
      None => delay,
    }
  }

  fn attempts(&self) -> u32 {
    self.max_attempts.max(1)
  }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or the
/// attempt budget of `policy` is spent. The last observed error is returned.
pub async fn run_with_retry<T, E, F, Fut>(policy: &RetryPolicy, operation_name: &str, mut operation: F) -> Result<T, E>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, E>>,
  E: Retryable + std::fmt::Display,
{
  let max_attempts = policy.attempts();
  let mut attempt = 1;
  loop {
    match operation().await {
      Ok(value) => {
        if attempt > 1 {
          event!(Level::INFO, operation = operation_name, attempt, "Operation succeeded after retry.");
        }
        return Ok(value);
      }
      Err(err) => {
        event!(
          Level::WARN,
          operation = operation_name,
          attempt,
          max_attempts,
          error = %err,
          "Operation failed."
        );
        if !err.is_retryable() {
          event!(Level::DEBUG, operation = operation_name, "Failure is not retryable.");
          return Err(err);
        }
        if attempt >= max_attempts {
          event!(Level::ERROR, operation = operation_name, attempts = attempt, "Retry budget exhausted.");
          return Err(err);
        }
        let backoff = policy.delay_for(attempt);
        event!(
          Level::INFO,
          operation = operation_name,
          backoff_ms = backoff.as_millis() as u64,
          "Retrying after backoff."
        );
        tokio::time::sleep(backoff).await;
        attempt += 1;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signature_matches_message_and_code() {
    assert!(has_transient_signature("Connection terminated unexpectedly", None));
    assert!(has_transient_signature("query timeout", None));
    assert!(has_transient_signature("pool timed out while waiting for an open connection", None));
    assert!(has_transient_signature("boom", Some("ETIMEDOUT")));
    assert!(!has_transient_signature("duplicate key value violates unique constraint", Some("23505")));
  }

  #[test]
  fn delay_doubles_and_respects_cap() {
    let policy = RetryPolicy::new(5, Duration::from_millis(100));
    assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    assert_eq!(policy.delay_for(4), Duration::from_millis(800));

    let capped = policy.with_max_delay(Duration::from_millis(250));
    assert_eq!(capped.delay_for(4), Duration::from_millis(250));
  }

  #[test]
  fn delay_saturates_for_large_attempts() {
    let policy = RetryPolicy::new(100, Duration::from_secs(1));
    assert_eq!(policy.delay_for(64), Duration::from_secs(1).saturating_mul(u32::MAX));
  }
}
