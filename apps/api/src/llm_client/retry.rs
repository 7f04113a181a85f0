//! Backoff retrier shared by every model call.
//!
//! Only rate-limit failures are retried. Anything else propagates on the first
//! attempt, untouched, so callers see the original error.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Attempt ceiling and base delay for one kind of call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay before the retry that follows failed attempt `attempt` (0-indexed):
    /// `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// The error shapes a rate-limit condition can hide behind.
///
/// Implementors expose whatever numeric fields they carry; the stringified
/// error (`Display`) is always inspected as well.
pub trait RateLimitSignal: Display {
    /// HTTP-style status, if the error carries one.
    fn status(&self) -> Option<u16> {
        None
    }

    /// Provider-specific numeric code, if the error carries one.
    fn code(&self) -> Option<i64> {
        None
    }

    /// Whether the message text comes from the provider. Local failures
    /// (decoding, parsing) return false so stray numbers in them are ignored.
    fn has_provider_message(&self) -> bool {
        true
    }
}

const RATE_LIMIT_STATUS: u16 = 429;
const RATE_LIMIT_PHRASES: &[&str] = &["quota", "resource_exhausted"];

/// The one classification rule for rate limiting: status 429, code 429, or a
/// message mentioning `quota`, `RESOURCE_EXHAUSTED` (case-insensitive) or `429`
/// as a standalone number.
pub fn is_rate_limit_signature(status: Option<u16>, code: Option<i64>, message: &str) -> bool {
    if status == Some(RATE_LIMIT_STATUS) || code == Some(i64::from(RATE_LIMIT_STATUS)) {
        return true;
    }
    let message = message.to_lowercase();
    RATE_LIMIT_PHRASES.iter().any(|p| message.contains(p))
        || message
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|token| token == "429")
}

pub fn is_rate_limited<E: RateLimitSignal + ?Sized>(error: &E) -> bool {
    let message = if error.has_provider_message() {
        error.to_string()
    } else {
        String::new()
    };
    is_rate_limit_signature(error.status(), error.code(), &message)
}

/// Runs `operation` until it succeeds, fails with a non-rate-limit error, or
/// `policy.max_attempts` attempts have been made (a ceiling of 0 counts as 1).
///
/// Sleeps `base_delay * 2^attempt` between rate-limited attempts. On exhaustion
/// the last observed error is returned unchanged.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RateLimitSignal,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 < max_attempts && is_rate_limited(&e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} rate limited (attempt {}/{}), retrying after {}ms: {}",
                    label,
                    attempt + 1,
                    max_attempts,
                    delay.as_millis(),
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
