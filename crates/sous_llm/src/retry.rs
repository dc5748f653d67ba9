//! Backoff between request attempts.

use std::time::Duration;

/// Base delay before the first retry.
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 500;

/// Upper bound for any single delay.
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 8;

/// Calculate the delay after a failed attempt.
///
/// Formula: `min(base * 2^(attempt - 1), max_backoff)`
///
/// # Arguments
///
/// * `attempt` - The attempt that just failed (1-based).
/// * `base_backoff_ms` - Delay in milliseconds after the first attempt.
/// * `max_backoff_secs` - Maximum delay in seconds.
#[must_use]
pub fn exponential_backoff(attempt: u32, base_backoff_ms: u64, max_backoff_secs: u64) -> Duration {
    let max_ms = max_backoff_secs.saturating_mul(1000);

    let exponent = attempt.saturating_sub(1).min(20);
    let delay_ms = base_backoff_ms.saturating_mul(1u64 << exponent);

    Duration::from_millis(delay_ms.min(max_ms))
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
