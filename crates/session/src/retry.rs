//! Query retry policy
//!
//! Sessions re-issue a request whose failure the driver reports as
//! retryable (timeouts, unavailable replicas) up to `max_retries` times.
//! The default matches a simple fixed-count policy: 10 retries, no delay.

use std::time::Duration;

/// Default number of retries per query
pub const DEFAULT_MAX_RETRIES: usize = 10;

/// Configuration for query retry behavior
///
/// # Example
/// ```
/// use manipulate_session::RetryPolicy;
///
/// let policy = RetryPolicy::new()
///     .with_max_retries(3)
///     .with_base_delay_ms(5)
///     .with_max_delay_ms(40);
/// assert_eq!(policy.max_retries, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (0 = no retries)
    pub max_retries: usize,
    /// Base delay between retries in milliseconds (exponential backoff)
    pub base_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }
}

impl RetryPolicy {
    /// Create a RetryPolicy with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a RetryPolicy with no retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Set maximum number of retries
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set base delay for exponential backoff
    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Set maximum delay between retries
    pub fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Whether another attempt is allowed after `retries_done` retries
    pub fn allows(&self, retries_done: usize) -> bool {
        retries_done < self.max_retries
    }

    /// Delay before retry number `attempt` (0-based)
    pub(crate) fn calculate_delay(&self, attempt: usize) -> Duration {
        // Cap the shift to prevent overflow (1 << 63 is the max for u64)
        let shift = attempt.min(63);
        let multiplier = 1u64 << shift;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier);
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}
