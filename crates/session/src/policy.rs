//! Session wrapper enforcing the retry policy

use crate::driver::{DriverResult, ResultSet, Session};
use crate::retry::RetryPolicy;
use manipulate_core::{Batch, Statement};
use std::sync::Arc;
use tracing::warn;

/// Session that re-issues retryable failures according to a [`RetryPolicy`]
///
/// Non-retryable failures and the last retryable failure are returned
/// unchanged.
///
/// A timed-out request may still have been applied, and it is re-issued as
/// is: batches of counter updates are not idempotent and can be applied
/// more than once.
pub struct PolicySession {
    inner: Arc<dyn Session>,
    retry: RetryPolicy,
}

impl PolicySession {
    /// Wrap a driver session
    pub fn new(inner: Arc<dyn Session>, retry: RetryPolicy) -> Self {
        PolicySession { inner, retry }
    }

    fn with_retry<T>(&self, what: &'static str, mut op: impl FnMut() -> DriverResult<T>) -> DriverResult<T> {
        let mut retries = 0;
        loop {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && self.retry.allows(retries) => {
                    warn!(
                        target: "manipulate::session",
                        request = what,
                        retry = retries + 1,
                        max_retries = self.retry.max_retries,
                        error = %e,
                        "Retrying request"
                    );
                    let delay = self.retry.calculate_delay(retries);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    retries += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Session for PolicySession {
    fn query(&self, statement: &Statement) -> DriverResult<ResultSet> {
        self.with_retry("query", || self.inner.query(statement))
    }

    fn execute(&self, statement: &Statement) -> DriverResult<()> {
        self.with_retry("execute", || self.inner.execute(statement))
    }

    fn execute_batch(&self, batch: &Batch) -> DriverResult<()> {
        self.with_retry("batch", || self.inner.execute_batch(batch))
    }
}
