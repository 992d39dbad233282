//! Process-wide timeout tunables
//!
//! The per-query timeout and the extended (schema operation) timeout are
//! read when a [`ClusterConfig`] is built. Override them once at start-up,
//! before the first session is created; changing them later only affects
//! sessions created afterwards.
//!
//! [`ClusterConfig`]: crate::cluster::ClusterConfig

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;

/// Default per-query timeout
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(600);

/// Default timeout for table creation and removal
pub const DEFAULT_EXTENDED_TIMEOUT: Duration = Duration::from_secs(20);

static QUERY_TIMEOUT: Lazy<RwLock<Duration>> = Lazy::new(|| RwLock::new(DEFAULT_QUERY_TIMEOUT));

static EXTENDED_TIMEOUT: Lazy<RwLock<Duration>> =
    Lazy::new(|| RwLock::new(DEFAULT_EXTENDED_TIMEOUT));

static SESSION_CREATED: AtomicBool = AtomicBool::new(false);

/// Current default per-query timeout
pub fn default_query_timeout() -> Duration {
    *QUERY_TIMEOUT.read()
}

/// Current default extended timeout
pub fn default_extended_timeout() -> Duration {
    *EXTENDED_TIMEOUT.read()
}

/// Override the default per-query timeout
pub fn set_default_query_timeout(timeout: Duration) {
    warn_if_late("query", timeout);
    *QUERY_TIMEOUT.write() = timeout;
}

/// Override the default extended timeout
pub fn set_default_extended_timeout(timeout: Duration) {
    warn_if_late("extended", timeout);
    *EXTENDED_TIMEOUT.write() = timeout;
}

pub(crate) fn mark_session_created() {
    SESSION_CREATED.store(true, Ordering::Relaxed);
}

fn warn_if_late(which: &str, timeout: Duration) {
    if SESSION_CREATED.load(Ordering::Relaxed) {
        warn!(
            target: "manipulate::session",
            which,
            timeout_ms = timeout.as_millis() as u64,
            "Timeout changed after a session was created; existing sessions keep their timeout"
        );
    }
}
