//! Store driver boundary
//!
//! The network driver is not part of this workspace. Anything that can turn
//! a [`ClusterConfig`] into a [`Session`] can back a manipulator: a real CQL
//! driver adapter in production, [`MemorySession`] in tests.
//!
//! [`ClusterConfig`]: crate::cluster::ClusterConfig
//! [`MemorySession`]: crate::testing::MemorySession

use crate::cluster::ClusterConfig;
use manipulate_core::{Batch, Row, Statement, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for driver calls
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Errors reported by a driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// No node could be reached
    #[error("no hosts available: {0}")]
    NoHosts(String),

    /// The request did not complete within the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Not enough replicas alive for the requested consistency
    #[error("cannot achieve consistency: {0}")]
    Unavailable(String),

    /// The store rejected the statement (syntax, unknown table, bad types)
    #[error("invalid query: {0}")]
    Invalid(String),

    /// Reading or closing the result cursor failed
    #[error("cursor error: {0}")]
    Cursor(String),
}

impl DriverError {
    /// True when re-issuing the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, DriverError::Timeout(_) | DriverError::Unavailable(_))
    }
}

/// Rows returned by a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    /// Wrap rows
    pub fn new(rows: Vec<Row>) -> Self {
        ResultSet { rows }
    }

    /// A single row holding a single `count` column, as returned by `COUNT(*)`
    pub fn count(n: i64) -> Self {
        let mut row = Row::new();
        row.insert("count".to_string(), Value::Int(n));
        ResultSet { rows: vec![row] }
    }

    /// Take the rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no row was returned
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Scan the first row as a single integer
    ///
    /// Reads the `count` column if present, otherwise the row's only column.
    /// Returns `None` when there is no row, no such column, or it is not an
    /// integer.
    pub fn scan_int(&self) -> Option<i64> {
        let row = self.rows.first()?;
        let value = match row.get("count") {
            Some(v) => v,
            None if row.len() == 1 => row.values().next()?,
            None => return None,
        };
        value.as_int()
    }
}

/// A live connection to the store
///
/// Implementations must be safe to share between threads.
pub trait Session: Send + Sync {
    /// Run one parameterized statement and collect its rows
    fn query(&self, statement: &Statement) -> DriverResult<ResultSet>;

    /// Run one parameterized statement, discarding any rows
    fn execute(&self, statement: &Statement) -> DriverResult<()>;

    /// Run every statement of `batch` as a single request
    fn execute_batch(&self, batch: &Batch) -> DriverResult<()>;
}

/// Creates sessions from a cluster configuration
pub trait Connector: Send + Sync {
    /// Connect to the cluster; no partial session is ever returned
    fn connect(&self, config: &ClusterConfig) -> DriverResult<Arc<dyn Session>>;
}
