//! Cluster connection parameters

use crate::retry::RetryPolicy;
use crate::tunables;
use std::time::Duration;

/// Default native protocol version
pub const DEFAULT_PROTOCOL_VERSION: u8 = 4;

/// Read / write consistency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consistency {
    /// One replica
    One,
    /// Majority of replicas
    #[default]
    Quorum,
    /// Majority of replicas in the local datacenter
    LocalQuorum,
    /// Every replica
    All,
}

/// Everything a [`Connector`] needs to open a session
///
/// [`Connector`]: crate::driver::Connector
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    /// Node addresses (`host:port`)
    pub servers: Vec<String>,
    /// Keyspace every statement runs in
    pub keyspace: String,
    /// Native protocol version
    pub protocol_version: u8,
    /// Consistency level applied to every statement
    pub consistency: Consistency,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry policy for retryable failures
    pub retry: RetryPolicy,
}

impl ClusterConfig {
    /// Quorum consistency, the process-wide query timeout and the default
    /// retry policy
    pub fn new(servers: Vec<String>, keyspace: impl Into<String>, protocol_version: u8) -> Self {
        ClusterConfig {
            servers,
            keyspace: keyspace.into(),
            protocol_version,
            consistency: Consistency::Quorum,
            timeout: tunables::default_query_timeout(),
            retry: RetryPolicy::default(),
        }
    }

    /// Same cluster, with the extended timeout used for table creation and
    /// removal
    pub fn for_schema_operations(&self) -> Self {
        ClusterConfig {
            timeout: tunables::default_extended_timeout(),
            ..self.clone()
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
