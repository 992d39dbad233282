//! Session factory
//!
//! Opens sessions with the store's fixed policy: quorum consistency, the
//! process-wide query timeout and the simple retry policy. A failure to
//! connect is returned with the driver's message untouched.

use crate::cluster::ClusterConfig;
use crate::driver::{Connector, Session};
use crate::policy::PolicySession;
use crate::tunables;
use manipulate_core::{Error, Result};
use std::sync::Arc;
use tracing::{error, info};

/// Creates policy-enforcing sessions through a driver [`Connector`]
#[derive(Clone)]
pub struct SessionFactory {
    connector: Arc<dyn Connector>,
}

impl SessionFactory {
    /// Create a factory over a driver
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        SessionFactory { connector }
    }

    /// Open a session with the default cluster policy
    pub fn create_session(
        &self,
        servers: &[String],
        keyspace: &str,
        protocol_version: u8,
    ) -> Result<Arc<dyn Session>> {
        self.create_session_with(ClusterConfig::new(servers.to_vec(), keyspace, protocol_version))
    }

    /// Open a session with an explicit cluster configuration
    pub fn create_session_with(&self, config: ClusterConfig) -> Result<Arc<dyn Session>> {
        let native = self.connector.connect(&config).map_err(|e| {
            error!(
                target: "manipulate::session",
                servers = ?config.servers,
                keyspace = %config.keyspace,
                version = config.protocol_version,
                error = %e,
                "Cannot connect to the store"
            );
            Error::CannotConnect {
                servers: config.servers.clone(),
                keyspace: config.keyspace.clone(),
                reason: e.to_string(),
            }
        })?;

        tunables::mark_session_created();

        info!(
            target: "manipulate::session",
            servers = ?config.servers,
            keyspace = %config.keyspace,
            version = config.protocol_version,
            consistency = ?config.consistency,
            timeout_ms = config.timeout.as_millis() as u64,
            max_retries = config.retry.max_retries,
            "Session created"
        );

        Ok(Arc::new(PolicySession::new(native, config.retry)))
    }
}
