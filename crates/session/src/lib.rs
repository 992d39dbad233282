//! Store sessions for manipulate
//!
//! This crate owns the boundary with the store driver and the policy every
//! session runs under:
//! - Connector / Session: the driver-facing traits
//! - ClusterConfig: servers, keyspace, protocol version, consistency,
//!   timeout, retry policy
//! - SessionFactory: opens policy-enforcing sessions
//! - tunables: process-wide default timeouts
//! - ManipulatorConfig: `manipulate.toml`
//! - testing: in-memory recording session (feature `testing`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cluster;
pub mod config;
pub mod driver;
pub mod factory;
pub mod policy;
pub mod retry;
pub mod tunables;

#[cfg(feature = "testing")]
pub mod testing;

pub use cluster::{ClusterConfig, Consistency, DEFAULT_PROTOCOL_VERSION};
pub use config::{ManipulatorConfig, CONFIG_FILE_NAME};
pub use driver::{Connector, DriverError, DriverResult, ResultSet, Session};
pub use factory::SessionFactory;
pub use policy::PolicySession;
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
pub use tunables::{
    default_extended_timeout, default_query_timeout, set_default_extended_timeout,
    set_default_query_timeout, DEFAULT_EXTENDED_TIMEOUT, DEFAULT_QUERY_TIMEOUT,
};
