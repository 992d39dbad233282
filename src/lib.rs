//! manipulate - Transactional batch manipulation of typed records
//!
//! Records are created, retrieved, updated, deleted, counted and
//! incremented in a column-family store. Writes tagged with a transaction
//! token accumulate in a pending batch until the token is committed or
//! aborted; untagged writes execute at once as one batch.
//!
//! # Quick Start
//!
//! ```ignore
//! use manipulate::{Context, CqlManipulator, Manipulator, TransactionalManipulator};
//!
//! let manipulator = CqlManipulator::connect(connector, &ManipulatorConfig::from_file(path)?)?;
//!
//! let ctx = Context::new().with_transaction("t1");
//! manipulator.create(&ctx, &mut users)?;
//! manipulator.update(&ctx, &accounts)?;
//! manipulator.commit(&"t1".into())?;
//! ```
//!
//! # Architecture
//!
//! - `manipulate-core`: records, context, errors, the manipulator traits
//! - `manipulate-cql`: statement builders
//! - `manipulate-session`: session factory, retry policy, configuration
//! - `manipulate-engine`: the transaction registry and [`CqlManipulator`]

pub use manipulate_core::*;
pub use manipulate_engine::{CqlManipulator, Staged, TransactionMetrics, TransactionRegistry};
pub use manipulate_session::{
    ClusterConfig, Connector, Consistency, DriverError, ManipulatorConfig, ResultSet, RetryPolicy,
    Session, SessionFactory,
};

/// Statement builders
pub mod cql {
    pub use manipulate_cql::*;
}

/// In-memory session for tests
pub mod testing {
    pub use manipulate_session::testing::*;
}
