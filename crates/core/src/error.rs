//! Error types for manipulate
//!
//! Every failure surfaced to callers of a manipulator is one of the variants
//! below. Lower layers (codec, builder, driver) keep their own error enums and
//! are mapped here at the engine boundary, because the same low-level failure
//! means different things depending on direction (a codec failure while
//! writing is a build error, while reading it is an unmarshal error).

use crate::types::TransactionId;
use thiserror::Error;

/// Result type alias for manipulate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types returned by manipulators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Codec or builder failed to produce a statement
    #[error("Cannot build query: {0}")]
    CannotBuildQuery(String),

    /// Store rejected or failed a statement or batch
    #[error("Cannot execute query: {0}")]
    CannotExecuteQuery(String),

    /// Commit-time execution failure
    #[error("Cannot commit: {0}")]
    CannotCommit(String),

    /// Zero rows where exactly one was expected (or more than one)
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Row-to-record decode failure
    #[error("Cannot unmarshal: {0}")]
    CannotUnmarshal(String),

    /// Commit referencing a token with no registered batch
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Operation deliberately unsupported by this manipulator
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Session could not be established
    #[error("Cannot connect to {servers:?} (keyspace {keyspace}): {reason}")]
    CannotConnect {
        /// Node addresses that were tried
        servers: Vec<String>,
        /// Keyspace the session was opened against
        keyspace: String,
        /// Driver error, verbatim
        reason: String,
    },

    /// Configuration rejected during validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
