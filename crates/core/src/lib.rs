//! Core types and traits for manipulate
//!
//! This crate defines the vocabulary shared by every other crate:
//! - Value: dynamically typed column value
//! - Identity / TransactionId: record type names and transaction tokens
//! - Context: per-call options (transaction, filter, page, create hook)
//! - Record / Schema: static record descriptors
//! - codec: record <-> column conversion
//! - Statement / Batch: what builders produce and sessions execute
//! - Error: the error kinds surfaced to callers
//! - Manipulator / TransactionalManipulator: the operation surface

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod context;
pub mod error;
pub mod record;
pub mod statement;
pub mod traits;
pub mod types;
pub mod value;

pub use codec::{CodecError, CodecResult, Row};
pub use context::{
    AssignationType, Assignation, AttributeUpdate, Comparator, Context, CreateFinalizer, Filter,
    Pagination, Predicate,
};
pub use error::{Error, Result};
pub use record::{Field, Manipulable, Record, Schema};
pub use statement::{Batch, Statement};
pub use traits::{Manipulator, TransactionalManipulator};
pub use types::{Identity, TransactionId};
pub use value::{FromValue, Value};
