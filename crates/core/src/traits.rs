//! Caller-facing operation surface
//!
//! Callers are written against these traits rather than a concrete store,
//! which is why operations a given store cannot support still appear here
//! and fail at run time with [`Error::NotImplemented`].
//!
//! [`Error::NotImplemented`]: crate::error::Error::NotImplemented

use crate::context::{Assignation, Context};
use crate::error::Result;
use crate::record::Record;
use crate::types::{Identity, TransactionId};

/// Storage-agnostic record manipulation
pub trait Manipulator {
    /// Persist new records, assigning each a fresh identifier
    fn create<R: Record>(&self, context: &Context, records: &mut [R]) -> Result<()>;

    /// Load each record by its primary key
    fn retrieve<R: Record>(&self, context: &Context, records: &mut [R]) -> Result<()>;

    /// Load every record of type `R` matching the context
    fn retrieve_many<R: Record>(&self, context: &Context) -> Result<Vec<R>>;

    /// Overwrite records by primary key
    fn update<R: Record>(&self, context: &Context, records: &[R]) -> Result<()>;

    /// Remove records by primary key
    fn delete<R: Record>(&self, context: &Context, records: &[R]) -> Result<()>;

    /// Remove every record matching the context
    fn delete_many(&self, context: &Context, identity: &Identity) -> Result<()>;

    /// Count records matching the context
    fn count(&self, context: &Context, identity: &Identity) -> Result<u64>;

    /// Add `delta` to a counter column of the rows selected by the context filter
    fn increment(&self, context: &Context, identity: &Identity, counter: &str, delta: i64) -> Result<()>;

    /// Bulk relationship assignation
    fn assign(&self, context: &Context, assignation: &Assignation) -> Result<()>;
}

/// Manipulator with named, deferred transactions
pub trait TransactionalManipulator: Manipulator {
    /// Execute every statement deferred under `id` as one batch
    fn commit(&self, id: &TransactionId) -> Result<()>;

    /// Discard the statements deferred under `id`; false if there were none
    fn abort(&self, id: &TransactionId) -> bool;
}
