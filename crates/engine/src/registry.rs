//! Transaction registry
//!
//! Maps a transaction token to the batch of statements deferred under it.
//! One mutex guards the whole map. Fetching (or creating) a token's batch
//! and appending to it happen under the same lock acquisition, so
//! concurrent writers under one token never lose or duplicate a statement.
//! Statements are built before the lock is taken.
//!
//! The registry is owned by its manipulator; two manipulators never share
//! pending batches.

use manipulate_core::{Batch, Statement, TransactionId};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Where freshly built statements ended up
#[derive(Debug, Clone, PartialEq)]
pub enum Staged {
    /// No transaction: the statements form a new, unregistered batch that
    /// the caller must execute now
    Immediate(Batch),
    /// Appended to the token's registered batch
    Deferred {
        /// Statements now pending under the token
        pending: usize,
        /// True if this call registered the token
        opened: bool,
    },
}

/// Token to pending batch map
#[derive(Debug, Default)]
pub struct TransactionRegistry {
    batches: Mutex<HashMap<TransactionId, Batch>>,
}

impl TransactionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Route statements to the batch for `id`
    ///
    /// An empty token yields a brand-new unregistered batch. Otherwise the
    /// statements are appended to the token's registered batch, which is
    /// created on first use.
    pub fn batch_for(&self, id: &TransactionId, statements: Vec<Statement>) -> Staged {
        if id.is_none() {
            return Staged::Immediate(statements.into_iter().collect());
        }

        let mut batches = self.batches.lock();
        let opened = !batches.contains_key(id);
        let batch = batches.entry(id.clone()).or_default();
        batch.extend(statements);
        Staged::Deferred {
            pending: batch.len(),
            opened,
        }
    }

    /// Register `batch` under `id`, returning the batch it replaces
    pub fn register(&self, id: TransactionId, batch: Batch) -> Option<Batch> {
        self.batches.lock().insert(id, batch)
    }

    /// Remove and return the batch registered under `id`
    pub fn unregister(&self, id: &TransactionId) -> Option<Batch> {
        self.batches.lock().remove(id)
    }

    /// Copy of the batch registered under `id`
    pub fn lookup(&self, id: &TransactionId) -> Option<Batch> {
        self.batches.lock().get(id).cloned()
    }

    /// Whether `id` has a registered batch
    pub fn contains(&self, id: &TransactionId) -> bool {
        self.batches.lock().contains_key(id)
    }

    /// Number of open transactions
    pub fn len(&self) -> usize {
        self.batches.lock().len()
    }

    /// True when no transaction is open
    pub fn is_empty(&self) -> bool {
        self.batches.lock().is_empty()
    }
}
