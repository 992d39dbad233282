//! Identity and transaction token types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-chosen token naming one logical, deferred transaction
///
/// The empty token means "no transaction": every write is executed
/// immediately. A non-empty token must be unique among the transactions
/// that are open at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create a token from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        TransactionId(id.into())
    }

    /// The "no transaction" token
    pub fn none() -> Self {
        TransactionId(String::new())
    }

    /// True when this token means "execute immediately"
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the token text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        TransactionId(s.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        TransactionId(s)
    }
}

/// Identity of a record type
///
/// `name` is the column family (table) the records live in; `category` is
/// the plural name used by callers when addressing a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Table name
    pub name: &'static str,
    /// Collection name
    pub category: &'static str,
}

impl Identity {
    /// Create a new identity
    pub const fn new(name: &'static str, category: &'static str) -> Self {
        Identity { name, category }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
