//! Per-call operation context
//!
//! A [`Context`] bundles everything a single manipulator call needs besides
//! the records themselves: the transaction token, an optional filter, an
//! optional page size and an optional pre-persistence hook for creates.

use crate::record::Manipulable;
use crate::types::TransactionId;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Hook run on each record after its identifier is assigned and before it
/// is staged for persistence. An error aborts the whole create call.
pub type CreateFinalizer =
    Arc<dyn Fn(&mut dyn Manipulable) -> std::result::Result<(), String> + Send + Sync>;

/// Comparison operator of a filter predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `=`
    Equal,
    /// `!=` (rejected by the CQL builder, the store has no inequality)
    NotEqual,
    /// `<`
    LesserThan,
    /// `<=`
    LesserOrEqualThan,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterOrEqualThan,
    /// `IN`
    In,
    /// `CONTAINS`
    Contains,
}

/// One `key <op> value` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column name
    pub key: String,
    /// Operator
    pub comparator: Comparator,
    /// Bound value
    pub value: Value,
}

/// Ordered conjunction of predicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate
    pub fn and(mut self, key: impl Into<String>, comparator: Comparator, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            key: key.into(),
            comparator,
            value: value.into(),
        });
        self
    }

    /// Append an equality predicate
    pub fn equal(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and(key, Comparator::Equal, value)
    }

    /// Predicates in declaration order
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Column names in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.predicates.iter().map(|p| p.key.as_str())
    }

    /// Bound values in declaration order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.predicates.iter().map(|p| &p.value)
    }

    /// True when the filter has no predicate
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Page size applied to retrieve-many selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of rows returned
    pub page_size: usize,
}

/// How a collection attribute is changed by an update-collection call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignationType {
    /// Append elements (`a = a + ?`)
    Add,
    /// Remove elements (`a = a - ?`)
    Subtract,
    /// Replace the collection (`a = ?`)
    Set,
}

/// Single-attribute collection update
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeUpdate {
    /// Collection column
    pub key: String,
    /// Elements to add, remove, or the full replacement
    pub values: Value,
    /// Kind of change
    pub assignation: AssignationType,
}

impl AttributeUpdate {
    /// Create an attribute update
    pub fn new(key: impl Into<String>, values: impl Into<Value>, assignation: AssignationType) -> Self {
        AttributeUpdate {
            key: key.into(),
            values: values.into(),
            assignation,
        }
    }
}

/// Bulk relationship assignation. Accepted by the operation surface only to
/// be rejected: the column-store manipulator does not support it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignation {
    /// Identifiers to attach
    pub members_added: Vec<String>,
    /// Identifiers to detach
    pub members_removed: Vec<String>,
    /// Full replacement set
    pub members: Vec<String>,
}

/// Per-call configuration bundle
#[derive(Clone, Default)]
pub struct Context {
    /// Token of the transaction to defer writes into; empty executes immediately
    pub transaction_id: TransactionId,
    /// Extra predicates applied to selects and counts, or the key predicates
    /// of an increment
    pub filter: Option<Filter>,
    /// Page size for retrieve-many
    pub page: Option<Pagination>,
    /// Pre-persistence hook for creates
    pub create_finalizer: Option<CreateFinalizer>,
}

impl Context {
    /// Create an empty context (no transaction, no filter)
    pub fn new() -> Self {
        Self::default()
    }

    /// Defer writes into the given transaction
    pub fn with_transaction(mut self, id: impl Into<TransactionId>) -> Self {
        self.transaction_id = id.into();
        self
    }

    /// Attach a filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Limit the number of rows retrieved
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page = Some(Pagination { page_size });
        self
    }

    /// Attach a pre-persistence hook
    pub fn with_create_finalizer<F>(mut self, finalizer: F) -> Self
    where
        F: Fn(&mut dyn Manipulable) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.create_finalizer = Some(Arc::new(finalizer));
        self
    }

    /// A copy of this context without its filter
    ///
    /// Used where the filter has already been consumed as key predicates and
    /// must not be applied a second time as a generic filter.
    pub fn without_filter(&self) -> Context {
        Context {
            transaction_id: self.transaction_id.clone(),
            filter: None,
            page: self.page,
            create_finalizer: self.create_finalizer.clone(),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("transaction_id", &self.transaction_id)
            .field("filter", &self.filter)
            .field("page", &self.page)
            .field("create_finalizer", &self.create_finalizer.is_some())
            .finish()
    }
}
