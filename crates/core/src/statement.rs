//! Statements and batches
//!
//! A [`Statement`] is parameterized query text plus its positional values.
//! A [`Batch`] is an ordered group of statements sent to the store as one
//! request. Whether the store applies a batch atomically is up to the store.

use crate::value::Value;
use std::fmt;

/// Parameterized statement: `?` placeholders in `text`, bound in order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Query text
    pub text: String,
    /// Positional parameter values
    pub values: Vec<Value>,
}

impl Statement {
    /// Create a statement
    pub fn new(text: impl Into<String>, values: Vec<Value>) -> Self {
        Statement {
            text: text.into(),
            values,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Ordered, append-only group of statements, sent unlogged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    statements: Vec<Statement>,
}

impl Batch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Statements in append order
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// True when no statement was appended
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Extend<Statement> for Batch {
    fn extend<I: IntoIterator<Item = Statement>>(&mut self, iter: I) {
        self.statements.extend(iter);
    }
}

impl FromIterator<Statement> for Batch {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Batch {
            statements: iter.into_iter().collect(),
        }
    }
}
