//! Object codec
//!
//! Converts records into column name / value pairs for statements, and
//! result rows back into records, using only the record's [`Schema`].
//!
//! [`Schema`]: crate::record::Schema

use crate::record::Record;
use crate::value::Value;
use std::collections::HashMap;
use thiserror::Error;

/// A result row: column name to value
pub type Row = HashMap<String, Value>;

/// Result type alias for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Column names and values, index-aligned, in declaration order
pub type Columns = (Vec<&'static str>, Vec<Value>);

/// Codec failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// A getter could not read its field
    #[error("cannot read field '{field}': {reason}")]
    Unreadable {
        /// Field name
        field: &'static str,
        /// Reason reported by the getter
        reason: String,
    },

    /// The schema declares no primary-key field
    #[error("no primary key declared for '{identity}'")]
    NoPrimaryKey {
        /// Table name
        identity: &'static str,
    },

    /// Exactly one row was expected
    #[error("expected exactly one row, got {actual}")]
    RowCount {
        /// Number of rows returned
        actual: usize,
    },

    /// A column value does not fit the field
    #[error("cannot decode column '{field}' from {actual}")]
    TypeMismatch {
        /// Field name
        field: &'static str,
        /// Type of the rejected value
        actual: &'static str,
    },
}

/// Every persisted field of `record`, primary keys included
pub fn extract_all<R: Record>(record: &R) -> CodecResult<Columns> {
    let schema = R::schema();
    let mut names = Vec::with_capacity(schema.fields.len());
    let mut values = Vec::with_capacity(schema.fields.len());

    for field in schema.fields {
        let value = (field.get)(record).map_err(|reason| CodecError::Unreadable {
            field: field.name,
            reason,
        })?;
        names.push(field.name);
        values.push(value);
    }

    Ok((names, values))
}

/// Only the primary-key fields of `record`
pub fn extract_primary_key<R: Record>(record: &R) -> CodecResult<Columns> {
    let schema = R::schema();
    let mut names = Vec::new();
    let mut values = Vec::new();

    for field in schema.primary_keys() {
        let value = (field.get)(record).map_err(|reason| CodecError::Unreadable {
            field: field.name,
            reason,
        })?;
        names.push(field.name);
        values.push(value);
    }

    if names.is_empty() {
        return Err(CodecError::NoPrimaryKey {
            identity: schema.identity.name,
        });
    }

    Ok((names, values))
}

/// Write the declared columns of `row` into `record`
///
/// Columns the schema does not declare are ignored; declared fields absent
/// from the row keep their current value. On error `record` may be partially
/// written; use [`decode_one`] for an all-or-nothing update.
pub fn decode_into<R: Record>(mut row: Row, record: &mut R) -> CodecResult<()> {
    for field in R::schema().fields {
        if let Some(value) = row.remove(field.name) {
            (field.set)(record, value).map_err(|rejected| CodecError::TypeMismatch {
                field: field.name,
                actual: rejected.type_name(),
            })?;
        }
    }
    Ok(())
}

/// Decode the single row of `rows` into `record`
///
/// `record` is left untouched unless decoding succeeds.
pub fn decode_one<R: Record>(rows: Vec<Row>, record: &mut R) -> CodecResult<()> {
    if rows.len() != 1 {
        return Err(CodecError::RowCount { actual: rows.len() });
    }

    let mut decoded = record.clone();
    for row in rows {
        decode_into(row, &mut decoded)?;
    }
    *record = decoded;
    Ok(())
}

/// Decode every row into a fresh record; zero rows is an empty vector
pub fn decode_many<R: Record>(rows: Vec<Row>) -> CodecResult<Vec<R>> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut record = R::default();
        decode_into(row, &mut record)?;
        out.push(record);
    }
    Ok(out)
}
