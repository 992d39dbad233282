//! Statement builders, one per operation kind

use manipulate_core::{AssignationType, AttributeUpdate, Comparator, Context, Statement, Value};
use thiserror::Error;

/// Result type alias for builders
pub type BuildResult = std::result::Result<Statement, BuildError>;

/// Builder failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Table or column name is not a plain CQL identifier
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// Key names and key values are not index-aligned
    #[error("{names} column names for {values} values")]
    ArityMismatch {
        /// Number of names
        names: usize,
        /// Number of values
        values: usize,
    },

    /// Insert or update without any column
    #[error("no column to write in '{0}'")]
    NoColumns(String),

    /// Update, delete or increment without a key predicate
    #[error("no key predicate for '{0}'")]
    NoKey(String),

    /// Operator the store cannot evaluate
    #[error("unsupported operator {0:?} on '{1}'")]
    UnsupportedComparator(Comparator, String),

    /// Page size does not fit a bound `bigint`
    #[error("page size {0} out of range")]
    PageSize(usize),
}

fn check_identifier(name: &str) -> Result<&str, BuildError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(BuildError::InvalidIdentifier(name.to_string()))
    }
}

fn check_arity<K, V>(names: &[K], values: &[V]) -> Result<(), BuildError> {
    if names.len() != values.len() {
        return Err(BuildError::ArityMismatch {
            names: names.len(),
            values: values.len(),
        });
    }
    Ok(())
}

fn operator(comparator: Comparator, key: &str) -> Result<&'static str, BuildError> {
    Ok(match comparator {
        Comparator::Equal => "=",
        Comparator::LesserThan => "<",
        Comparator::LesserOrEqualThan => "<=",
        Comparator::GreaterThan => ">",
        Comparator::GreaterOrEqualThan => ">=",
        Comparator::In => "IN",
        Comparator::Contains => "CONTAINS",
        Comparator::NotEqual => {
            return Err(BuildError::UnsupportedComparator(comparator, key.to_string()))
        }
    })
}

/// Accumulates `WHERE` clauses and their bound values
#[derive(Default)]
struct Clauses {
    parts: Vec<String>,
    values: Vec<Value>,
    filtered: bool,
}

impl Clauses {
    fn keys(&mut self, names: &[&str], values: &[Value]) -> Result<(), BuildError> {
        check_arity(names, values)?;
        for (name, value) in names.iter().zip(values) {
            self.parts.push(format!("{} = ?", check_identifier(name)?));
            self.values.push(value.clone());
        }
        Ok(())
    }

    fn context_filter(&mut self, context: &Context) -> Result<(), BuildError> {
        let Some(filter) = &context.filter else {
            return Ok(());
        };
        for predicate in filter.predicates() {
            let key = check_identifier(&predicate.key)?;
            let op = operator(predicate.comparator, key)?;
            self.parts.push(format!("{} {} ?", key, op));
            self.values.push(predicate.value.clone());
            self.filtered = true;
        }
        Ok(())
    }

    fn write_where(&self, text: &mut String) {
        if !self.parts.is_empty() {
            text.push_str(" WHERE ");
            text.push_str(&self.parts.join(" AND "));
        }
    }
}

/// `SELECT * FROM t [WHERE ...] [LIMIT ?] [ALLOW FILTERING]`
///
/// `keys`/`values` are equality predicates (a record's primary key); the
/// context filter and page size are applied on top.
pub fn build_select(context: &Context, table: &str, keys: &[&str], values: &[Value]) -> BuildResult {
    let mut clauses = Clauses::default();
    clauses.keys(keys, values)?;
    clauses.context_filter(context)?;

    let mut text = format!("SELECT * FROM {}", check_identifier(table)?);
    clauses.write_where(&mut text);

    let mut bound = clauses.values;
    if let Some(page) = context.page {
        text.push_str(" LIMIT ?");
        let limit = i64::try_from(page.page_size).map_err(|_| BuildError::PageSize(page.page_size))?;
        bound.push(Value::Int(limit));
    }
    if clauses.filtered {
        text.push_str(" ALLOW FILTERING");
    }

    Ok(Statement::new(text, bound))
}

/// `INSERT INTO t (a, b) VALUES (?, ?)`
pub fn build_insert(_context: &Context, table: &str, fields: &[&str], values: &[Value]) -> BuildResult {
    check_arity(fields, values)?;
    let table = check_identifier(table)?;
    if fields.is_empty() {
        return Err(BuildError::NoColumns(table.to_string()));
    }

    let columns = fields
        .iter()
        .map(|f| check_identifier(f))
        .collect::<Result<Vec<_>, _>>()?;
    let placeholders = vec!["?"; columns.len()].join(", ");

    Ok(Statement::new(
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        ),
        values.to_vec(),
    ))
}

/// `UPDATE t SET a = ?, b = ? WHERE k = ?`
///
/// Key columns present in `fields` are left out of the `SET` clause; the
/// store refuses to update them.
pub fn build_update(
    _context: &Context,
    table: &str,
    fields: &[&str],
    values: &[Value],
    keys: &[&str],
    key_values: &[Value],
) -> BuildResult {
    check_arity(fields, values)?;
    let table = check_identifier(table)?;
    if keys.is_empty() {
        return Err(BuildError::NoKey(table.to_string()));
    }

    let mut assignments = Vec::with_capacity(fields.len());
    let mut bound = Vec::with_capacity(values.len() + key_values.len());
    for (field, value) in fields.iter().zip(values) {
        if keys.contains(field) {
            continue;
        }
        assignments.push(format!("{} = ?", check_identifier(field)?));
        bound.push(value.clone());
    }
    if assignments.is_empty() {
        return Err(BuildError::NoColumns(table.to_string()));
    }

    let mut clauses = Clauses::default();
    clauses.keys(keys, key_values)?;

    let mut text = format!("UPDATE {} SET {}", table, assignments.join(", "));
    clauses.write_where(&mut text);
    bound.extend(clauses.values);

    Ok(Statement::new(text, bound))
}

/// `DELETE FROM t WHERE k = ?`
pub fn build_delete(_context: &Context, table: &str, keys: &[&str], values: &[Value]) -> BuildResult {
    let table = check_identifier(table)?;
    if keys.is_empty() {
        return Err(BuildError::NoKey(table.to_string()));
    }

    let mut clauses = Clauses::default();
    clauses.keys(keys, values)?;

    let mut text = format!("DELETE FROM {}", table);
    clauses.write_where(&mut text);

    Ok(Statement::new(text, clauses.values))
}

/// `SELECT COUNT(*) FROM t [WHERE ...] [ALLOW FILTERING]`
pub fn build_count(context: &Context, table: &str) -> BuildResult {
    let mut clauses = Clauses::default();
    clauses.context_filter(context)?;

    let mut text = format!("SELECT COUNT(*) FROM {}", check_identifier(table)?);
    clauses.write_where(&mut text);
    if clauses.filtered {
        text.push_str(" ALLOW FILTERING");
    }

    Ok(Statement::new(text, clauses.values))
}

/// `UPDATE t SET c = c + ? WHERE k = ?`
///
/// A negative `delta` is written as a subtraction of its magnitude.
pub fn build_increment(
    context: &Context,
    table: &str,
    counter: &str,
    delta: i64,
    keys: &[&str],
    values: &[Value],
) -> BuildResult {
    let table = check_identifier(table)?;
    let counter = check_identifier(counter)?;
    if keys.is_empty() {
        return Err(BuildError::NoKey(table.to_string()));
    }

    let mut clauses = Clauses::default();
    clauses.keys(keys, values)?;
    clauses.context_filter(context)?;

    let (sign, magnitude) = if delta < 0 {
        ("-", delta.unsigned_abs())
    } else {
        ("+", delta.unsigned_abs())
    };
    // i64::MIN has no positive i64 counterpart; keep it as an addition.
    let (sign, magnitude) = match i64::try_from(magnitude) {
        Ok(m) => (sign, m),
        Err(_) => ("+", delta),
    };

    let mut text = format!("UPDATE {} SET {} = {} {} ?", table, counter, counter, sign);
    clauses.write_where(&mut text);

    let mut bound = Vec::with_capacity(1 + clauses.values.len());
    bound.push(Value::Int(magnitude));
    bound.extend(clauses.values);

    Ok(Statement::new(text, bound))
}

/// `UPDATE t SET a = a + ? WHERE k = ?` and its subtract / replace forms
pub fn build_update_collection(
    _context: &Context,
    table: &str,
    update: &AttributeUpdate,
    keys: &[&str],
    values: &[Value],
) -> BuildResult {
    let table = check_identifier(table)?;
    let attribute = check_identifier(&update.key)?;
    if keys.is_empty() {
        return Err(BuildError::NoKey(table.to_string()));
    }

    let assignment = match update.assignation {
        AssignationType::Add => format!("{} = {} + ?", attribute, attribute),
        AssignationType::Subtract => format!("{} = {} - ?", attribute, attribute),
        AssignationType::Set => format!("{} = ?", attribute),
    };

    let mut clauses = Clauses::default();
    clauses.keys(keys, values)?;

    let mut text = format!("UPDATE {} SET {}", table, assignment);
    clauses.write_where(&mut text);

    let mut bound = Vec::with_capacity(1 + clauses.values.len());
    bound.push(update.values.clone());
    bound.extend(clauses.values);

    Ok(Statement::new(text, bound))
}
