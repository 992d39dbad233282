//! Record schema descriptors
//!
//! Records do not go through runtime introspection. Each record type
//! declares a static [`Schema`]: its identity plus an ordered list of
//! [`Field`]s, each with a name, a primary-key flag and a pair of accessor
//! functions. The codec is a pure function over that descriptor.
//!
//! # Example
//!
//! ```
//! use manipulate_core::{Field, Identity, Manipulable, Record, Schema};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Tag {
//!     id: String,
//!     name: String,
//! }
//!
//! static TAG_SCHEMA: Schema<Tag> = Schema::new(
//!     Identity::new("tag", "tags"),
//!     &[
//!         Field::primary_key("id", |t| Ok(t.id.clone().into()), |t, v| {
//!             t.id = v.decode()?;
//!             Ok(())
//!         }),
//!         Field::new("name", |t| Ok(t.name.clone().into()), |t, v| {
//!             t.name = v.decode()?;
//!             Ok(())
//!         }),
//!     ],
//! );
//!
//! impl Manipulable for Tag {
//!     fn identity(&self) -> Identity {
//!         TAG_SCHEMA.identity
//!     }
//!     fn identifier(&self) -> &str {
//!         &self.id
//!     }
//!     fn set_identifier(&mut self, id: String) {
//!         self.id = id;
//!     }
//! }
//!
//! impl Record for Tag {
//!     fn schema() -> &'static Schema<Self> {
//!         &TAG_SCHEMA
//!     }
//! }
//! ```

use crate::types::Identity;
use crate::value::Value;

/// Reads a field into a column value; `Err` carries the reason it is unreadable
pub type Getter<R> = fn(&R) -> std::result::Result<Value, String>;

/// Writes a column value into a field; `Err` hands the rejected value back
pub type Setter<R> = fn(&mut R, Value) -> std::result::Result<(), Value>;

/// One persisted field of a record type
pub struct Field<R> {
    /// Column name
    pub name: &'static str,
    /// Part of the primary key
    pub primary_key: bool,
    /// Accessor used when writing
    pub get: Getter<R>,
    /// Accessor used when reading
    pub set: Setter<R>,
}

impl<R> Field<R> {
    /// A regular column
    pub const fn new(name: &'static str, get: Getter<R>, set: Setter<R>) -> Self {
        Field {
            name,
            primary_key: false,
            get,
            set,
        }
    }

    /// A primary-key column
    pub const fn primary_key(name: &'static str, get: Getter<R>, set: Setter<R>) -> Self {
        Field {
            name,
            primary_key: true,
            get,
            set,
        }
    }
}

/// Static description of a record type
pub struct Schema<R: 'static> {
    /// Table and collection names
    pub identity: Identity,
    /// Persisted fields in declaration order
    pub fields: &'static [Field<R>],
}

impl<R: 'static> Schema<R> {
    /// Create a schema
    pub const fn new(identity: Identity, fields: &'static [Field<R>]) -> Self {
        Schema { identity, fields }
    }

    /// Primary-key fields in declaration order
    pub fn primary_keys(&self) -> impl Iterator<Item = &Field<R>> {
        self.fields.iter().filter(|f| f.primary_key)
    }
}

/// Object-safe view of a record
///
/// This is what per-record hooks receive.
pub trait Manipulable: Send {
    /// Identity of the record type
    fn identity(&self) -> Identity;

    /// Current identifier (empty until created)
    fn identifier(&self) -> &str;

    /// Replace the identifier
    fn set_identifier(&mut self, id: String);
}

/// A typed record the manipulator can persist
pub trait Record: Manipulable + Default + Clone + 'static {
    /// The record type's schema descriptor
    fn schema() -> &'static Schema<Self>;
}
