//! CQL command builder
//!
//! Pure functions turning an operation description into a parameterized
//! [`Statement`]. Values are never interpolated into the text; only table and
//! column names are, after validation as CQL identifiers.
//!
//! The builder knows nothing about transactions or sessions, so the same
//! statement is produced whether it is executed at once or deferred into a
//! batch.
//!
//! [`Statement`]: manipulate_core::Statement

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;

pub use builder::{
    build_count, build_delete, build_increment, build_insert, build_select, build_update,
    build_update_collection, BuildError, BuildResult,
};
