//! Transactional manipulation engine
//!
//! This crate ties the pieces together:
//! - TransactionRegistry: token to pending batch, one lock for fetch and append
//! - CqlManipulator: the manipulation surface over a store session
//! - TransactionMetrics: opened / committed / aborted counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manipulator;
mod metrics;
pub mod registry;

pub use manipulator::CqlManipulator;
pub use metrics::TransactionMetrics;
pub use registry::{Staged, TransactionRegistry};
