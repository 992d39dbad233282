//! Testing utilities
//!
//! - **MemorySession**: records every request, replays queued results, and
//!   injects failures
//! - **MemoryConnector**: hands out a given session or refuses to connect
//!
//! # Example
//!
//! ```
//! use manipulate_session::testing::{MemorySession, Request};
//! use manipulate_session::{ResultSet, Session};
//! use manipulate_core::Statement;
//!
//! let session = MemorySession::new();
//! session.push_result(ResultSet::count(3));
//! let rows = session.query(&Statement::new("SELECT COUNT(*) FROM t", vec![])).unwrap();
//! assert_eq!(rows.scan_int(), Some(3));
//! assert!(matches!(session.requests()[0], Request::Query(_)));
//! ```

mod memory;

pub use memory::{MemoryConnector, MemorySession, Request};
