//! # sql-row-correlator
//!
//! Maps the ordered result sets of a multi-statement SQL batch back to their
//! semantic roles: the first set carries the total row count, the last set
//! carries the materialized page.
//!
//! ## Core Types
//!
//! - **[`correlate`]** / **[`correlate_entities`]** / **[`correlate_with`]**:
//!   the single-pass (items, total) transform
//! - **[`SqlRow`]**: a dynamic row, column name to JSON value
//! - **[`FromSqlRow`]** / **[`materialize`]**: plain-shape binding and
//!   case-insensitive struct materialization
//! - **[`Error`]**: correlation error type
//!
//! Every invocation is independent; there is no state between calls.

mod correlate;
mod error;
mod row;

// Re-export public types
pub use correlate::{correlate, correlate_entities, correlate_with};
pub use error::{Error, Result};
pub use row::{FromSqlRow, SqlRow, materialize};
