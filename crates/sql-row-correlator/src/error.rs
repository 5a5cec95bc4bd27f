//! Error types for sql-row-correlator

use thiserror::Error;

/// Errors raised while correlating result sets
#[derive(Error, Debug)]
pub enum Error {
   /// A page row could not be converted into the target type.
   #[error("failed to materialize row into target type: {detail}")]
   Materialize { detail: String },

   /// A plain-shape target was requested but the row has no columns at all.
   #[error("cannot bind a scalar from an empty row")]
   EmptyRow,
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
