//! Error types for sql-page-planner

use thiserror::Error;

/// Errors raised while planning pagination SQL
#[derive(Error, Debug)]
pub enum Error {
   /// Dialect name not recognized by the planner. This is a configuration
   /// error: the repository was wired against an engine the planner does not
   /// support, and no retry will change that.
   #[error("unsupported SQL dialect: {0}")]
   UnsupportedDialect(String),

   /// Page size below the minimum of 1. Callers must not rely on clamping.
   #[error("page size must be at least 1, got {0}")]
   InvalidPageSize(u64),

   /// Page index below the minimum of 1 (page indexes are 1-based).
   #[error("page index must be at least 1, got {0}")]
   InvalidPageIndex(u64),

   /// Sort column name is empty or contains characters unsafe for SQL
   /// interpolation.
   ///
   /// Column names must match `[a-zA-Z_][a-zA-Z0-9_.]*` (letters, digits,
   /// underscores, and dots for qualified names like `table.column`).
   #[error("invalid sort column name '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidColumnName { name: String },

   /// The `WITH … AS ( … )` base text has no closing parenthesis outside of
   /// string literals and comments, so there is nowhere to splice the ORDER BY
   /// fragment.
   #[error("CTE base query has no locatable closing parenthesis for the ORDER BY splice")]
   CteMissingClosingParen,
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
