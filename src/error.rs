//! Error types for the repository facade

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the repository facade.
///
/// Planning and correlation errors pass through transparently from the member
/// crates; executor failures are either native SQLx errors (for the bundled
/// executor) or opaque driver messages from third-party executors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from pagination planning.
   #[error(transparent)]
   Planner(#[from] sql_page_planner::Error),

   /// Error from result-set correlation or row materialization.
   #[error(transparent)]
   Correlator(#[from] sql_row_correlator::Error),

   /// Error from SQLx operations.
   #[cfg(feature = "sqlite")]
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// A transaction failed and the ROLLBACK itself also failed, leaving the
   /// connection in an unknown state.
   #[error("transaction failed ({transaction_error}) and rollback failed ({rollback_error})")]
   TransactionRollbackFailed {
      transaction_error: String,
      rollback_error: String,
   },

   /// Error reported by a third-party executor implementation.
   #[error("executor error: {0}")]
   Executor(String),

   /// Column type that cannot be mapped to JSON.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// Entity serialization produced something other than an object, so
   /// column values cannot be extracted from it.
   #[error("entity must serialize to an object, got {0}")]
   EntityNotAnObject(&'static str),

   /// Entity or key value could not be serialized to JSON.
   #[error("entity serialization failed: {0}")]
   Serialize(#[from] serde_json::Error),
}
