//! The SQL executor collaborator boundary
//!
//! The repository never talks to a driver directly; everything flows through
//! [`SqlExecutor`]. The crate bundles a SQLite implementation behind the
//! `sqlite` feature, and any other engine (SQL Server, Oracle, …) plugs in by
//! implementing this trait over its own driver.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sql_page_planner::DialectInfo;
use sql_row_correlator::SqlRow;

use crate::error::Result;

/// One SQL statement with its bound parameter values, in placeholder order.
#[derive(Debug, Clone)]
pub struct SqlStatement {
   pub sql: String,
   pub params: Vec<JsonValue>,
}

impl SqlStatement {
   pub fn new(sql: impl Into<String>, params: Vec<JsonValue>) -> Self {
      Self {
         sql: sql.into(),
         params,
      }
   }

   /// A statement with no bound parameters.
   pub fn bare(sql: impl Into<String>) -> Self {
      Self::new(sql, Vec::new())
   }
}

/// Driver-side collaborator executing the planner's SQL.
///
/// Implementations are expected to be cheap to share (`Arc<dyn SqlExecutor>`)
/// and safe for concurrent use; all mutability lives inside the driver's own
/// pooling.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
   /// Dialect and server major version of the live connection, resolved once
   /// at connect time.
   fn dialect_info(&self) -> DialectInfo;

   /// Execute one read statement and return its rows.
   async fn fetch_rows(&self, statement: &SqlStatement) -> Result<Vec<SqlRow>>;

   /// Execute several read statements in one logical round trip, returning
   /// one row set per statement in order.
   ///
   /// The default runs the statements sequentially; drivers with native
   /// multi-statement batching should override this to keep it a single
   /// round trip.
   async fn fetch_batch(&self, statements: &[SqlStatement]) -> Result<Vec<Vec<SqlRow>>> {
      let mut sets = Vec::with_capacity(statements.len());
      for statement in statements {
         sets.push(self.fetch_rows(statement).await?);
      }
      Ok(sets)
   }

   /// Execute one write statement and return the affected-row count.
   async fn execute(&self, statement: &SqlStatement) -> Result<u64>;

   /// Execute writes atomically inside a single transaction, returning the
   /// affected-row count of each statement. Any failure rolls back the whole
   /// batch.
   async fn execute_transaction(&self, statements: &[SqlStatement]) -> Result<Vec<u64>>;
}
