//! Bundled SQLite executor
//!
//! Reference [`SqlExecutor`](crate::executor::SqlExecutor) implementation over
//! a SQLx connection pool. Parameters bind from JSON values and rows decode
//! back to JSON, so the repository stays driver-agnostic.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use sql_page_planner::{Dialect, DialectInfo};
use sql_row_correlator::SqlRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteValueRef};
use sqlx::{Column, Row, TypeInfo, Value, ValueRef};
use tracing::debug;

use crate::error::{Error, Result};
use crate::executor::{SqlExecutor, SqlStatement};

/// Pool configuration for the SQLite executor.
#[derive(Debug, Clone)]
pub struct SqliteExecutorConfig {
   pub max_connections: u32,
   pub idle_timeout: Duration,
}

impl Default for SqliteExecutorConfig {
   fn default() -> Self {
      Self {
         max_connections: 6,
         idle_timeout: Duration::from_secs(30),
      }
   }
}

pub struct SqliteExecutor {
   pool: SqlitePool,
   info: DialectInfo,
}

impl SqliteExecutor {
   /// Open (creating if missing) the database file with the default pool
   /// configuration.
   pub async fn connect(path: &Path) -> Result<Self> {
      Self::connect_with_config(path, SqliteExecutorConfig::default()).await
   }

   pub async fn connect_with_config(path: &Path, config: SqliteExecutorConfig) -> Result<Self> {
      let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);

      let pool = SqlitePoolOptions::new()
         .max_connections(config.max_connections)
         .idle_timeout(config.idle_timeout)
         .connect_with(options)
         .await?;

      let version: (String,) = sqlx::query_as("SELECT sqlite_version()").fetch_one(&pool).await?;
      let server_major = version
         .0
         .split('.')
         .next()
         .and_then(|major| major.parse().ok())
         .unwrap_or(3);
      debug!(path = %path.display(), version = %version.0, "connected sqlite executor");

      Ok(Self {
         pool,
         info: DialectInfo::new(Dialect::Sqlite, server_major),
      })
   }

   pub async fn close(self) {
      self.pool.close().await;
   }

   async fn fetch_on<'c, E>(executor: E, statement: &SqlStatement) -> Result<Vec<SqlRow>>
   where
      E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
   {
      let mut query = sqlx::query(&statement.sql);
      for value in &statement.params {
         query = bind_value(query, value.clone());
      }

      let rows = query.fetch_all(executor).await?;
      rows.iter().map(decode_row).collect()
   }
}

#[async_trait]
impl SqlExecutor for SqliteExecutor {
   fn dialect_info(&self) -> DialectInfo {
      self.info
   }

   async fn fetch_rows(&self, statement: &SqlStatement) -> Result<Vec<SqlRow>> {
      Self::fetch_on(&self.pool, statement).await
   }

   /// Runs the batch on one acquired connection so all statements observe the
   /// same snapshot relative to this pool's other writers.
   async fn fetch_batch(&self, statements: &[SqlStatement]) -> Result<Vec<Vec<SqlRow>>> {
      let mut conn = self.pool.acquire().await?;

      let mut sets = Vec::with_capacity(statements.len());
      for statement in statements {
         sets.push(Self::fetch_on(&mut *conn, statement).await?);
      }

      Ok(sets)
   }

   async fn execute(&self, statement: &SqlStatement) -> Result<u64> {
      let mut query = sqlx::query(&statement.sql);
      for value in &statement.params {
         query = bind_value(query, value.clone());
      }

      let result = query.execute(&self.pool).await?;
      Ok(result.rows_affected())
   }

   async fn execute_transaction(&self, statements: &[SqlStatement]) -> Result<Vec<u64>> {
      let mut conn = self.pool.acquire().await?;

      sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

      let result = async {
         let mut affected = Vec::with_capacity(statements.len());
         for statement in statements {
            let mut query = sqlx::query(&statement.sql);
            for value in &statement.params {
               query = bind_value(query, value.clone());
            }
            affected.push(query.execute(&mut *conn).await?.rows_affected());
         }
         Ok::<Vec<u64>, Error>(affected)
      }
      .await;

      match result {
         Ok(affected) => {
            sqlx::query("COMMIT").execute(&mut *conn).await?;
            Ok(affected)
         }
         Err(e) => match sqlx::query("ROLLBACK").execute(&mut *conn).await {
            Ok(_) => Err(e),
            Err(rollback_err) => Err(Error::TransactionRollbackFailed {
               transaction_error: e.to_string(),
               rollback_error: rollback_err.to_string(),
            }),
         },
      }
   }
}

/// Bind a JSON value to a SQLx query, preserving integer precision where the
/// value fits in SQLite's INTEGER type.
fn bind_value<'a>(
   query: sqlx::query::Query<'a, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'a>>,
   value: JsonValue,
) -> sqlx::query::Query<'a, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'a>> {
   if value.is_null() {
      query.bind(None::<JsonValue>)
   } else if let Some(flag) = value.as_bool() {
      // Stored as INTEGER 0/1 so BOOLEAN columns decode back to a bool
      query.bind(flag)
   } else if value.is_string() {
      query.bind(value.as_str().unwrap_or_default().to_owned())
   } else if let Some(number) = value.as_number() {
      if let Some(int_val) = number.as_i64() {
         query.bind(int_val)
      } else if let Some(uint_val) = number.as_u64() {
         if uint_val <= i64::MAX as u64 {
            query.bind(uint_val as i64)
         } else {
            // Too large for i64, bind as f64 and accept the precision loss
            query.bind(uint_val as f64)
         }
      } else {
         query.bind(number.as_f64().unwrap_or_default())
      }
   } else {
      query.bind(value)
   }
}

fn decode_row(row: &sqlx::sqlite::SqliteRow) -> Result<SqlRow> {
   let mut decoded = IndexMap::default();
   for (i, column) in row.columns().iter().enumerate() {
      let raw = row.try_get_raw(i)?;
      decoded.insert(
         column.name().to_string(),
         to_json(raw, column.type_info().name())?,
      );
   }
   Ok(decoded)
}

/// Decode one raw column value to JSON.
///
/// Dispatch is on the column's declared type, not the value's storage class:
/// a non-null SQLite value only ever reports INTEGER/REAL/TEXT/BLOB, so
/// BOOLEAN and DATETIME columns are only recognizable through the
/// declaration. BLOBs come back base64-encoded since JSON has no binary
/// type.
fn to_json(value: SqliteValueRef<'_>, declared: &str) -> Result<JsonValue> {
   if value.is_null() {
      return Ok(JsonValue::Null);
   }

   // Expression columns (COUNT(1) and other computed projections) have no
   // declared type; the value's storage class is all there is to go on.
   let type_name = if declared == "NULL" {
      value.type_info().name().to_string()
   } else {
      declared.to_string()
   };

   let decoded = match type_name.as_str() {
      "TEXT" | "DATE" | "TIME" | "DATETIME" => {
         JsonValue::String(value.to_owned().try_decode::<String>()?)
      }
      "INTEGER" | "NUMERIC" => JsonValue::from(value.to_owned().try_decode::<i64>()?),
      "REAL" => JsonValue::from(value.to_owned().try_decode::<f64>()?),
      "BOOLEAN" => JsonValue::Bool(value.to_owned().try_decode::<bool>()?),
      "BLOB" => {
         let bytes = value.to_owned().try_decode::<Vec<u8>>()?;
         JsonValue::String(base64::engine::general_purpose::STANDARD.encode(bytes))
      }
      "NULL" => JsonValue::Null,
      other => return Err(Error::UnsupportedDatatype(other.to_string())),
   };

   Ok(decoded)
}
