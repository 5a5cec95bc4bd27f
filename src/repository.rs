//! Typed repository facade over an executor
//!
//! [`SqlRepository`] ties the pieces together: it asks the executor for its
//! dialect once at construction, plans count/page statement pairs through
//! `sql-page-planner`, runs them as a batch, and correlates the result sets
//! into a typed [`Page`]. It also carries the CRUD pass-throughs and the
//! deferred write queue.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use sql_page_planner::{
   Dialect, DialectInfo, Page, PagePlanner, PageRequest, PlannerConfig, QueryForm, SortKey,
};
use sql_row_correlator::{FromSqlRow, correlate_entities};
use tracing::debug;

use crate::deferred::DeferredWrites;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::executor::{SqlExecutor, SqlStatement};

pub struct SqlRepository<T: Entity> {
   executor: Arc<dyn SqlExecutor>,
   info: DialectInfo,
   planner: PagePlanner,
   deferred: DeferredWrites,
   _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> SqlRepository<T> {
   pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
      Self::with_config(executor, PlannerConfig::default())
   }

   /// Build a repository with a non-default planner configuration, e.g. a
   /// different count expression.
   pub fn with_config(executor: Arc<dyn SqlExecutor>, config: PlannerConfig) -> Self {
      let info = executor.dialect_info();

      Self {
         executor,
         info,
         planner: PagePlanner::new(info.dialect, info.server_major, config),
         deferred: DeferredWrites::default(),
         _entity: PhantomData,
      }
   }

   pub fn dialect(&self) -> Dialect {
      self.info.dialect
   }

   /// Fetch one page of a plain `SELECT … FROM …` query, along with the
   /// total row count of the unpaged query.
   pub async fn find_page(
      &self,
      base_sql: &str,
      params: &[JsonValue],
      keys: &[SortKey],
      page: &PageRequest,
   ) -> Result<Page<T>> {
      self.fetch_page(base_sql, QueryForm::Plain, params, keys, page).await
   }

   /// Fetch one page of a CTE-shaped query (`WITH T AS ( … )`). The sort
   /// keys are applied to the CTE body where the dialect allows it.
   pub async fn find_page_with(
      &self,
      cte_sql: &str,
      params: &[JsonValue],
      keys: &[SortKey],
      page: &PageRequest,
   ) -> Result<Page<T>> {
      self.fetch_page(cte_sql, QueryForm::WithCte, params, keys, page).await
   }

   async fn fetch_page(
      &self,
      base_sql: &str,
      form: QueryForm,
      params: &[JsonValue],
      keys: &[SortKey],
      page: &PageRequest,
   ) -> Result<Page<T>> {
      let planned = self.planner.plan(base_sql, form, keys, page)?;

      debug!(
         count_sql = %planned.count_sql,
         page_sql = %planned.page_sql,
         page_index = page.page_index(),
         "planned page fetch"
      );

      let statements = [
         SqlStatement::new(planned.count_sql, params.to_vec()),
         SqlStatement::new(planned.page_sql, params.to_vec()),
      ];
      let result_sets = self.executor.fetch_batch(&statements).await?;
      let (items, total) = correlate_entities::<T>(&result_sets)?;

      Ok(Page::new(items, page, total))
   }

   pub async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>> {
      let statement = self.select_by_id_statement(id)?;
      let rows = self.executor.fetch_rows(&statement).await?;

      match rows.first() {
         Some(row) => Ok(Some(sql_row_correlator::materialize::<T>(row)?)),
         None => Ok(None),
      }
   }

   pub async fn find_all(&self) -> Result<Vec<T>> {
      let sql = format!(
         "SELECT {} FROM {}",
         T::columns().join(", "),
         T::table_name()
      );
      let rows = self.executor.fetch_rows(&SqlStatement::bare(sql)).await?;

      rows.iter()
         .map(|row| sql_row_correlator::materialize::<T>(row).map_err(Error::from))
         .collect()
   }

   pub async fn count(&self) -> Result<i64> {
      let sql = format!(
         "SELECT {} AS TOTAL FROM {}",
         self.planner.count_syntax(),
         T::table_name()
      );
      let rows = self.executor.fetch_rows(&SqlStatement::bare(sql)).await?;

      match rows.first() {
         Some(row) => Ok(i64::from_sql_row(row)?),
         None => Ok(0),
      }
   }

   pub async fn insert(&self, entity: &T) -> Result<u64> {
      self.executor.execute(&self.insert_statement(entity)?).await
   }

   /// Update every non-key column of the row whose key matches the entity's.
   pub async fn update(&self, entity: &T) -> Result<u64> {
      self.executor.execute(&self.update_statement(entity)?).await
   }

   pub async fn delete_by_id(&self, id: &T::Id) -> Result<u64> {
      self.executor.execute(&self.delete_by_id_statement(id)?).await
   }

   /// Queue an arbitrary write statement for the next
   /// [`flush_deferred`](Self::flush_deferred).
   pub fn defer(&self, statement: SqlStatement) {
      self.deferred.push(statement);
   }

   /// Queue an insert for the next [`flush_deferred`](Self::flush_deferred).
   pub fn defer_insert(&self, entity: &T) -> Result<()> {
      self.deferred.push(self.insert_statement(entity)?);
      Ok(())
   }

   /// Queue an update for the next [`flush_deferred`](Self::flush_deferred).
   pub fn defer_update(&self, entity: &T) -> Result<()> {
      self.deferred.push(self.update_statement(entity)?);
      Ok(())
   }

   /// Queue a delete for the next [`flush_deferred`](Self::flush_deferred).
   pub fn defer_delete_by_id(&self, id: &T::Id) -> Result<()> {
      self.deferred.push(self.delete_by_id_statement(id)?);
      Ok(())
   }

   pub fn deferred_len(&self) -> usize {
      self.deferred.len()
   }

   /// Run every queued write in a single transaction. Any failure rolls the
   /// whole batch back and the queue stays drained, so the caller decides
   /// whether to rebuild it.
   pub async fn flush_deferred(&self) -> Result<Vec<u64>> {
      let statements = self.deferred.drain();
      if statements.is_empty() {
         return Ok(Vec::new());
      }

      debug!(statement_count = statements.len(), "flushing deferred writes");
      self.executor.execute_transaction(&statements).await
   }

   fn select_by_id_statement(&self, id: &T::Id) -> Result<SqlStatement> {
      let sql = format!(
         "SELECT {} FROM {} WHERE {} = {}",
         T::columns().join(", "),
         T::table_name(),
         T::id_column(),
         self.info.dialect.placeholder(1)
      );

      Ok(SqlStatement::new(sql, vec![serde_json::to_value(id)?]))
   }

   fn insert_statement(&self, entity: &T) -> Result<SqlStatement> {
      let values = entity_values(entity)?;
      let columns = T::columns();
      let placeholders: Vec<String> = (1..=columns.len())
         .map(|i| self.info.dialect.placeholder(i))
         .collect();
      let sql = format!(
         "INSERT INTO {} ({}) VALUES ({})",
         T::table_name(),
         columns.join(", "),
         placeholders.join(", ")
      );
      let params = columns.iter().map(|col| column_value(&values, col)).collect();

      Ok(SqlStatement::new(sql, params))
   }

   fn update_statement(&self, entity: &T) -> Result<SqlStatement> {
      let values = entity_values(entity)?;
      let id_column = T::id_column();
      let set_columns: Vec<&str> = T::columns()
         .iter()
         .copied()
         .filter(|col| !col.eq_ignore_ascii_case(id_column))
         .collect();

      let assignments: Vec<String> = set_columns
         .iter()
         .enumerate()
         .map(|(i, col)| format!("{} = {}", col, self.info.dialect.placeholder(i + 1)))
         .collect();
      let sql = format!(
         "UPDATE {} SET {} WHERE {} = {}",
         T::table_name(),
         assignments.join(", "),
         id_column,
         self.info.dialect.placeholder(set_columns.len() + 1)
      );

      let mut params: Vec<JsonValue> =
         set_columns.iter().map(|col| column_value(&values, col)).collect();
      params.push(serde_json::to_value(entity.id())?);

      Ok(SqlStatement::new(sql, params))
   }

   fn delete_by_id_statement(&self, id: &T::Id) -> Result<SqlStatement> {
      let sql = format!(
         "DELETE FROM {} WHERE {} = {}",
         T::table_name(),
         T::id_column(),
         self.info.dialect.placeholder(1)
      );

      Ok(SqlStatement::new(sql, vec![serde_json::to_value(id)?]))
   }
}

/// Serialize the entity and require an object so column values can be pulled
/// out by name.
fn entity_values<T: Entity>(entity: &T) -> Result<serde_json::Map<String, JsonValue>> {
   match serde_json::to_value(entity)? {
      JsonValue::Object(map) => Ok(map),
      other => Err(Error::EntityNotAnObject(json_kind(&other))),
   }
}

/// Case-insensitive field lookup; columns absent from the serialized form
/// bind as NULL.
fn column_value(values: &serde_json::Map<String, JsonValue>, column: &str) -> JsonValue {
   values
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(column))
      .map(|(_, value)| value.clone())
      .unwrap_or(JsonValue::Null)
}

fn json_kind(value: &JsonValue) -> &'static str {
   match value {
      JsonValue::Null => "null",
      JsonValue::Bool(_) => "a boolean",
      JsonValue::Number(_) => "a number",
      JsonValue::String(_) => "a string",
      JsonValue::Array(_) => "an array",
      JsonValue::Object(_) => "an object",
   }
}
