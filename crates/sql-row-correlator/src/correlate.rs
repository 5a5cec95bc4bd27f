//! Correlating a batch's result sets into (items, total)
//!
//! A paged query executes as a multi-statement batch: the count select first,
//! the windowed page select last. This module maps the ordered row sets back
//! to their semantic roles in a single stateless pass.

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::row::{FromSqlRow, SqlRow, materialize};

/// Conventional column name carrying the total in the count result set.
const TOTAL_COLUMN: &str = "total";

/// Correlate result sets using a caller-supplied row conversion.
///
/// The first set is the count: its single row carries the total under the
/// `TOTAL` column (matched case-insensitively). A missing column, an empty
/// first set, or an empty batch all degrade to `total = 0` rather than
/// failing; deliberate leniency so a count statement that projects nothing
/// usable never sinks the page it rode in with. The last set is the page;
/// every row is converted with `materialize_row`.
pub fn correlate_with<T, F>(result_sets: &[Vec<SqlRow>], materialize_row: F) -> Result<(Vec<T>, i64)>
where
   F: Fn(&SqlRow) -> Result<T>,
{
   let total = result_sets.first().map_or(0, |set| extract_total(set));

   let mut items = Vec::new();
   if let Some(page_set) = result_sets.last() {
      items.reserve(page_set.len());
      for row in page_set {
         items.push(materialize_row(row)?);
      }
   }

   Ok((items, total))
}

/// Correlate into a plain shape (scalar, string, JSON, or row map).
pub fn correlate<T: FromSqlRow>(result_sets: &[Vec<SqlRow>]) -> Result<(Vec<T>, i64)> {
   correlate_with(result_sets, T::from_sql_row)
}

/// Correlate into a struct via case-insensitive field materialization.
pub fn correlate_entities<T: DeserializeOwned>(result_sets: &[Vec<SqlRow>]) -> Result<(Vec<T>, i64)> {
   correlate_with(result_sets, materialize::<T>)
}

fn extract_total(count_set: &[SqlRow]) -> i64 {
   let Some(row) = count_set.first() else {
      return 0;
   };
   let Some(value) = row
      .iter()
      .find(|(column, _)| column.eq_ignore_ascii_case(TOTAL_COLUMN))
      .map(|(_, value)| value)
   else {
      return 0;
   };

   match value {
      JsonValue::Number(number) => number
         .as_i64()
         .or_else(|| number.as_f64().map(|f| f as i64))
         .unwrap_or(0),
      // Oracle drivers commonly surface NUMBER aggregates as strings.
      JsonValue::String(text) => text
         .parse::<i64>()
         .ok()
         .or_else(|| text.parse::<f64>().ok().map(|f| f as i64))
         .unwrap_or(0),
      _ => 0,
   }
}
