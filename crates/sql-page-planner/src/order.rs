//! Multi-key ordering: ORDER BY rendering and typed in-memory sort plans
//!
//! The same ordering specification drives two paths. Against raw SQL it is
//! reduced to an `ORDER BY f1 ASC, f2 DESC, …` fragment consumed by the
//! planner; against in-memory rows it becomes a composite comparator in which
//! each key after the first only breaks ties left unresolved by the keys
//! before it, never re-sorting the whole sequence.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   Ascending,
   /// Descending order (largest first)
   Descending,
}

impl SortDirection {
   pub fn sql_keyword(self) -> &'static str {
      match self {
         SortDirection::Ascending => "ASC",
         SortDirection::Descending => "DESC",
      }
   }
}

/// One column of a composite ordering, in priority order within its list
/// (first key is the primary sort).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
   /// Column name as it appears in the query result set
   pub column: String,
   /// Sort direction for this column
   pub direction: SortDirection,
}

impl SortKey {
   /// Create a sort key with ascending direction.
   pub fn asc(column: impl Into<String>) -> Self {
      Self {
         column: column.into(),
         direction: SortDirection::Ascending,
      }
   }

   /// Create a sort key with descending direction.
   pub fn desc(column: impl Into<String>) -> Self {
      Self {
         column: column.into(),
         direction: SortDirection::Descending,
      }
   }
}

/// Validate that a column name is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain column
/// names, qualified names (e.g., `table.column`), and underscored identifiers.
pub(crate) fn validate_column_name(name: &str) -> Result<()> {
   let mut chars = name.chars();
   match chars.next() {
      Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
      _ => {
         return Err(Error::InvalidColumnName {
            name: name.to_string(),
         });
      }
   }

   for ch in chars {
      if !ch.is_ascii_alphanumeric() && ch != '_' && ch != '.' {
         return Err(Error::InvalidColumnName {
            name: name.to_string(),
         });
      }
   }

   Ok(())
}

/// Pair sort columns with directions, left to right.
///
/// The column list sets the priority; directions beyond the column count are
/// ignored, and columns without a direction default to ascending. An empty
/// column list is a valid "no caller-specified order" and resolves to an
/// empty key list.
pub fn resolve_sort_keys(columns: &[&str], directions: &[SortDirection]) -> Result<Vec<SortKey>> {
   let mut keys = Vec::with_capacity(columns.len());
   for (idx, column) in columns.iter().enumerate() {
      validate_column_name(column)?;
      let direction = directions
         .get(idx)
         .copied()
         .unwrap_or(SortDirection::Ascending);
      keys.push(SortKey {
         column: (*column).to_string(),
         direction,
      });
   }
   Ok(keys)
}

/// Render the `ORDER BY …` fragment for a key list, `None` when empty.
///
/// Column names are validated before interpolation; the keys may have been
/// built directly rather than through [`resolve_sort_keys`].
pub fn render_order_by(keys: &[SortKey]) -> Result<Option<String>> {
   if keys.is_empty() {
      return Ok(None);
   }

   let mut parts = Vec::with_capacity(keys.len());
   for key in keys {
      validate_column_name(&key.column)?;
      parts.push(format!("{} {}", key.column, key.direction.sql_keyword()));
   }

   Ok(Some(format!("ORDER BY {}", parts.join(", "))))
}

/// One typed sort key: a comparator derived from a field accessor, plus the
/// direction to apply to its result.
pub struct TypedSortKey<T> {
   compare: Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>,
   direction: SortDirection,
}

impl<T> TypedSortKey<T> {
   /// Ascending key over the value produced by `accessor`.
   pub fn asc<K, F>(accessor: F) -> Self
   where
      K: Ord,
      F: Fn(&T) -> K + Send + Sync + 'static,
   {
      Self::with_comparator(
         move |a, b| accessor(a).cmp(&accessor(b)),
         SortDirection::Ascending,
      )
   }

   /// Descending key over the value produced by `accessor`.
   pub fn desc<K, F>(accessor: F) -> Self
   where
      K: Ord,
      F: Fn(&T) -> K + Send + Sync + 'static,
   {
      Self::with_comparator(
         move |a, b| accessor(a).cmp(&accessor(b)),
         SortDirection::Descending,
      )
   }

   /// Key from an explicit ascending comparator and a direction.
   pub fn with_comparator<F>(compare: F, direction: SortDirection) -> Self
   where
      F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
   {
      Self {
         compare: Box::new(compare),
         direction,
      }
   }
}

/// A composite ordering over `T`, built once per entity type and reusable
/// across calls.
///
/// The first key establishes the primary order; each subsequent key is
/// consulted only when every preceding key compared equal. An empty plan is
/// the identity: [`SortPlan::sort`] leaves the slice untouched.
pub struct SortPlan<T> {
   keys: Vec<TypedSortKey<T>>,
}

impl<T> SortPlan<T> {
   pub fn new(keys: Vec<TypedSortKey<T>>) -> Self {
      Self { keys }
   }

   pub fn is_empty(&self) -> bool {
      self.keys.is_empty()
   }

   /// Compare two items under the full key chain.
   pub fn compare(&self, a: &T, b: &T) -> Ordering {
      for key in &self.keys {
         let mut ordering = (key.compare)(a, b);
         if key.direction == SortDirection::Descending {
            ordering = ordering.reverse();
         }
         if ordering != Ordering::Equal {
            return ordering;
         }
      }
      Ordering::Equal
   }

   /// Sort a slice in place. Uses the stable slice sort, so rows the plan
   /// considers equal keep their source order.
   pub fn sort(&self, items: &mut [T]) {
      if self.keys.is_empty() {
         return;
      }
      items.sort_by(|a, b| self.compare(a, b));
   }
}

/// A dynamic result-set row: column name to JSON value, in select order.
pub type DynamicRow = IndexMap<String, JsonValue>;

/// Build a [`SortPlan`] over dynamic rows keyed by column name.
///
/// Missing columns and nulls sort first; numbers, strings, and booleans
/// compare within their own kind, and mixed kinds fall back to a fixed
/// kind rank so the ordering stays total.
pub fn row_sort_plan(keys: &[SortKey]) -> SortPlan<DynamicRow> {
   let typed = keys
      .iter()
      .map(|key| {
         let column = key.column.clone();
         TypedSortKey::with_comparator(
            move |a: &DynamicRow, b: &DynamicRow| compare_json(a.get(&column), b.get(&column)),
            key.direction,
         )
      })
      .collect();
   SortPlan::new(typed)
}

fn compare_json(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
   fn kind_rank(value: Option<&JsonValue>) -> u8 {
      match value {
         None | Some(JsonValue::Null) => 0,
         Some(JsonValue::Bool(_)) => 1,
         Some(JsonValue::Number(_)) => 2,
         Some(JsonValue::String(_)) => 3,
         Some(JsonValue::Array(_)) | Some(JsonValue::Object(_)) => 4,
      }
   }

   match (a, b) {
      (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => {
         let x = x.as_f64().unwrap_or(f64::NAN);
         let y = y.as_f64().unwrap_or(f64::NAN);
         x.partial_cmp(&y).unwrap_or(Ordering::Equal)
      }
      (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
      (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
      _ => kind_rank(a).cmp(&kind_rank(b)),
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   #[test]
   fn resolve_defaults_missing_directions_to_ascending() {
      let keys = resolve_sort_keys(&["a", "b", "c"], &[SortDirection::Descending]).unwrap();
      assert_eq!(keys[0], SortKey::desc("a"));
      assert_eq!(keys[1], SortKey::asc("b"));
      assert_eq!(keys[2], SortKey::asc("c"));
   }

   #[test]
   fn resolve_ignores_surplus_directions() {
      let keys = resolve_sort_keys(
         &["a"],
         &[SortDirection::Ascending, SortDirection::Descending],
      )
      .unwrap();
      assert_eq!(keys.len(), 1);
      assert_eq!(keys[0], SortKey::asc("a"));
   }

   #[test]
   fn resolve_with_no_columns_is_empty() {
      let keys = resolve_sort_keys(&[], &[SortDirection::Descending]).unwrap();
      assert!(keys.is_empty());
   }

   #[test]
   fn resolve_rejects_empty_column_name() {
      let err = resolve_sort_keys(&[""], &[]).unwrap_err();
      assert!(matches!(err, Error::InvalidColumnName { .. }));
   }

   #[test]
   fn render_order_by_fragment() {
      let keys = vec![SortKey::asc("category"), SortKey::desc("score")];
      assert_eq!(
         render_order_by(&keys).unwrap().unwrap(),
         "ORDER BY category ASC, score DESC"
      );
   }

   #[test]
   fn render_order_by_empty_is_none() {
      assert_eq!(render_order_by(&[]).unwrap(), None);
   }

   #[test]
   fn render_order_by_rejects_injection() {
      let keys = vec![SortKey::asc("id; DROP TABLE posts --")];
      assert!(matches!(
         render_order_by(&keys),
         Err(Error::InvalidColumnName { .. })
      ));
   }

   #[test]
   fn column_name_valid_qualified() {
      assert!(validate_column_name("posts.id").is_ok());
      assert!(validate_column_name("_private").is_ok());
      assert!(validate_column_name("col_123").is_ok());
   }

   #[test]
   fn column_name_rejects_bad_input() {
      assert!(validate_column_name("").is_err());
      assert!(validate_column_name("1bad").is_err());
      assert!(validate_column_name("col name").is_err());
      assert!(validate_column_name("id)--").is_err());
   }

   #[derive(Debug, Clone, PartialEq)]
   struct Person {
      name: &'static str,
      age: i64,
   }

   fn people() -> Vec<Person> {
      vec![
         Person {
            name: "carol",
            age: 30,
         },
         Person {
            name: "alice",
            age: 25,
         },
         Person {
            name: "bob",
            age: 30,
         },
         Person {
            name: "dave",
            age: 25,
         },
      ]
   }

   #[test]
   fn typed_plan_sorts_by_primary_key() {
      let plan = SortPlan::new(vec![TypedSortKey::desc(|p: &Person| p.age)]);
      let mut items = people();
      plan.sort(&mut items);
      let ages: Vec<i64> = items.iter().map(|p| p.age).collect();
      assert_eq!(ages, vec![30, 30, 25, 25]);
   }

   #[test]
   fn typed_plan_secondary_key_only_breaks_ties() {
      let plan = SortPlan::new(vec![
         TypedSortKey::desc(|p: &Person| p.age),
         TypedSortKey::asc(|p: &Person| p.name),
      ]);
      let mut items = people();
      plan.sort(&mut items);
      let names: Vec<&str> = items.iter().map(|p| p.name).collect();
      // Primary order (age desc) is untouched; names only reorder within
      // equal ages.
      assert_eq!(names, vec!["bob", "carol", "alice", "dave"]);
   }

   #[test]
   fn empty_plan_is_identity() {
      let plan = SortPlan::<Person>::new(vec![]);
      let mut items = people();
      plan.sort(&mut items);
      assert_eq!(items, people());
   }

   #[test]
   fn row_plan_orders_dynamic_rows() {
      let keys = vec![SortKey::asc("category"), SortKey::desc("score")];
      let plan = row_sort_plan(&keys);

      let mut rows: Vec<DynamicRow> = vec![
         [("category", json!("tech")), ("score", json!(70))],
         [("category", json!("art")), ("score", json!(60))],
         [("category", json!("tech")), ("score", json!(90))],
         [("category", json!("art")), ("score", json!(88))],
      ]
      .into_iter()
      .map(|pairs| {
         pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
      })
      .collect();

      plan.sort(&mut rows);

      let scores: Vec<i64> = rows
         .iter()
         .map(|row| row.get("score").unwrap().as_i64().unwrap())
         .collect();
      assert_eq!(scores, vec![88, 60, 90, 70]);
   }

   #[test]
   fn row_plan_sorts_missing_values_first() {
      let keys = vec![SortKey::asc("score")];
      let plan = row_sort_plan(&keys);

      let mut rows: Vec<DynamicRow> = vec![
         [("score".to_string(), json!(5))].into_iter().collect(),
         DynamicRow::default(),
         [("score".to_string(), json!(JsonValue::Null))]
            .into_iter()
            .collect(),
      ];
      plan.sort(&mut rows);

      assert!(rows[0].get("score").is_none());
      assert_eq!(rows[1].get("score"), Some(&JsonValue::Null));
      assert_eq!(rows[2].get("score"), Some(&json!(5)));
   }
}
