//! Row shapes and case-insensitive materialization

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// A result-set row: column name to JSON value, in select order.
pub type SqlRow = IndexMap<String, JsonValue>;

/// Types that can be bound directly from a single result-set row.
///
/// "Plain" shapes (scalars, strings, raw JSON, and row maps) bind from the
/// first column or the whole row without any field matching. Struct entities
/// go through [`materialize`] instead, which resolves fields by name.
pub trait FromSqlRow: Sized {
   fn from_sql_row(row: &SqlRow) -> Result<Self>;
}

impl FromSqlRow for SqlRow {
   fn from_sql_row(row: &SqlRow) -> Result<Self> {
      Ok(row.clone())
   }
}

impl FromSqlRow for JsonValue {
   fn from_sql_row(row: &SqlRow) -> Result<Self> {
      Ok(row_object(row))
   }
}

macro_rules! scalar_from_sql_row {
   ($($ty:ty),* $(,)?) => {$(
      impl FromSqlRow for $ty {
         fn from_sql_row(row: &SqlRow) -> Result<Self> {
            let value = row.values().next().ok_or(Error::EmptyRow)?;
            serde_json::from_value(value.clone()).map_err(|e| Error::Materialize {
               detail: e.to_string(),
            })
         }
      }
   )*};
}

scalar_from_sql_row!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool, String);

/// Materialize a struct from a row by case-insensitive, name-matched field
/// assignment.
///
/// Columns the target type does not declare are ignored; declared fields with
/// no matching column are simply absent from the input, so they fall back to
/// `#[serde(default)]` / `Option` handling (or fail deserialization if the
/// type insists on them).
pub fn materialize<T: DeserializeOwned>(row: &SqlRow) -> Result<T> {
   T::deserialize(RowDeserializer { row }).map_err(|e| Error::Materialize {
      detail: e.to_string(),
   })
}

fn row_object(row: &SqlRow) -> JsonValue {
   JsonValue::Object(row.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

/// Deserializer over a row map that resolves struct fields against column
/// names case-insensitively.
///
/// serde hands `deserialize_struct` the declared field list, which is exactly
/// what is needed to translate each field to its column without knowing the
/// target type up front; every other shape falls through to the row rendered
/// as a JSON object.
struct RowDeserializer<'a> {
   row: &'a SqlRow,
}

impl<'de> serde::Deserializer<'de> for RowDeserializer<'_> {
   type Error = serde_json::Error;

   fn deserialize_any<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
   where
      V: serde::de::Visitor<'de>,
   {
      row_object(self.row).deserialize_any(visitor)
   }

   fn deserialize_struct<V>(
      self,
      _name: &'static str,
      fields: &'static [&'static str],
      visitor: V,
   ) -> std::result::Result<V::Value, Self::Error>
   where
      V: serde::de::Visitor<'de>,
   {
      let mut object = serde_json::Map::with_capacity(fields.len());
      for field in fields {
         if let Some((_, value)) = self.row.iter().find(|(column, _)| {
            column.eq_ignore_ascii_case(field)
         }) {
            object.insert((*field).to_string(), value.clone());
         }
      }
      JsonValue::Object(object).deserialize_any(visitor)
   }

   serde::forward_to_deserialize_any! {
      bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
      bytes byte_buf option unit unit_struct newtype_struct seq tuple
      tuple_struct map enum identifier ignored_any
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde::Deserialize;
   use serde_json::json;

   fn row(pairs: &[(&str, JsonValue)]) -> SqlRow {
      pairs
         .iter()
         .map(|(k, v)| (k.to_string(), v.clone()))
         .collect()
   }

   #[derive(Debug, PartialEq, Deserialize)]
   struct Person {
      id: i64,
      name: String,
      #[serde(default)]
      age: i64,
   }

   #[test]
   fn materialize_matches_columns_case_insensitively() {
      let row = row(&[
         ("ID", json!(7)),
         ("Name", json!("alice")),
         ("AGE", json!(30)),
      ]);
      let person: Person = materialize(&row).unwrap();
      assert_eq!(
         person,
         Person {
            id: 7,
            name: "alice".into(),
            age: 30,
         }
      );
   }

   #[test]
   fn materialize_ignores_extra_columns() {
      let row = row(&[
         ("id", json!(1)),
         ("name", json!("bob")),
         ("age", json!(40)),
         ("shoe_size", json!(43)),
      ]);
      let person: Person = materialize(&row).unwrap();
      assert_eq!(person.name, "bob");
   }

   #[test]
   fn materialize_defaults_missing_columns() {
      let row = row(&[("id", json!(2)), ("name", json!("carol"))]);
      let person: Person = materialize(&row).unwrap();
      assert_eq!(person.age, 0);
   }

   #[test]
   fn materialize_reports_type_mismatch() {
      let row = row(&[("id", json!("not-a-number")), ("name", json!("x"))]);
      let err = materialize::<Person>(&row).unwrap_err();
      assert!(matches!(err, Error::Materialize { .. }));
   }

   #[test]
   fn scalar_binds_from_first_column() {
      let int_row = row(&[("count", json!(42)), ("ignored", json!("x"))]);
      assert_eq!(i64::from_sql_row(&int_row).unwrap(), 42);

      let string_row = row(&[("name", json!("alice"))]);
      assert_eq!(String::from_sql_row(&string_row).unwrap(), "alice");
   }

   #[test]
   fn scalar_from_empty_row_is_an_error() {
      let err = i64::from_sql_row(&SqlRow::default()).unwrap_err();
      assert!(matches!(err, Error::EmptyRow));
   }

   #[test]
   fn row_map_binds_whole_row() {
      let source = row(&[("a", json!(1)), ("b", json!("two"))]);
      assert_eq!(SqlRow::from_sql_row(&source).unwrap(), source);
   }

   #[test]
   fn json_value_binds_whole_row_as_object() {
      let source = row(&[("a", json!(1))]);
      assert_eq!(
         JsonValue::from_sql_row(&source).unwrap(),
         json!({ "a": 1 })
      );
   }
}
