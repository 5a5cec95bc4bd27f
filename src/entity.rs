//! Entity metadata trait for the CRUD pass-throughs

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Trait describing a persisted entity: table name, key column, and the
/// column list in declaration order.
///
/// Implemented manually per entity type. `Serialize` supplies column values
/// for writes; `DeserializeOwned` lets reads materialize rows back into the
/// type with case-insensitive column matching.
///
/// # Example
///
/// ```ignore
/// impl Entity for Person {
///    type Id = i64;
///    fn table_name() -> &'static str { "people" }
///    fn columns() -> &'static [&'static str] { &["id", "name", "age"] }
///    fn id(&self) -> &i64 { &self.id }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
   type Id: Serialize + Send + Sync + 'static;

   fn table_name() -> &'static str;

   fn id_column() -> &'static str {
      "id"
   }

   /// All persisted columns, including the key column.
   fn columns() -> &'static [&'static str];

   fn id(&self) -> &Self::Id;
}
