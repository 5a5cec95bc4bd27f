//! Typed repository facade over dialect-aware SQL pagination.
//!
//! The crate composes two members: `sql-page-planner` synthesizes the
//! count/page statement pairs for a dialect and server generation, and
//! `sql-row-correlator` turns the returned result sets back into typed rows.
//! [`SqlRepository`] wires both to a driver through the [`SqlExecutor`]
//! boundary; the bundled SQLite executor (behind the `sqlite` feature, on by
//! default) is the reference implementation.
//!
//! # Example
//!
//! ```ignore
//! use sql_repo_toolkit::{PageRequest, SortKey, SqlRepository, SqliteExecutor};
//!
//! let executor = Arc::new(SqliteExecutor::connect(&db_path).await?);
//! let repo: SqlRepository<Person> = SqlRepository::new(executor);
//!
//! let page = repo
//!    .find_page(
//!       "SELECT id, name, age FROM people WHERE age > ?",
//!       &[json!(18)],
//!       &[SortKey::desc("age")],
//!       &PageRequest::new(10, 2)?,
//!    )
//!    .await?;
//! ```

mod deferred;
mod entity;
mod error;
mod executor;
mod repository;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use entity::Entity;
pub use error::{Error, Result};
pub use executor::{SqlExecutor, SqlStatement};
pub use repository::SqlRepository;
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteExecutor, SqliteExecutorConfig};

pub use sql_page_planner::{
   Dialect, DialectInfo, DynamicRow, Page, PagePlanner, PageRequest, PlannedPage, PlannerConfig,
   QueryForm, SortDirection, SortKey, SortPlan, TypedSortKey, render_order_by, resolve_sort_keys,
   row_sort_plan,
};
pub use sql_row_correlator::{FromSqlRow, SqlRow, correlate, correlate_entities, correlate_with, materialize};
