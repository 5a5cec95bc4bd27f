//! # sql-page-planner
//!
//! Pure pagination planning for SQL repositories: given a base query, an
//! ordering specification, and a page request, synthesize the dialect-correct
//! count + windowed page statement pair, or order rows in memory with the
//! same multi-key semantics.
//!
//! ## Core Types
//!
//! - **[`PagePlanner`]**: per-(dialect, server version) statement synthesis
//! - **[`Dialect`]** / **[`DialectInfo`]**: engine identification and the
//!   legacy-vs-modern windowing cutover
//! - **[`PageRequest`]** / **[`Page`]**: validated request and result carriers
//! - **[`SortKey`]** / **[`SortPlan`]**: multi-key ordering for SQL fragments
//!   and in-memory sorting
//! - **[`Error`]**: planning error type
//!
//! Everything here is a side-effect-free transformation over its inputs; no
//! statement is executed and no state is shared between calls.

mod dialect;
mod error;
mod order;
mod page;
mod planner;
mod scan;

// Re-export public types
pub use dialect::{Dialect, DialectInfo};
pub use error::{Error, Result};
pub use order::{
   DynamicRow, SortDirection, SortKey, SortPlan, TypedSortKey, render_order_by, resolve_sort_keys,
   row_sort_plan,
};
pub use page::{Page, PageRequest};
pub use planner::{PagePlanner, PlannedPage, PlannerConfig, QueryForm};
