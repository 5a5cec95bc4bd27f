//! Per-dialect synthesis of count + windowed page statements
//!
//! One `WindowRenderer` implementation per dialect keeps each engine's
//! windowing idiom isolated; the planner only decides where the ORDER BY
//! fragment travels (inside the CTE body or in the terminal select) and
//! stitches the pieces together.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::order::{SortKey, render_order_by};
use crate::page::PageRequest;
use crate::scan::last_top_level_closing_paren;

/// How the base query text is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
   /// A bare SELECT usable as a derived table: `SELECT … FROM …`.
   Plain,
   /// A complete CTE definition ending with its closing parenthesis:
   /// `WITH T AS ( … )`. The planner appends terminal selects against the
   /// named result `T`.
   WithCte,
}

/// The statement pair produced for one page request. The count statement
/// projects the total under the `TOTAL` alias; the page statement returns the
/// bounded window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPage {
   pub count_sql: String,
   pub page_sql: String,
}

/// Planner configuration, fixed at construction.
///
/// `count_syntax` is substituted verbatim into the count select, so it can be
/// swapped for `COUNT(*)` or a dialect-tuned expression per repository
/// instance without any shared mutable state.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
   pub count_syntax: String,
}

impl Default for PlannerConfig {
   fn default() -> Self {
      Self {
         count_syntax: "COUNT(1)".to_string(),
      }
   }
}

/// Plans dialect-correct count + page SQL for one (dialect, server version)
/// pair.
///
/// Immutable after construction and free of side effects, so a single planner
/// can serve concurrent callers without synchronization.
#[derive(Debug, Clone)]
pub struct PagePlanner {
   dialect: Dialect,
   server_major: u32,
   count_syntax: String,
}

/// Where the page statement reads its rows from.
enum Source<'a> {
   /// The base query wrapped as a derived table.
   Derived(&'a str),
   /// A named CTE result.
   Named(&'a str),
}

impl PagePlanner {
   pub fn new(dialect: Dialect, server_major: u32, config: PlannerConfig) -> Self {
      Self {
         dialect,
         server_major,
         count_syntax: config.count_syntax,
      }
   }

   pub fn dialect(&self) -> Dialect {
      self.dialect
   }

   pub fn server_major(&self) -> u32 {
      self.server_major
   }

   pub fn count_syntax(&self) -> &str {
      &self.count_syntax
   }

   /// Synthesize the count + page statement pair for `base_sql`.
   ///
   /// The base text may carry a trailing semicolon; it is stripped before
   /// composition. `keys` may be empty; dialects whose windowing demands a
   /// deterministic ORDER BY substitute a constant expression, the rest
   /// paginate the unordered result.
   pub fn plan(
      &self,
      base_sql: &str,
      form: QueryForm,
      keys: &[SortKey],
      page: &PageRequest,
   ) -> Result<PlannedPage> {
      let base = base_sql.trim().trim_end_matches(';').trim_end();
      let order_by = render_order_by(keys)?;
      let renderer = renderer_for(self.dialect, self.server_major);

      match form {
         QueryForm::Plain => {
            let source = Source::Derived(base);
            Ok(PlannedPage {
               count_sql: renderer.render_count(&self.count_syntax, &source),
               page_sql: renderer.render_page(&source, order_by.as_deref(), page),
            })
         }
         QueryForm::WithCte => {
            let source = Source::Named("T");
            let count_sql =
               format!("{base} {}", renderer.render_count(&self.count_syntax, &source));

            // The ORDER BY fragment normally rides inside the CTE body; it
            // stays in the terminal select only for dialects whose windowing
            // clause itself carries the ordering.
            let (cte_text, terminal_order) = match &order_by {
               Some(fragment) if !renderer.order_in_terminal() => {
                  (splice_order_into_cte(base, fragment)?, None)
               }
               _ => (base.to_string(), order_by.as_deref()),
            };

            let page_sql = format!(
               "{cte_text} {}",
               renderer.render_page(&source, terminal_order, page)
            );
            Ok(PlannedPage {
               count_sql,
               page_sql,
            })
         }
      }
   }
}

/// Insert the ORDER BY fragment immediately before the parenthesis that
/// closes the CTE body.
fn splice_order_into_cte(cte: &str, order_by: &str) -> Result<String> {
   let pos = last_top_level_closing_paren(cte).ok_or(Error::CteMissingClosingParen)?;
   let body = cte[..pos].trim_end();
   Ok(format!("{body} {order_by}{}", &cte[pos..]))
}

/// Per-dialect rendering strategy for the count select and the windowed page
/// select.
trait WindowRenderer {
   fn render_count(&self, count_syntax: &str, source: &Source<'_>) -> String;

   fn render_page(&self, source: &Source<'_>, order_by: Option<&str>, page: &PageRequest)
   -> String;

   /// Whether the ORDER BY fragment belongs in the terminal select of the CTE
   /// form instead of being spliced into the CTE body. SQL Server requires
   /// this: its OFFSET/FETCH and ROW_NUMBER idioms carry the ordering
   /// themselves, and an ORDER BY inside a CTE body is invalid there.
   fn order_in_terminal(&self) -> bool {
      false
   }
}

fn renderer_for(dialect: Dialect, server_major: u32) -> Box<dyn WindowRenderer> {
   let legacy = dialect.uses_legacy_windowing(server_major);
   match dialect {
      Dialect::SqlServer => Box::new(SqlServerRenderer { legacy }),
      Dialect::Oracle => Box::new(OracleRenderer { legacy }),
      Dialect::MySql | Dialect::Sqlite | Dialect::PostgreSql => Box::new(LimitOffsetRenderer),
   }
}

/// `LIMIT … OFFSET` engines: PostgreSQL, MySQL, SQLite. No legacy branch.
struct LimitOffsetRenderer;

impl WindowRenderer for LimitOffsetRenderer {
   fn render_count(&self, count_syntax: &str, source: &Source<'_>) -> String {
      match source {
         Source::Derived(query) => format!("SELECT {count_syntax} AS TOTAL FROM ({query}) AS T"),
         Source::Named(name) => format!("SELECT {count_syntax} AS TOTAL FROM {name}"),
      }
   }

   fn render_page(
      &self,
      source: &Source<'_>,
      order_by: Option<&str>,
      page: &PageRequest,
   ) -> String {
      let from = match source {
         Source::Derived(query) => format!("({query}) AS X"),
         Source::Named(name) => (*name).to_string(),
      };
      let limit = page.page_size();
      let offset = page.offset();
      match order_by {
         Some(order) => format!("SELECT * FROM {from} {order} LIMIT {limit} OFFSET {offset}"),
         None => format!("SELECT * FROM {from} LIMIT {limit} OFFSET {offset}"),
      }
   }
}

/// SQL Server: `ROW_NUMBER()` emulation before 2012, `OFFSET … FETCH` after.
struct SqlServerRenderer {
   legacy: bool,
}

impl WindowRenderer for SqlServerRenderer {
   fn render_count(&self, count_syntax: &str, source: &Source<'_>) -> String {
      match source {
         Source::Derived(query) => {
            format!("SELECT {count_syntax} AS [TOTAL] FROM ({query}) AS T")
         }
         Source::Named(name) => format!("SELECT {count_syntax} AS [TOTAL] FROM {name}"),
      }
   }

   fn render_page(
      &self,
      source: &Source<'_>,
      order_by: Option<&str>,
      page: &PageRequest,
   ) -> String {
      // Both generations require an ORDER BY; without a caller-specified
      // order a constant expression keeps the statement valid.
      let order = order_by.unwrap_or("ORDER BY (SELECT 0)");

      if self.legacy {
         let from = match source {
            Source::Derived(query) => format!("({query}) AS X"),
            Source::Named(name) => format!("{name} AS X"),
         };
         format!(
            "SELECT * FROM (SELECT ROW_NUMBER() OVER ({order}) AS ROWNUMBER, X.* FROM {from}) AS W \
             WHERE W.ROWNUMBER BETWEEN {start} AND {end}",
            start = page.row_start(),
            end = page.row_end(),
         )
      } else {
         let from = match source {
            Source::Derived(query) => format!("({query}) AS T"),
            Source::Named(name) => (*name).to_string(),
         };
         format!(
            "SELECT * FROM {from} {order} OFFSET {offset} ROWS FETCH NEXT {size} ROWS ONLY",
            offset = page.offset(),
            size = page.page_size(),
         )
      }
   }

   fn order_in_terminal(&self) -> bool {
      true
   }
}

/// Oracle: `ROWNUM` double wrap before 12c, `OFFSET … FETCH` after.
struct OracleRenderer {
   legacy: bool,
}

impl WindowRenderer for OracleRenderer {
   fn render_count(&self, count_syntax: &str, source: &Source<'_>) -> String {
      // Oracle rejects `AS` before a table alias.
      match source {
         Source::Derived(query) => format!("SELECT {count_syntax} AS \"TOTAL\" FROM ({query}) T"),
         Source::Named(name) => format!("SELECT {count_syntax} AS \"TOTAL\" FROM {name}"),
      }
   }

   fn render_page(
      &self,
      source: &Source<'_>,
      order_by: Option<&str>,
      page: &PageRequest,
   ) -> String {
      if self.legacy {
         // Inner wrap caps ROWNUM at the window's end before numbering is
         // frozen; the outer wrap trims the front.
         let (inner, outer_alias) = match source {
            Source::Derived(query) => {
               let inner = match order_by {
                  Some(order) => format!("({query} {order}) X"),
                  None => format!("({query}) X"),
               };
               (inner, " T")
            }
            Source::Named(name) => (format!("{name} X"), ""),
         };
         format!(
            "SELECT * FROM (SELECT X.*, ROWNUM AS \"ROWNUMBER\" FROM {inner} \
             WHERE ROWNUM <= {end}){outer_alias} WHERE \"ROWNUMBER\" >= {start}",
            start = page.row_start(),
            end = page.row_end(),
         )
      } else {
         let from = match source {
            Source::Derived(query) => match order_by {
               Some(order) => format!("({query} {order}) T"),
               None => format!("({query}) T"),
            },
            Source::Named(name) => (*name).to_string(),
         };
         format!(
            "SELECT * FROM {from} OFFSET {offset} ROWS FETCH NEXT {size} ROWS ONLY",
            offset = page.offset(),
            size = page.page_size(),
         )
      }
   }
}
