//! SQL dialect identification and server-version idiom selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// SQL Server gained `OFFSET … FETCH` in version 11 (SQL Server 2012).
const SQL_SERVER_OFFSET_FETCH_MAJOR: u32 = 11;

/// Oracle gained `OFFSET … FETCH` in version 12 (12c).
const ORACLE_OFFSET_FETCH_MAJOR: u32 = 12;

/// The SQL variants the planner can target.
///
/// Selected once per repository instance from the live connection and never
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dialect {
   SqlServer,
   MySql,
   Oracle,
   Sqlite,
   PostgreSql,
}

impl Dialect {
   /// Whether this dialect must fall back to its row-numbering emulation
   /// (`ROW_NUMBER()` on SQL Server, `ROWNUM` on Oracle) for the given server
   /// major version.
   ///
   /// PostgreSQL, MySQL, and SQLite have carried `LIMIT … OFFSET` for every
   /// version this library supports, so they never take the legacy branch.
   pub fn uses_legacy_windowing(self, server_major: u32) -> bool {
      match self {
         Dialect::SqlServer => server_major < SQL_SERVER_OFFSET_FETCH_MAJOR,
         Dialect::Oracle => server_major < ORACLE_OFFSET_FETCH_MAJOR,
         Dialect::MySql | Dialect::Sqlite | Dialect::PostgreSql => false,
      }
   }

   /// Positional bind-parameter marker for this dialect, 1-based.
   pub fn placeholder(self, index: usize) -> String {
      match self {
         Dialect::PostgreSql => format!("${index}"),
         Dialect::Oracle => format!(":{index}"),
         Dialect::SqlServer => format!("@p{index}"),
         Dialect::MySql | Dialect::Sqlite => "?".to_string(),
      }
   }
}

impl FromStr for Dialect {
   type Err = Error;

   /// Parse a dialect name as reported by a connection/driver registry.
   ///
   /// Unknown names are a configuration error, not a fallback case.
   fn from_str(name: &str) -> Result<Self, Error> {
      match name.to_ascii_lowercase().as_str() {
         "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
         "mysql" | "mariadb" => Ok(Dialect::MySql),
         "oracle" => Ok(Dialect::Oracle),
         "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
         "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
         other => Err(Error::UnsupportedDialect(other.to_string())),
      }
   }
}

impl fmt::Display for Dialect {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let name = match self {
         Dialect::SqlServer => "sqlserver",
         Dialect::MySql => "mysql",
         Dialect::Oracle => "oracle",
         Dialect::Sqlite => "sqlite",
         Dialect::PostgreSql => "postgresql",
      };
      f.write_str(name)
   }
}

/// Dialect plus server major version, resolved once from the live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialectInfo {
   pub dialect: Dialect,
   pub server_major: u32,
}

impl DialectInfo {
   pub fn new(dialect: Dialect, server_major: u32) -> Self {
      Self {
         dialect,
         server_major,
      }
   }
}
