//! Page request/result carriers and pagination arithmetic

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A validated page request.
///
/// Both fields are 1-based: the first page is `page_index = 1`. Requests that
/// violate the minimums are rejected at construction rather than clamped;
/// a zero page size or index is a caller bug, not something to paper over.
///
/// The derived bounds are pure arithmetic with no overflow checking; page
/// sizes and indexes large enough to overflow a `u64` are outside the
/// supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
   page_size: u64,
   page_index: u64,
}

impl PageRequest {
   pub fn new(page_size: u64, page_index: u64) -> Result<Self> {
      if page_size < 1 {
         return Err(Error::InvalidPageSize(page_size));
      }
      if page_index < 1 {
         return Err(Error::InvalidPageIndex(page_index));
      }
      Ok(Self {
         page_size,
         page_index,
      })
   }

   pub fn page_size(&self) -> u64 {
      self.page_size
   }

   pub fn page_index(&self) -> u64 {
      self.page_index
   }

   /// Rows skipped before this page: `page_size * (page_index - 1)`.
   pub fn offset(&self) -> u64 {
      self.page_size * (self.page_index - 1)
   }

   /// 1-based rank of the first row of this page.
   pub fn row_start(&self) -> u64 {
      self.offset() + 1
   }

   /// 1-based rank of the last row of this page.
   pub fn row_end(&self) -> u64 {
      self.page_size * self.page_index
   }
}

/// A page of results with the total row count of the filtered query.
///
/// `total` counts every row matching the base query, independent of which
/// page was requested; `items` holds at most `page_size` rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
   pub items: Vec<T>,
   pub total: i64,
   pub page_size: u64,
   pub page_index: u64,
   pub total_pages: u64,
}

impl<T> Page<T> {
   pub fn new(items: Vec<T>, request: &PageRequest, total: i64) -> Self {
      let total_rows = total.max(0) as u64;
      let total_pages = total_rows.div_ceil(request.page_size());
      Self {
         items,
         total,
         page_size: request.page_size(),
         page_index: request.page_index(),
         total_pages,
      }
   }
}
