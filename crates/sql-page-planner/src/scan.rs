//! Minimal SQL text scanner: quote, comment, and parenthesis-depth aware
//!
//! The CTE splice needs the closing parenthesis that terminates the CTE body.
//! A plain reverse text search breaks on `)` characters inside string
//! literals, quoted identifiers, or comments, so the scanner walks the text
//! forward tracking quoting/comment state and depth instead.

/// Advance the scanner index past a quoted literal or identifier.
///
/// `quote` is the opening quote character (`'`, `"`, or `` ` ``). Handles
/// SQL-standard doubled-quote escaping (`''` or `""`).
fn skip_quoted(bytes: &[u8], len: usize, i: usize, quote: u8) -> usize {
   let mut j = i + 1;
   while j < len {
      if bytes[j] == quote {
         // Doubled quote is an escape; skip both and continue
         if j + 1 < len && bytes[j + 1] == quote {
            j += 2;
            continue;
         }
         // End of quoted section
         return j;
      }
      j += 1;
   }
   j // unterminated, return end
}

/// Advance the scanner index past a `[bracketed]` identifier (SQL Server
/// style). `]]` escapes a literal bracket.
fn skip_bracketed(bytes: &[u8], len: usize, i: usize) -> usize {
   let mut j = i + 1;
   while j < len {
      if bytes[j] == b']' {
         if j + 1 < len && bytes[j + 1] == b']' {
            j += 2;
            continue;
         }
         return j;
      }
      j += 1;
   }
   j
}

/// Advance the scanner index past a `--` line comment (until newline or end).
fn skip_line_comment(bytes: &[u8], len: usize, i: usize) -> usize {
   let mut j = i + 2; // skip the `--`
   while j < len && bytes[j] != b'\n' {
      j += 1;
   }
   j
}

/// Advance the scanner index past a `/* … */` block comment.
fn skip_block_comment(bytes: &[u8], len: usize, i: usize) -> usize {
   let mut j = i + 2; // skip the `/*`
   while j + 1 < len {
      if bytes[j] == b'*' && bytes[j + 1] == b'/' {
         return j + 1; // position of the closing `/`
      }
      j += 1;
   }
   len.saturating_sub(1) // unterminated, return end
}

/// Byte offset of the last `)` that closes a top-level parenthesized group
/// (the one bringing the depth back to zero), ignoring parentheses inside string
/// literals, quoted identifiers, and comments.
///
/// For a well-formed `WITH name AS ( … )` text this is the parenthesis that
/// terminates the CTE body. Returns `None` when no such parenthesis exists.
pub(crate) fn last_top_level_closing_paren(sql: &str) -> Option<usize> {
   let bytes = sql.as_bytes();
   let len = bytes.len();
   let mut depth: i32 = 0;
   let mut last_close = None;
   let mut i = 0;

   while i < len {
      match bytes[i] {
         b'(' => depth += 1,
         b')' => {
            depth -= 1;
            if depth == 0 {
               last_close = Some(i);
            }
         }
         b'\'' => i = skip_quoted(bytes, len, i, b'\''),
         b'"' => i = skip_quoted(bytes, len, i, b'"'),
         b'`' => i = skip_quoted(bytes, len, i, b'`'),
         b'[' => i = skip_bracketed(bytes, len, i),
         b'-' if i + 1 < len && bytes[i + 1] == b'-' => {
            i = skip_line_comment(bytes, len, i);
         }
         b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
            i = skip_block_comment(bytes, len, i);
         }
         _ => {}
      }
      i += 1;
   }

   last_close
}
