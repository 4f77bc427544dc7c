//! In-memory regex filtering over a bounded snapshot of the email table.
//!
//! SQLite has no native regex operator here, so pattern search loads at most
//! [`SCAN_CAP`] rows matching the other filters and tests them in process.
//! Rows past the cap are never seen.

use crate::models::{email::DbEmail, inbox::Inbox};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// Upper bound on rows loaded for a regex scan.
pub const SCAN_CAP: i64 = 10_000;

/// Compile a user pattern, case-insensitive.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
  RegexBuilder::new(pattern)
    .case_insensitive(true)
    .size_limit(1 << 20)
    .build()
}

/// True when any of the five search fields matches.
pub fn matches(email: &DbEmail, re: &Regex) -> bool {
  email
    .search_fields()
    .into_iter()
    .flatten()
    .any(|field| re.is_match(field))
}

/// Keep emails matched by every pattern.
pub fn filter_all(emails: Vec<DbEmail>, patterns: &[Regex]) -> Vec<DbEmail> {
  emails
    .into_iter()
    .filter(|e| patterns.iter().all(|re| matches(e, re)))
    .collect()
}

/// Slice an offset/limit window out of an already filtered list.
pub fn page<T>(items: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
  items.into_iter().skip(offset).take(limit).collect()
}

/// Group by recipient, largest inbox first.
pub fn aggregate_inboxes(emails: &[DbEmail]) -> Vec<Inbox> {
  let mut map: HashMap<&str, (i64, i64)> = HashMap::new();
  for e in emails {
    let Some(addr) = e.to_address.as_deref() else {
      continue;
    };
    let entry = map.entry(addr).or_default();
    entry.0 += 1;
    if e.read_status == 0 {
      entry.1 += 1;
    }
  }
  let mut out: Vec<Inbox> = map
    .into_iter()
    .map(|(address, (total, unread))| Inbox {
      address: address.to_string(),
      total,
      unread,
    })
    .collect();
  out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.address.cmp(&b.address)));
  out
}
