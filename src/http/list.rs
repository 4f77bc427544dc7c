//! Email list with push-down filters and a regex fallback.

use crate::{
  app::AppState,
  db::{self, email::EmailFilter},
  error::{ApiError, ApiResult},
  models::{
    email::{ApiEmail, DbEmail, EmailType},
    response::ApiResponse,
  },
  search::{self, SCAN_CAP},
};
use axum::extract::{rejection::QueryRejection, Query, State};
use regex::Regex;
use sqlx::SqlitePool;
use tracing::warn;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 100;

/// Raw query pairs; keys may repeat.
pub type QueryPairs = Vec<(String, String)>;

pub(crate) fn first<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
  pairs
    .iter()
    .find(|(k, _)| k == key)
    .map(|(_, v)| v.as_str())
}

pub(crate) fn all<'a>(pairs: &'a [(String, String)], key: &'a str) -> impl Iterator<Item = &'a str> {
  pairs
    .iter()
    .filter(move |(k, _)| k == key)
    .map(|(_, v)| v.as_str())
}

pub(crate) fn is_regex_flag(pairs: &[(String, String)]) -> bool {
  matches!(first(pairs, "search_regex"), Some("1" | "true"))
}

pub(crate) fn query_pairs(query: Result<Query<QueryPairs>, QueryRejection>) -> ApiResult<QueryPairs> {
  query
    .map(|Query(pairs)| pairs)
    .map_err(|e| ApiError::bad_request(e.body_text()))
}

/// Validated list parameters.
#[derive(Debug, Clone)]
pub struct ListQuery {
  pub limit: i64,
  pub offset: i64,
  /// Filters for the store; `search` is only set outside regex mode.
  pub filter: EmailFilter,
  pub pattern: Option<Regex>,
}

impl ListQuery {
  pub fn parse(pairs: &[(String, String)]) -> ApiResult<Self> {
    let limit = match first(pairs, "limit") {
      Some(v) => v
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| (1..=MAX_LIMIT).contains(n))
        .ok_or_else(|| ApiError::bad_request("Limit must be a number between 1 and 100"))?,
      None => DEFAULT_LIMIT,
    };

    let offset = match first(pairs, "offset") {
      Some(v) => v
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| ApiError::bad_request("Offset must be a non-negative number"))?,
      None => 0,
    };

    let read_status = match first(pairs, "read_status").map(str::trim) {
      Some("0") => Some(false),
      Some("1") => Some(true),
      Some(_) => {
        return Err(ApiError::bad_request(
          "read_status must be 0 (unread) or 1 (read)",
        ))
      }
      None => None,
    };

    let email_types = match first(pairs, "email_type") {
      Some(v) => EmailType::parse_list(v).map_err(|_| ApiError::bad_request("Invalid email type"))?,
      None => Vec::new(),
    };

    let mut recipients = Vec::new();
    let mut recipient_given = false;
    for v in all(pairs, "recipient") {
      recipient_given = true;
      recipients.extend(
        v.split(',')
          .map(str::trim)
          .filter(|r| !r.is_empty())
          .map(str::to_string),
      );
    }
    if recipient_given && recipients.is_empty() {
      return Err(ApiError::bad_request("recipient must be a non-empty string"));
    }

    let search = first(pairs, "search")
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_string);

    let (search, pattern) = match search {
      Some(s) if is_regex_flag(pairs) => {
        let re = search::compile(&s).map_err(|_| ApiError::bad_request("Invalid regex pattern"))?;
        (None, Some(re))
      }
      other => (other, None),
    };

    Ok(ListQuery {
      limit,
      offset,
      filter: EmailFilter {
        read_status,
        email_types,
        recipients,
        search,
      },
      pattern,
    })
  }
}

/// Scan the newest `cap` rows matching `filter`, keep those matching `re`,
/// and return one window plus the matched count. Older rows are never seen.
pub async fn regex_page(
  pool: &SqlitePool,
  filter: &EmailFilter,
  re: &Regex,
  cap: i64,
  offset: i64,
  limit: i64,
) -> Result<(Vec<DbEmail>, i64), sqlx::Error> {
  let rows = db::email::list(pool, filter, cap, 0).await?;
  if rows.len() as i64 >= cap {
    warn!("regex search reached the {cap} row scan cap; older emails were not searched");
  }
  let filtered = search::filter_all(rows, std::slice::from_ref(re));
  let total = filtered.len() as i64;
  Ok((search::page(filtered, offset as usize, limit as usize), total))
}

pub async fn list_emails(
  State(state): State<AppState>,
  query: Result<Query<QueryPairs>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<ApiEmail>>> {
  let q = ListQuery::parse(&query_pairs(query)?)?;

  if let Some(re) = &q.pattern {
    let (rows, total) = regex_page(&state.db, &q.filter, re, SCAN_CAP, q.offset, q.limit).await?;
    let data = rows.into_iter().map(ApiEmail::from).collect();
    return Ok(ApiResponse::ok(data).with_total(total));
  }

  let (rows, total) = tokio::join!(
    db::email::list(&state.db, &q.filter, q.limit, q.offset),
    db::email::count(&state.db, &q.filter),
  );
  let data = rows?.into_iter().map(ApiEmail::from).collect();
  Ok(ApiResponse::ok(data).with_total(total?))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{db::memory_pool, models::email::NewEmail};
  use chrono::{TimeZone, Utc};

  fn pairs(q: &[(&str, &str)]) -> QueryPairs {
    q.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  fn error_of(q: &[(&str, &str)]) -> String {
    ListQuery::parse(&pairs(q)).unwrap_err().to_string()
  }

  #[test]
  fn defaults() {
    let q = ListQuery::parse(&[]).unwrap();
    assert_eq!((q.limit, q.offset), (100, 0));
    assert_eq!(q.filter, EmailFilter::default());
    assert!(q.pattern.is_none());
  }

  #[test]
  fn pagination_bounds() {
    assert_eq!(error_of(&[("limit", "0")]), "Limit must be a number between 1 and 100");
    assert_eq!(error_of(&[("limit", "101")]), "Limit must be a number between 1 and 100");
    assert_eq!(error_of(&[("limit", "ten")]), "Limit must be a number between 1 and 100");
    assert_eq!(error_of(&[("offset", "-1")]), "Offset must be a non-negative number");
    let q = ListQuery::parse(&pairs(&[("limit", "1"), ("offset", "250")])).unwrap();
    assert_eq!((q.limit, q.offset), (1, 250));
  }

  #[test]
  fn read_status_and_types() {
    assert_eq!(
      error_of(&[("read_status", "2")]),
      "read_status must be 0 (unread) or 1 (read)"
    );
    assert_eq!(error_of(&[("email_type", "auth_code,junk")]), "Invalid email type");
    let q = ListQuery::parse(&pairs(&[("read_status", "0"), ("email_type", "auth_code, none")]))
      .unwrap();
    assert_eq!(q.filter.read_status, Some(false));
    assert_eq!(q.filter.email_types, vec![EmailType::AuthCode, EmailType::None]);
  }

  #[test]
  fn recipients_accept_repeats_and_commas() {
    let q = ListQuery::parse(&pairs(&[
      ("recipient", "a@x.test, b@x.test"),
      ("recipient", "c@x.test"),
    ]))
    .unwrap();
    assert_eq!(q.filter.recipients, vec!["a@x.test", "b@x.test", "c@x.test"]);
    assert_eq!(
      error_of(&[("recipient", " , ")]),
      "recipient must be a non-empty string"
    );
  }

  #[test]
  fn search_modes() {
    let q = ListQuery::parse(&pairs(&[("search", "  invoice ")])).unwrap();
    assert_eq!(q.filter.search.as_deref(), Some("invoice"));
    assert!(q.pattern.is_none());

    let q = ListQuery::parse(&pairs(&[("search", "inv.ice"), ("search_regex", "true")])).unwrap();
    assert!(q.filter.search.is_none());
    assert!(q.pattern.unwrap().is_match("INVOICE"));

    assert_eq!(
      error_of(&[("search", "("), ("search_regex", "1")]),
      "Invalid regex pattern"
    );
    // without the flag the same text is a plain substring
    assert!(ListQuery::parse(&pairs(&[("search", "(")])).is_ok());
  }

  #[tokio::test]
  async fn regex_scan_stops_at_the_cap() {
    let pool = memory_pool().await;
    let mut ids = Vec::new();
    for day in 1..=4 {
      let email = NewEmail {
        message_id: Some(format!("<inv{day}@shop.test>")),
        title: Some(format!("Invoice {day}")),
        sent_at: Some(Utc.with_ymd_and_hms(2025, 7, day, 10, 0, 0).unwrap()),
        received_at: Utc::now(),
        ..NewEmail::default()
      };
      ids.push(db::email::create(&pool, &email).await.unwrap().id);
    }
    let re = search::compile("invoice").unwrap();

    let (rows, total) = regex_page(&pool, &EmailFilter::default(), &re, 3, 0, 10)
      .await
      .unwrap();
    assert_eq!(total, 3);
    let got: Vec<i64> = rows.iter().map(|e| e.id).collect();
    assert_eq!(got, vec![ids[3], ids[2], ids[1]]);
    assert!(!got.contains(&ids[0]));

    let (rows, total) = regex_page(&pool, &EmailFilter::default(), &re, 3, 2, 10)
      .await
      .unwrap();
    assert_eq!(total, 3);
    assert_eq!(rows.len(), 1);

    let (_, total) = regex_page(&pool, &EmailFilter::default(), &re, SCAN_CAP, 0, 10)
      .await
      .unwrap();
    assert_eq!(total, 4);
  }
}
