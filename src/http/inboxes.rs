//! Recipient listings for the sidebar.

use super::list::{all, is_regex_flag, query_pairs, QueryPairs};
use crate::{
  app::AppState,
  db::{self, email::EmailFilter},
  error::{ApiError, ApiResult},
  models::{inbox::Inbox, response::ApiResponse},
  search::{self, SCAN_CAP},
};
use axum::extract::{rejection::QueryRejection, Query, State};

pub async fn list_inboxes(
  State(state): State<AppState>,
  query: Result<Query<QueryPairs>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<Inbox>>> {
  let pairs = query_pairs(query)?;
  let terms: Vec<String> = all(&pairs, "search")
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_string)
    .collect();

  if terms.is_empty() || !is_regex_flag(&pairs) {
    let inboxes = db::email::inboxes(&state.db, &terms).await?;
    return Ok(ApiResponse::ok(inboxes));
  }

  let patterns = terms
    .iter()
    .map(|t| search::compile(t.as_str()))
    .collect::<Result<Vec<_>, _>>()
    .map_err(|_| ApiError::bad_request("Invalid regex pattern"))?;
  let rows = db::email::list(&state.db, &EmailFilter::default(), SCAN_CAP, 0).await?;
  let matched = search::filter_all(rows, &patterns);
  Ok(ApiResponse::ok(search::aggregate_inboxes(&matched)))
}

pub async fn list_recipients(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<String>>> {
  Ok(ApiResponse::ok(db::email::recipients(&state.db).await?))
}
