//! Read-status toggles.

use super::{
  list::{first, query_pairs, QueryPairs},
  RawBody,
};
use crate::{
  app::AppState,
  db,
  error::{ApiError, ApiResult},
  models::response::ApiResponse,
};
use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct MarkAllResponse {
  pub count: u64,
}

fn read_flag(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => match n.as_i64() {
      Some(0) => Some(false),
      Some(1) => Some(true),
      _ => None,
    },
    Value::String(s) => match s.trim() {
      "0" => Some(false),
      "1" => Some(true),
      _ => None,
    },
    _ => None,
  }
}

fn parse_batch(body: &Value) -> ApiResult<(Vec<i64>, bool)> {
  let ids = body
    .get("ids")
    .and_then(Value::as_array)
    .filter(|ids| !ids.is_empty())
    .ok_or_else(|| ApiError::bad_request("ids must be a non-empty array"))?
    .iter()
    .map(|v| v.as_i64().filter(|id| *id > 0))
    .collect::<Option<Vec<_>>>()
    .ok_or_else(|| ApiError::bad_request("ids must be positive integers"))?;
  let read = body
    .get("isRead")
    .and_then(read_flag)
    .ok_or_else(|| ApiError::bad_request("isRead must be 0 or 1"))?;
  Ok((ids, read))
}

pub async fn mark_email(
  State(state): State<AppState>,
  query: Result<Query<QueryPairs>, QueryRejection>,
) -> ApiResult<ApiResponse<()>> {
  let pairs = query_pairs(query)?;
  let id = first(&pairs, "id")
    .and_then(|v| v.trim().parse::<i64>().ok())
    .filter(|id| *id > 0)
    .ok_or_else(|| ApiError::bad_request("id must be a positive integer"))?;
  let read = first(&pairs, "is_read")
    .and_then(|v| read_flag(&Value::String(v.to_string())))
    .ok_or_else(|| ApiError::bad_request("is_read must be 0 or 1"))?;

  if db::email::set_read_status(&state.db, &[id], read).await? == 0 {
    return Err(ApiError::NotFound("Email not found".into()));
  }
  Ok(ApiResponse::empty())
}

pub async fn mark_batch(
  State(state): State<AppState>,
  body: RawBody,
) -> ApiResult<ApiResponse<()>> {
  let (ids, read) = parse_batch(&super::json_body(body)?)?;
  db::email::set_read_status(&state.db, &ids, read).await?;
  Ok(ApiResponse::empty())
}

pub async fn mark_all_read(
  State(state): State<AppState>,
  query: Result<Query<QueryPairs>, QueryRejection>,
) -> ApiResult<ApiResponse<MarkAllResponse>> {
  let pairs = query_pairs(query)?;
  let recipient = first(&pairs, "recipient")
    .map(str::trim)
    .filter(|r| !r.is_empty());
  let count = db::email::mark_all_read(&state.db, recipient).await?;
  Ok(ApiResponse::ok(MarkAllResponse { count }))
}
