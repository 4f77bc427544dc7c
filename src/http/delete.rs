//! Bulk deletion by id or by recipient.

use super::RawBody;
use crate::{
  app::AppState,
  db,
  error::{ApiError, ApiResult},
  models::response::ApiResponse,
};
use axum::extract::State;
use serde_json::Value;
use tracing::info;

fn parse_ids(body: &Value) -> ApiResult<Vec<i64>> {
  let Value::Array(items) = body else {
    return Err(ApiError::bad_request("Request body must be an array of email ids"));
  };
  if items.is_empty() {
    return Err(ApiError::bad_request("At least one email id is required"));
  }
  items
    .iter()
    .map(Value::as_i64)
    .collect::<Option<Vec<_>>>()
    .ok_or_else(|| ApiError::bad_request("All ids must be integers"))
}

fn parse_addresses(body: &Value) -> ApiResult<Vec<String>> {
  let Value::Array(items) = body else {
    return Err(ApiError::bad_request(
      "Request body must be an array of recipient addresses",
    ));
  };
  if items.is_empty() {
    return Err(ApiError::bad_request(
      "At least one recipient address is required",
    ));
  }
  items
    .iter()
    .map(|v| {
      v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
    })
    .collect::<Option<Vec<_>>>()
    .ok_or_else(|| ApiError::bad_request("All addresses must be non-empty strings"))
}

pub async fn delete_emails(
  State(state): State<AppState>,
  body: RawBody,
) -> ApiResult<ApiResponse<()>> {
  let ids = parse_ids(&super::json_body(body)?)?;
  let removed = db::email::delete(&state.db, &ids).await?;
  info!(requested = ids.len(), removed, "deleted emails");
  Ok(ApiResponse::empty())
}

pub async fn delete_by_inbox(
  State(state): State<AppState>,
  body: RawBody,
) -> ApiResult<ApiResponse<()>> {
  let addresses = parse_addresses(&super::json_body(body)?)?;
  let removed = db::email::delete_by_recipients(&state.db, &addresses).await?;
  info!(inboxes = addresses.len(), removed, "deleted emails by inbox");
  Ok(ApiResponse::empty())
}
