//! Inbound webhook accepting raw RFC 822 messages.

use crate::{
  app::AppState,
  error::{ApiError, ApiResult},
  ingest::{self, Envelope},
  models::response::ApiResponse,
};
use axum::{body::Bytes, extract::State, http::HeaderMap};
use serde::Serialize;

pub const INGEST_TOKEN_HEADER: &str = "x-ingest-token";
pub const ENVELOPE_FROM_HEADER: &str = "x-envelope-from";
pub const ENVELOPE_TO_HEADER: &str = "x-envelope-to";

#[derive(Debug, Serialize)]
pub struct ReceiveResponse {
  pub id: i64,
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}

fn check_token(expected: Option<&str>, headers: &HeaderMap) -> ApiResult<()> {
  match (expected, header_str(headers, INGEST_TOKEN_HEADER)) {
    (Some(want), Some(got)) if want == got => Ok(()),
    _ => Err(ApiError::Forbidden("Invalid ingest token".into())),
  }
}

pub async fn receive_email(
  State(state): State<AppState>,
  headers: HeaderMap,
  body: Bytes,
) -> ApiResult<ApiResponse<ReceiveResponse>> {
  check_token(state.config.ingest_token.as_deref(), &headers)?;
  if body.is_empty() {
    return Err(ApiError::bad_request("Invalid email message"));
  }
  let envelope = Envelope {
    from: header_str(&headers, ENVELOPE_FROM_HEADER),
    to: header_str(&headers, ENVELOPE_TO_HEADER),
  };
  let stored = ingest::ingest(&state, &body, &envelope).await?;
  Ok(ApiResponse::ok(ReceiveResponse { id: stored.id }))
}
