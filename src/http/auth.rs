//! Token issuance and revocation.

use crate::{
  app::AppState,
  auth,
  error::ApiResult,
  models::response::ApiResponse,
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
  pub username: String,
  pub password: String,
  #[serde(default)]
  pub ttl: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
  pub token: String,
  pub expires_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
  pub revoked_before: i64,
}

pub async fn login(
  State(state): State<AppState>,
  body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<LoginResponse>> {
  let req = super::json_body(body)?;
  let cfg = &state.config.auth;
  auth::check_credentials(cfg, &req.username, &req.password)?;
  let ttl = auth::clamp_ttl(cfg, req.ttl);
  let (token, claims) = auth::issue_token(cfg, Utc::now().timestamp(), ttl)?;
  info!(ttl, "issued api token");
  Ok(ApiResponse::ok(LoginResponse {
    token,
    expires_at: claims.exp,
  }))
}

pub async fn revoke(State(state): State<AppState>) -> ApiResult<ApiResponse<RevokeResponse>> {
  let revoked_before = auth::revoke_all(&state).await?;
  info!(revoked_before, "revoked all tokens issued earlier");
  Ok(ApiResponse::ok(RevokeResponse { revoked_before }))
}
