//! Manual correction of an extraction result.

use crate::{
  app::AppState,
  db,
  error::{ApiError, ApiResult},
  models::{email::EmailType, response::ApiResponse},
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
  pub email_id: i64,
  #[serde(default)]
  pub email_result: Option<String>,
  pub email_type: String,
}

pub async fn update_email(
  State(state): State<AppState>,
  body: Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<()>> {
  let req = super::json_body(body)?;
  let email_type = req
    .email_type
    .trim()
    .parse::<EmailType>()
    .map_err(|_| ApiError::bad_request("Invalid email type"))?;

  let updated = db::email::update_extraction(
    &state.db,
    req.email_id,
    req.email_result.as_deref(),
    email_type,
  )
  .await?;
  if updated == 0 {
    return Err(ApiError::NotFound("Email not found".into()));
  }
  Ok(ApiResponse::empty())
}
