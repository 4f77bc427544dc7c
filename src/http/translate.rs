//! AI translation of a message body.

use super::RawBody;
use crate::{
  ai::translate::{self, MAX_CONTENT_CHARS},
  app::AppState,
  error::{ApiError, ApiResult},
  models::response::ApiResponse,
};
use axum::extract::State;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
  pub text: String,
  pub html: Option<String>,
}

fn parse_request(body: &Value) -> ApiResult<(String, Option<String>)> {
  let content = body
    .get("content")
    .and_then(Value::as_str)
    .filter(|c| !c.trim().is_empty())
    .ok_or_else(|| ApiError::bad_request("content is required and must be a string"))?;
  if content.chars().count() > MAX_CONTENT_CHARS {
    return Err(ApiError::bad_request(format!(
      "Content too long, max {MAX_CONTENT_CHARS} characters"
    )));
  }
  let html = body
    .get("contentHtml")
    .and_then(Value::as_str)
    .filter(|h| !h.trim().is_empty())
    .map(str::to_string);
  Ok((content.to_string(), html))
}

pub async fn translate_email(
  State(state): State<AppState>,
  body: RawBody,
) -> ApiResult<ApiResponse<TranslateResponse>> {
  let (content, html) = parse_request(&super::json_body(body)?)?;

  let (text, html) = match html {
    Some(html) => {
      let (text, html) = tokio::try_join!(
        translate::translate_text(&state.ai, &content),
        translate::translate_html(&state.ai, &html, &content),
      )?;
      (text, Some(html))
    }
    None => (translate::translate_text(&state.ai, &content).await?, None),
  };
  Ok(ApiResponse::ok(TranslateResponse { text, html }))
}
