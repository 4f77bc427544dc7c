//! JSON envelope wrapping every API response.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
  pub success: bool,
  pub status: u16,
  pub data: Option<T>,
  pub error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total: Option<i64>,
}

impl<T: Serialize> ApiResponse<T> {
  pub fn ok(data: T) -> Self {
    ApiResponse {
      success: true,
      status: StatusCode::OK.as_u16(),
      data: Some(data),
      error: None,
      total: None,
    }
  }

  pub fn with_total(mut self, total: i64) -> Self {
    self.total = Some(total);
    self
  }
}

impl ApiResponse<()> {
  /// Success without a payload, serialized as `data: null`.
  pub fn empty() -> Self {
    ApiResponse {
      success: true,
      status: StatusCode::OK.as_u16(),
      data: None,
      error: None,
      total: None,
    }
  }

  pub fn failure(status: StatusCode, error: impl Into<String>) -> Self {
    ApiResponse {
      success: false,
      status: status.as_u16(),
      data: None,
      error: Some(error.into()),
      total: None,
    }
  }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
  fn into_response(self) -> Response {
    let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(self)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn total_is_omitted_unless_set() {
    let v = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
    assert_eq!(
      v,
      json!({"success": true, "status": 200, "data": [1, 2], "error": null})
    );
    let v = serde_json::to_value(ApiResponse::ok(vec![1]).with_total(9)).unwrap();
    assert_eq!(v["total"], 9);
  }

  #[test]
  fn failure_has_null_data() {
    let v = serde_json::to_value(ApiResponse::failure(StatusCode::BAD_REQUEST, "nope")).unwrap();
    assert_eq!(
      v,
      json!({"success": false, "status": 400, "data": null, "error": "nope"})
    );
  }
}
