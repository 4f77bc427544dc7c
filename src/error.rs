//! API error type rendered through the response envelope.

use crate::{ai::AiError, models::response::ApiResponse};
use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("Method not allowed")]
  MethodNotAllowed,

  #[error("{0}")]
  Database(#[from] sqlx::Error),

  #[error("{0}")]
  Ai(#[from] AiError),

  #[error("{0}")]
  Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
  pub fn bad_request(msg: impl Into<String>) -> Self {
    ApiError::BadRequest(msg.into())
  }

  pub fn unauthorized(msg: impl Into<String>) -> Self {
    ApiError::Unauthorized(msg.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
      ApiError::Database(_) | ApiError::Ai(_) | ApiError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!("request failed: {self}");
    }
    ApiResponse::failure(status, self.to_string()).into_response()
  }
}
