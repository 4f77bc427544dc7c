//! HTTP router and handlers.

use crate::{
  app::AppState,
  auth::require_auth,
  error::{ApiError, ApiResult},
};
use axum::{
  extract::rejection::JsonRejection,
  middleware,
  routing::{delete, get, patch, post},
  Json, Router,
};
use serde_json::Value;

pub mod auth;
pub mod delete;
pub mod inboxes;
pub mod list;
pub mod mark;
pub mod receive;
pub mod translate;
pub mod ui;
pub mod update;

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
  ApiError::MethodNotAllowed
}

/// Unwrap a JSON body, turning extractor rejections into 400 envelopes.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
  body
    .map(|Json(v)| v)
    .map_err(|e| ApiError::bad_request(e.body_text()))
}

/// Loose JSON body used by endpoints that validate shape by hand.
pub(crate) type RawBody = Result<Json<Value>, JsonRejection>;

/// Assemble the HTTP router with all routes.
pub fn build_router(state: AppState) -> Router {
  let protected = Router::new()
    .route(
      "/api/auth/revoke",
      post(auth::revoke).fallback(method_not_allowed),
    )
    .route(
      "/api/email/list",
      get(list::list_emails).fallback(method_not_allowed),
    )
    .route(
      "/api/email/inboxes",
      get(inboxes::list_inboxes).fallback(method_not_allowed),
    )
    .route(
      "/api/email/recipients",
      get(inboxes::list_recipients).fallback(method_not_allowed),
    )
    .route(
      "/api/email/delete",
      delete(delete::delete_emails).fallback(method_not_allowed),
    )
    .route(
      "/api/email/delete-by-inbox",
      delete(delete::delete_by_inbox).fallback(method_not_allowed),
    )
    .route(
      "/api/email/mark",
      post(mark::mark_email).fallback(method_not_allowed),
    )
    .route(
      "/api/email/mark-batch",
      post(mark::mark_batch).fallback(method_not_allowed),
    )
    .route(
      "/api/email/mark-all-read",
      post(mark::mark_all_read).fallback(method_not_allowed),
    )
    .route(
      "/api/email/update",
      patch(update::update_email).fallback(method_not_allowed),
    )
    .route(
      "/api/email/translate",
      post(translate::translate_email).fallback(method_not_allowed),
    )
    .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

  Router::new()
    .route("/", get(ui::ui_index))
    .route(
      "/api/auth/login",
      post(auth::login).fallback(method_not_allowed),
    )
    .route(
      "/api/email/receive",
      post(receive::receive_email).fallback(method_not_allowed),
    )
    .merge(protected)
    .with_state(state)
}
