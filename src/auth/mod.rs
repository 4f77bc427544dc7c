//! Bearer token issue and verification.
//!
//! Tokens are HS256 JWTs signed with `sha256_hex("{username}:{password}")`, so
//! changing either credential invalidates every outstanding token. Individual
//! logout is not tracked; revocation moves a global issue-time watermark stored
//! in `system_settings`.

use crate::{app::AppState, config::AuthConfig, db::settings, error::ApiError};
use axum::{
  extract::{Request, State},
  http::{header, HeaderMap},
  middleware::Next,
  response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("Server not configured")]
  NotConfigured,

  #[error("Missing authorization header")]
  MissingHeader,

  #[error("Invalid authorization header format")]
  BadHeader,

  #[error("Token user mismatch")]
  UserMismatch,

  #[error("Token has been revoked")]
  Revoked,

  #[error("Invalid or expired token")]
  InvalidToken,

  #[error("Invalid username or password")]
  BadCredentials,

  #[error("failed to sign token: {0}")]
  Signing(jsonwebtoken::errors::Error),
}

impl From<AuthError> for ApiError {
  fn from(e: AuthError) -> Self {
    match e {
      AuthError::NotConfigured | AuthError::Signing(_) => ApiError::Internal(e.to_string()),
      _ => ApiError::Unauthorized(e.to_string()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String,
  pub iat: i64,
  pub exp: i64,
}

fn credentials(auth: &AuthConfig) -> Result<(&str, &str), AuthError> {
  match (auth.username.as_deref(), auth.password.as_deref()) {
    (Some(u), Some(p)) => Ok((u, p)),
    _ => Err(AuthError::NotConfigured),
  }
}

/// Signing secret derived from the configured credentials.
pub fn derive_secret(username: &str, password: &str) -> String {
  hex::encode(Sha256::digest(format!("{username}:{password}").as_bytes()))
}

/// Compare submitted credentials against the configured pair.
pub fn check_credentials(auth: &AuthConfig, username: &str, password: &str) -> Result<(), AuthError> {
  let (u, p) = credentials(auth)?;
  if derive_secret(username, password) == derive_secret(u, p) {
    Ok(())
  } else {
    Err(AuthError::BadCredentials)
  }
}

/// Requested lifetime clamped to the configured bounds; defaults to the minimum.
pub fn clamp_ttl(auth: &AuthConfig, requested: Option<u64>) -> u64 {
  requested
    .unwrap_or(auth.min_ttl)
    .clamp(auth.min_ttl, auth.max_ttl)
}

/// Issue a token valid for `ttl` seconds from `now`.
pub fn issue_token(auth: &AuthConfig, now: i64, ttl: u64) -> Result<(String, Claims), AuthError> {
  let (username, password) = credentials(auth)?;
  let claims = Claims {
    sub: username.to_string(),
    iat: now,
    exp: now.saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX)),
  };
  let key = EncodingKey::from_secret(derive_secret(username, password).as_bytes());
  let token = encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(AuthError::Signing)?;
  Ok((token, claims))
}

/// Check signature, expiry and subject. Revocation is checked separately.
pub fn verify_token(auth: &AuthConfig, token: &str) -> Result<Claims, AuthError> {
  let (username, password) = credentials(auth)?;
  let key = DecodingKey::from_secret(derive_secret(username, password).as_bytes());
  let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))
    .map_err(|_| AuthError::InvalidToken)?;
  if data.claims.sub != username {
    return Err(AuthError::UserMismatch);
  }
  Ok(data.claims)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .ok_or(AuthError::MissingHeader)?
    .to_str()
    .map_err(|_| AuthError::BadHeader)?;
  let parts: Vec<&str> = value.split(' ').collect();
  match parts.as_slice() {
    ["Bearer", token] if !token.is_empty() => Ok(*token),
    _ => Err(AuthError::BadHeader),
  }
}

/// Middleware guarding the API routes.
pub async fn require_auth(
  State(state): State<AppState>,
  req: Request,
  next: Next,
) -> Result<Response, ApiError> {
  let claims = {
    let token = bearer_token(req.headers())?;
    verify_token(&state.config.auth, token)?
  };

  if let Some(revoked_before) = settings::get(&state.db, settings::TOKEN_REVOKED_BEFORE).await? {
    match revoked_before.parse::<i64>() {
      Ok(cutoff) if claims.iat < cutoff => return Err(AuthError::Revoked.into()),
      Ok(_) => {}
      Err(e) => warn!("ignoring unreadable revocation watermark {revoked_before:?}: {e}"),
    }
  }

  Ok(next.run(req).await)
}

/// Move the revocation watermark to now; returns the new value.
pub async fn revoke_all(state: &AppState) -> Result<i64, sqlx::Error> {
  let now = Utc::now().timestamp();
  settings::set(&state.db, settings::TOKEN_REVOKED_BEFORE, &now.to_string()).await?;
  Ok(now)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn auth() -> AuthConfig {
    AuthConfig {
      username: Some("admin".into()),
      password: Some("hunter2".into()),
      min_ttl: 60,
      max_ttl: 3600,
    }
  }

  #[test]
  fn secret_is_hex_sha256_of_credentials() {
    let s = derive_secret("admin", "hunter2");
    assert_eq!(s.len(), 64);
    assert_ne!(s, derive_secret("admin", "hunter3"));
  }

  #[test]
  fn issued_token_verifies() {
    let now = Utc::now().timestamp();
    let (token, claims) = issue_token(&auth(), now, 120).unwrap();
    assert_eq!(claims.exp, now + 120);
    assert_eq!(verify_token(&auth(), &token).unwrap(), claims);
  }

  #[test]
  fn token_from_other_password_is_rejected() {
    let now = Utc::now().timestamp();
    let (token, _) = issue_token(&auth(), now, 120).unwrap();
    let mut changed = auth();
    changed.password = Some("changed".into());
    assert!(matches!(
      verify_token(&changed, &token),
      Err(AuthError::InvalidToken)
    ));
  }

  #[test]
  fn expired_token_is_rejected() {
    let long_ago = Utc::now().timestamp() - 10_000;
    let (token, _) = issue_token(&auth(), long_ago, 60).unwrap();
    assert!(matches!(
      verify_token(&auth(), &token),
      Err(AuthError::InvalidToken)
    ));
  }

  #[test]
  fn missing_credentials_mean_not_configured() {
    let mut cfg = auth();
    cfg.password = None;
    assert!(matches!(
      verify_token(&cfg, "x"),
      Err(AuthError::NotConfigured)
    ));
    assert!(matches!(
      ApiError::from(AuthError::NotConfigured),
      ApiError::Internal(_)
    ));
  }

  #[test]
  fn ttl_is_clamped() {
    assert_eq!(clamp_ttl(&auth(), None), 60);
    assert_eq!(clamp_ttl(&auth(), Some(5)), 60);
    assert_eq!(clamp_ttl(&auth(), Some(600)), 600);
    assert_eq!(clamp_ttl(&auth(), Some(1_000_000)), 3600);
  }

  #[test]
  fn bearer_header_shapes() {
    let mut headers = HeaderMap::new();
    assert!(matches!(bearer_token(&headers), Err(AuthError::MissingHeader)));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Token abc"));
    assert!(matches!(bearer_token(&headers), Err(AuthError::BadHeader)));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer a b"));
    assert!(matches!(bearer_token(&headers), Err(AuthError::BadHeader)));
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
    assert_eq!(bearer_token(&headers).unwrap(), "abc");
  }

  #[test]
  fn credentials_check() {
    assert!(check_credentials(&auth(), "admin", "hunter2").is_ok());
    assert!(matches!(
      check_credentials(&auth(), "admin", "nope"),
      Err(AuthError::BadCredentials)
    ));
  }
}
