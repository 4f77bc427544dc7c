//! Outbound notifications for newly stored emails.

use crate::{app::AppState, models::email::ApiEmail};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const TELEGRAM_API: &str = "https://api.telegram.org";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("static regex"));

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("endpoint returned {0}")]
  Status(u16),
}

/// Escape a value for embedding inside a JSON string literal.
fn json_escape(s: &str) -> String {
  let quoted = serde_json::to_string(s).unwrap_or_default();
  quoted
    .strip_prefix('"')
    .and_then(|q| q.strip_suffix('"'))
    .unwrap_or_default()
    .to_string()
}

/// Replace `{field}` placeholders with JSON-escaped email values.
///
/// Keys are the camelCase email fields plus `emailTypeName`. Unknown keys and
/// null values render empty.
pub fn render_template(template: &str, email: &ApiEmail) -> String {
  let fields = serde_json::to_value(email).unwrap_or(Value::Null);
  PLACEHOLDER
    .replace_all(template, |caps: &Captures<'_>| {
      let key = &caps[1];
      if key == "emailTypeName" {
        return json_escape(email.email_type.label());
      }
      match fields.get(key) {
        Some(Value::String(s)) => json_escape(s.trim()),
        Some(Value::Null) | None => String::new(),
        Some(other) => json_escape(other.to_string().trim()),
      }
    })
    .into_owned()
}

async fn send_webhook(http: &reqwest::Client, url: &str, body: String) -> Result<(), NotifyError> {
  let resp = http
    .post(url)
    .header(reqwest::header::CONTENT_TYPE, "application/json")
    .body(body)
    .send()
    .await?;
  if !resp.status().is_success() {
    return Err(NotifyError::Status(resp.status().as_u16()));
  }
  Ok(())
}

async fn send_telegram(
  http: &reqwest::Client,
  bot_token: &str,
  chat_id: &str,
  text: String,
) -> Result<(), NotifyError> {
  let url = format!("{TELEGRAM_API}/bot{bot_token}/sendMessage");
  let resp = http
    .post(url)
    .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
    .send()
    .await?;
  if !resp.status().is_success() {
    return Err(NotifyError::Status(resp.status().as_u16()));
  }
  Ok(())
}

/// Fire every configured notification that accepts this email's type.
/// Failures are logged; the email is already stored.
pub async fn dispatch(state: &AppState, email: &ApiEmail) {
  if let Some(hook) = &state.config.webhook {
    if hook.types.contains(&email.email_type) {
      let body = render_template(&hook.template, email);
      match send_webhook(&state.http, &hook.url, body).await {
        Ok(()) => debug!(id = email.id, "webhook delivered"),
        Err(e) => warn!(id = email.id, "webhook failed: {e}"),
      }
    }
  }

  if let Some(tg) = &state.config.telegram {
    if tg.types.contains(&email.email_type) {
      let text = render_template(&tg.template, email);
      match send_telegram(&state.http, &tg.bot_token, &tg.chat_id, text).await {
        Ok(()) => debug!(id = email.id, "telegram message sent"),
        Err(e) => warn!(id = email.id, "telegram failed: {e}"),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::email::{DbEmail, EmailType};

  fn email() -> ApiEmail {
    ApiEmail::from(DbEmail {
      id: 7,
      title: Some("  Your \"code\"  ".into()),
      from_address: Some("a@x.test".into()),
      email_type: EmailType::AuthCode.as_str().into(),
      email_result: Some("123456".into()),
      ..DbEmail::default()
    })
  }

  #[test]
  fn substitutes_known_fields() {
    let out = render_template(r#"{"text":"{title}: {emailResult} ({emailTypeName}) #{id}"}"#, &email());
    assert_eq!(out, r#"{"text":"Your \"code\": 123456 (Auth code) #7"}"#);
  }

  #[test]
  fn unknown_and_null_fields_render_empty() {
    assert_eq!(render_template("[{bodyHtml}|{nope}]", &email()), "[|]");
  }

  #[test]
  fn escapes_newlines() {
    let mut e = email();
    e.title = Some("line1\nline2".into());
    assert_eq!(render_template("{title}", &e), "line1\\nline2");
  }
}
