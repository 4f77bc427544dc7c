//! API representation of an email.

use super::{db_email::DbEmail, email_type::EmailType};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEmail {
  pub id: i64,
  pub message_id: Option<String>,
  pub from_address: Option<String>,
  pub from_name: Option<String>,
  pub to_address: Option<String>,
  pub recipient: Option<String>,
  pub title: Option<String>,
  pub body_text: Option<String>,
  pub body_html: Option<String>,
  pub sent_at: Option<DateTime<Utc>>,
  pub received_at: Option<DateTime<Utc>>,
  pub email_type: EmailType,
  pub email_result: Option<String>,
  pub email_result_text: Option<String>,
  pub email_error: Option<String>,
  pub read_status: i64,
}

impl From<DbEmail> for ApiEmail {
  fn from(d: DbEmail) -> Self {
    // Rows are only written through `EmailType`, anything else is legacy data.
    let email_type = d.email_type.parse().unwrap_or_default();
    ApiEmail {
      id: d.id,
      message_id: d.message_id,
      from_address: d.from_address,
      from_name: d.from_name,
      to_address: d.to_address,
      recipient: d.recipient,
      title: d.title,
      body_text: d.body_text,
      body_html: d.body_html,
      sent_at: d.sent_at,
      received_at: d.received_at,
      email_type,
      email_result: d.email_result,
      email_result_text: d.email_result_text,
      email_error: d.email_error,
      read_status: d.read_status,
    }
  }
}
