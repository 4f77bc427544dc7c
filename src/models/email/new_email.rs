//! Insert payload produced by ingestion.

use super::email_type::EmailType;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct NewEmail {
  pub message_id: Option<String>,
  pub from_address: Option<String>,
  pub from_name: Option<String>,
  pub to_address: Option<String>,
  pub recipient: Option<String>,
  pub title: Option<String>,
  pub body_text: Option<String>,
  pub body_html: Option<String>,
  pub sent_at: Option<DateTime<Utc>>,
  pub received_at: DateTime<Utc>,
  pub email_type: EmailType,
  pub email_result: Option<String>,
  pub email_result_text: Option<String>,
  pub email_error: Option<String>,
}
