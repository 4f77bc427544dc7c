//! Database row for an email.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Default, FromRow)]
pub struct DbEmail {
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
  pub email_type: String,
  pub email_result: Option<String>,
  pub email_result_text: Option<String>,
  pub email_error: Option<String>,
  pub read_status: i64,
}

impl DbEmail {
  /// Text fields consulted by search, in match order.
  pub fn search_fields(&self) -> [Option<&str>; 5] {
    [
      self.title.as_deref(),
      self.body_text.as_deref(),
      self.from_name.as_deref(),
      self.from_address.as_deref(),
      self.to_address.as_deref(),
    ]
  }
}
