//! Per-recipient aggregate.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Inbox {
  pub address: String,
  pub total: i64,
  pub unread: i64,
}
