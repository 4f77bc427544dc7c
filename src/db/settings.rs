//! Key/value settings table.

use sqlx::SqlitePool;

/// Issue-time watermark; tokens issued strictly before it are rejected.
pub const TOKEN_REVOKED_BEFORE: &str = "token_revoked_before";

pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
  sqlx::query_scalar("SELECT value FROM system_settings WHERE key = ? LIMIT 1")
    .bind(key)
    .fetch_optional(pool)
    .await
}

pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
  sqlx::query(
    "INSERT INTO system_settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
  )
  .bind(key)
  .bind(value)
  .execute(pool)
  .await?;
  Ok(())
}
