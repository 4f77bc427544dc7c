//! Database helpers: connection, migrations and path handling.

pub mod email;
pub mod settings;

use sqlx::{
  sqlite::{SqliteConnectOptions, SqlitePoolOptions},
  SqlitePool,
};
use std::{path::Path, str::FromStr};

/// Open a pool for a sqlx SQLite URL, creating the file when missing.
pub async fn connect(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
  ensure_sqlite_parent(db_url);
  let in_memory = db_url.contains(":memory:");
  let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
  let pool = if in_memory {
    // the database vanishes with its last connection
    SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
  } else {
    SqlitePoolOptions::new().max_connections(5)
  };
  pool.connect_with(options).await
}

/// Run SQLite migrations to create tables if absent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
  sqlx::query(
    r#"CREATE TABLE IF NOT EXISTS email (
            id INTEGER PRIMARY KEY,
            message_id TEXT NULL UNIQUE,
            from_address TEXT NULL,
            from_name TEXT NULL,
            to_address TEXT NULL,
            recipient TEXT NULL,
            title TEXT NULL,
            body_text TEXT NULL,
            body_html TEXT NULL,
            sent_at TEXT NULL,
            received_at TEXT NULL,
            email_type TEXT NOT NULL DEFAULT 'none',
            email_result TEXT NULL,
            email_result_text TEXT NULL,
            email_error TEXT NULL,
            read_status INTEGER NOT NULL DEFAULT 0
        )"#,
  )
  .execute(pool)
  .await?;

  sqlx::query("CREATE INDEX IF NOT EXISTS idx_email_sent_at ON email (sent_at)")
    .execute(pool)
    .await?;
  sqlx::query("CREATE INDEX IF NOT EXISTS idx_email_to_address ON email (to_address)")
    .execute(pool)
    .await?;

  sqlx::query(
    r#"CREATE TABLE IF NOT EXISTS system_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )"#,
  )
  .execute(pool)
  .await?;
  Ok(())
}

/// Ensure the parent folder of a file-backed SQLite URL exists.
pub fn ensure_sqlite_parent(db_url: &str) {
  if !db_url.starts_with("sqlite:") {
    return;
  }
  let path_part = db_url
    .trim_start_matches("sqlite://")
    .trim_start_matches("sqlite:");
  let path_only = path_part.split_once('?').map_or(path_part, |(p, _)| p);
  if path_only.is_empty() || path_only.contains(":memory:") {
    return;
  }
  if let Some(parent) = Path::new(path_only).parent() {
    if !parent.as_os_str().is_empty() {
      let _ = std::fs::create_dir_all(parent);
    }
  }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
  let pool = connect("sqlite::memory:").await.expect("connect memory sqlite");
  run_migrations(&pool).await.expect("migrate");
  pool
}
