//! Periodic deletion of expired emails.

use crate::{app::AppState, config::AutoDeleteConfig, db};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Delete emails of the configured types older than the configured age.
pub async fn run_once(
  pool: &SqlitePool,
  cfg: &AutoDeleteConfig,
  now: DateTime<Utc>,
) -> Result<Vec<i64>, sqlx::Error> {
  let max_age = chrono::Duration::from_std(cfg.max_age).unwrap_or(chrono::Duration::MAX);
  let cutoff = now.checked_sub_signed(max_age).unwrap_or(DateTime::<Utc>::MIN_UTC);
  db::email::delete_expired(pool, &cfg.types, cutoff).await
}

/// Start the cleanup loop when enabled. The first pass runs immediately.
pub fn spawn(state: AppState) -> Option<JoinHandle<()>> {
  if !state.config.auto_delete.enabled {
    return None;
  }
  Some(tokio::spawn(async move {
    let cfg = state.config.auto_delete.clone();
    info!(
      types = ?cfg.types,
      max_age_secs = cfg.max_age.as_secs(),
      "auto-delete enabled"
    );
    let mut ticker = tokio::time::interval(cfg.interval);
    loop {
      ticker.tick().await;
      match run_once(&state.db, &cfg, Utc::now()).await {
        Ok(ids) if ids.is_empty() => {}
        Ok(ids) => info!(count = ids.len(), "auto-deleted expired emails"),
        Err(e) => error!("auto-delete failed: {e}"),
      }
    }
  }))
}
