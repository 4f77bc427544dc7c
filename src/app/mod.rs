//! Application setup and runtime.

use crate::{ai::ChatClient, cleanup, config::Config, db, http};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
  pub db: SqlitePool,
  pub config: Arc<Config>,
  pub ai: ChatClient,
  /// Client for outbound notifications.
  pub http: reqwest::Client,
}

impl AppState {
  pub fn new(db: SqlitePool, config: Config) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
    let ai = ChatClient::new(&config.ai)?;
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(15))
      .build()?;
    Ok(AppState {
      db,
      config: Arc::new(config),
      ai,
      http,
    })
  }
}

/// Start the HTTP server and background cleanup with configured environment.
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  crate::util::init_tracing();

  let config = Config::from_env()?;
  let pool = db::connect(&config.database_url).await?;
  db::run_migrations(&pool).await?;

  if config.auth.username.is_none() || config.auth.password.is_none() {
    tracing::warn!("ALLE_USERNAME / ALLE_PASSWORD unset: API requests will be refused");
  }
  if config.ingest_token.is_none() {
    tracing::warn!("ALLE_INGEST_TOKEN unset: inbound webhook disabled");
  }

  let addr = config.addr;
  let state = AppState::new(pool, config)?;
  let app = http::build_router(state.clone());

  info!("alle inbox:           http://{}/", addr);
  info!("inbound webhook:      POST http://{}/api/email/receive", addr);
  info!(
    ai = state.ai.is_configured(),
    extract = state.config.ai.extract,
    "ai features"
  );

  cleanup::spawn(state.clone());

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!("shutting down");
    })
    .await?;
  Ok(())
}
