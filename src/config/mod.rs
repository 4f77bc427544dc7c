//! Service configuration read from `ALLE_*` environment variables.

use crate::models::email::EmailType;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value for {key}: {value:?} ({reason})")]
  Invalid {
    key: &'static str,
    value: String,
    reason: String,
  },
}

/// Credentials used to sign and verify session tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
  pub username: Option<String>,
  pub password: Option<String>,
  pub min_ttl: u64,
  pub max_ttl: u64,
}

/// OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct AiConfig {
  pub base_url: String,
  pub api_key: Option<String>,
  pub model: String,
  pub extract: bool,
}

#[derive(Debug, Clone)]
pub struct AutoDeleteConfig {
  pub enabled: bool,
  pub types: Vec<EmailType>,
  pub max_age: Duration,
  pub interval: Duration,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
  pub url: String,
  pub template: String,
  pub types: Vec<EmailType>,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
  pub bot_token: String,
  pub chat_id: String,
  pub template: String,
  pub types: Vec<EmailType>,
}

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub addr: SocketAddr,
  pub ingest_token: Option<String>,
  pub auth: AuthConfig,
  pub ai: AiConfig,
  pub auto_delete: AutoDeleteConfig,
  pub webhook: Option<WebhookConfig>,
  pub telegram: Option<TelegramConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      database_url: "sqlite://alle.db".into(),
      addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
      ingest_token: None,
      auth: AuthConfig {
        username: None,
        password: None,
        min_ttl: 3600,
        max_ttl: 30 * 24 * 3600,
      },
      ai: AiConfig {
        base_url: "https://api.openai.com/v1".into(),
        api_key: None,
        model: "gpt-4o-mini".into(),
        extract: false,
      },
      auto_delete: AutoDeleteConfig {
        enabled: false,
        types: vec![EmailType::AuthCode, EmailType::AuthLink],
        max_age: Duration::from_secs(24 * 3600),
        interval: Duration::from_secs(3600),
      },
      webhook: None,
      telegram: None,
    }
  }
}

impl Config {
  /// Read configuration from the process environment.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build configuration from an arbitrary key lookup. Blank values count as unset.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| {
      lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    };
    let mut cfg = Config::default();

    if let Some(v) = get("ALLE_DATABASE") {
      cfg.database_url = v;
    }
    if let Some(v) = get("ALLE_ADDR") {
      cfg.addr = v.parse().map_err(|e| invalid("ALLE_ADDR", &v, e))?;
    }
    cfg.ingest_token = get("ALLE_INGEST_TOKEN");

    cfg.auth.username = get("ALLE_USERNAME");
    cfg.auth.password = get("ALLE_PASSWORD");
    if let Some(v) = get("ALLE_JWT_MIN_TTL") {
      cfg.auth.min_ttl = parse_u64("ALLE_JWT_MIN_TTL", &v)?;
    }
    if let Some(v) = get("ALLE_JWT_MAX_TTL") {
      cfg.auth.max_ttl = parse_u64("ALLE_JWT_MAX_TTL", &v)?;
    }
    if cfg.auth.min_ttl > cfg.auth.max_ttl {
      return Err(ConfigError::Invalid {
        key: "ALLE_JWT_MIN_TTL",
        value: cfg.auth.min_ttl.to_string(),
        reason: "must not exceed ALLE_JWT_MAX_TTL".into(),
      });
    }

    if let Some(v) = get("ALLE_AI_BASE_URL") {
      cfg.ai.base_url = v;
    }
    cfg.ai.api_key = get("ALLE_AI_API_KEY");
    if let Some(v) = get("ALLE_AI_MODEL") {
      cfg.ai.model = v;
    }
    if let Some(v) = get("ALLE_ENABLE_AI_EXTRACT") {
      cfg.ai.extract = parse_bool("ALLE_ENABLE_AI_EXTRACT", &v)?;
    }

    if let Some(v) = get("ALLE_AUTO_DEL_ENABLED") {
      cfg.auto_delete.enabled = parse_bool("ALLE_AUTO_DEL_ENABLED", &v)?;
    }
    if let Some(v) = get("ALLE_AUTO_DEL_TYPES") {
      cfg.auto_delete.types = parse_types("ALLE_AUTO_DEL_TYPES", &v)?;
    }
    if let Some(v) = get("ALLE_AUTO_DEL_HOURS") {
      let secs = parse_u64("ALLE_AUTO_DEL_HOURS", &v)?
        .checked_mul(3600)
        .ok_or_else(|| invalid("ALLE_AUTO_DEL_HOURS", &v, "too large"))?;
      cfg.auto_delete.max_age = Duration::from_secs(secs);
    }
    if let Some(v) = get("ALLE_AUTO_DEL_INTERVAL") {
      let secs = parse_u64("ALLE_AUTO_DEL_INTERVAL", &v)?;
      if secs == 0 {
        return Err(invalid("ALLE_AUTO_DEL_INTERVAL", &v, "must be positive"));
      }
      cfg.auto_delete.interval = Duration::from_secs(secs);
    }

    if let (Some(url), Some(template)) = (get("ALLE_WEBHOOK_URL"), get("ALLE_WEBHOOK_TEMPLATE")) {
      let types = match get("ALLE_WEBHOOK_TYPES") {
        Some(v) => parse_types("ALLE_WEBHOOK_TYPES", &v)?,
        None => EmailType::ALL.to_vec(),
      };
      cfg.webhook = Some(WebhookConfig {
        url,
        template,
        types,
      });
    }

    if let (Some(bot_token), Some(chat_id), Some(template), Some(types)) = (
      get("ALLE_TELEGRAM_BOT_TOKEN"),
      get("ALLE_TELEGRAM_CHAT_ID"),
      get("ALLE_TELEGRAM_TEMPLATE"),
      get("ALLE_TELEGRAM_TYPES"),
    ) {
      cfg.telegram = Some(TelegramConfig {
        bot_token,
        chat_id,
        template,
        types: parse_types("ALLE_TELEGRAM_TYPES", &types)?,
      });
    }

    Ok(cfg)
  }

  /// The AI endpoint is usable only with an API key.
  pub fn ai_enabled(&self) -> bool {
    self.ai.api_key.is_some()
  }
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
  ConfigError::Invalid {
    key,
    value: value.to_string(),
    reason: reason.to_string(),
  }
}

fn parse_u64(key: &'static str, v: &str) -> Result<u64, ConfigError> {
  v.parse().map_err(|e| invalid(key, v, e))
}

fn parse_bool(key: &'static str, v: &str) -> Result<bool, ConfigError> {
  match v.to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(invalid(key, v, "expected a boolean")),
  }
}

fn parse_types(key: &'static str, v: &str) -> Result<Vec<EmailType>, ConfigError> {
  EmailType::parse_list(v).map_err(|e| invalid(key, v, e))
}
