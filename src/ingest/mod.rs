//! Inbound mail: MIME parsing, extraction and persistence.

use crate::{
  ai::extract::{self, ExtractResult},
  app::AppState,
  db,
  error::ApiError,
  models::email::{ApiEmail, DbEmail, NewEmail},
  notify,
  util::html_to_text,
};
use chrono::{DateTime, Utc};
use mailparse::{addrparse, dateparse, parse_mail, MailAddr, MailHeaderMap, ParsedMail, SingleInfo};
use tracing::{info, warn};

/// SMTP envelope data supplied by the forwarding service, when known.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
  pub from: Option<String>,
  pub to: Option<String>,
}

/// A parsed message ready for extraction.
#[derive(Debug, Clone)]
pub struct ParsedMessage {
  pub email: NewEmail,
  /// Subject, text body and flattened HTML joined for the extractor.
  pub extract_input: String,
}

/// Extract first text and HTML bodies from a MIME tree.
pub fn extract_bodies(parsed: &ParsedMail<'_>) -> (Option<String>, Option<String>) {
  if parsed.subparts.is_empty() {
    let disposition = parsed.get_content_disposition();
    if disposition.disposition == mailparse::DispositionType::Attachment {
      return (None, None);
    }
    let data = parsed.get_body().unwrap_or_default();
    match parsed.ctype.mimetype.as_str() {
      "text/html" => (None, Some(data)),
      "text/plain" => (Some(data), None),
      _ => (None, None),
    }
  } else {
    let mut text = None;
    let mut html = None;
    for part in &parsed.subparts {
      let (t, h) = extract_bodies(part);
      if text.is_none() && t.is_some() {
        text = t;
      }
      if html.is_none() && h.is_some() {
        html = h;
      }
    }
    (text, html)
  }
}

fn single_addresses(value: &str) -> Vec<SingleInfo> {
  let Ok(list) = addrparse(value) else {
    return Vec::new();
  };
  list
    .iter()
    .flat_map(|a| match a {
      MailAddr::Single(s) => vec![s.clone()],
      MailAddr::Group(g) => g.addrs.clone(),
    })
    .collect()
}

fn non_empty(s: Option<String>) -> Option<String> {
  s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn local_part(addr: &str) -> &str {
  addr.split('@').next().unwrap_or(addr)
}

/// Parse a raw RFC 822 message into an insertable record.
pub fn parse_message(
  raw: &[u8],
  envelope: &Envelope,
  received_at: DateTime<Utc>,
) -> Result<ParsedMessage, mailparse::MailParseError> {
  let parsed = parse_mail(raw)?;
  let headers = &parsed.headers;

  let from = headers
    .get_first_value("From")
    .and_then(|v| single_addresses(&v).into_iter().next());
  let from_address = from
    .as_ref()
    .map(|f| f.addr.clone())
    .or_else(|| non_empty(envelope.from.clone()));
  let from_name = non_empty(from.and_then(|f| f.display_name))
    .or_else(|| from_address.as_deref().map(|a| local_part(a).to_string()));

  let to_list: Vec<String> = headers
    .get_first_value("To")
    .map(|v| single_addresses(&v).into_iter().map(|s| s.addr).collect())
    .unwrap_or_default();
  let to_address = non_empty(headers.get_first_value("Delivered-To"))
    .or_else(|| non_empty(envelope.to.clone()))
    .or_else(|| to_list.first().cloned());
  let recipient = serde_json::to_string(&to_list).ok();

  let title = non_empty(headers.get_first_value("Subject"));
  let message_id = non_empty(headers.get_first_value("Message-ID"));
  let sent_at = headers
    .get_first_value("Date")
    .and_then(|d| dateparse(&d).ok())
    .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    .or(Some(received_at));

  let (text, html) = extract_bodies(&parsed);
  let html_text = html.as_deref().map(html_to_text).unwrap_or_default();
  let body_text = non_empty(text.clone()).or_else(|| Some(html_text.clone()));

  let extract_input = [
    title.clone().unwrap_or_default(),
    text.unwrap_or_default(),
    html_text,
  ]
  .into_iter()
  .filter(|s| !s.trim().is_empty())
  .collect::<Vec<_>>()
  .join("\n");

  Ok(ParsedMessage {
    email: NewEmail {
      message_id,
      from_address,
      from_name,
      to_address,
      recipient,
      title,
      body_text,
      body_html: html,
      sent_at,
      received_at,
      ..NewEmail::default()
    },
    extract_input,
  })
}

async fn run_extraction(state: &AppState, input: &str) -> (ExtractResult, Option<String>) {
  if !state.config.ai.extract || !state.ai.is_configured() || input.is_empty() {
    return (ExtractResult::default(), None);
  }
  match extract::extract(&state.ai, input).await {
    Ok(r) => (r, None),
    Err(e) => {
      warn!("extraction failed: {e}");
      (ExtractResult::default(), Some(e.to_string()))
    }
  }
}

/// Parse, classify, store and announce one inbound message.
pub async fn ingest(state: &AppState, raw: &[u8], envelope: &Envelope) -> Result<DbEmail, ApiError> {
  let ParsedMessage {
    mut email,
    extract_input,
  } = parse_message(raw, envelope, Utc::now()).map_err(|e| {
    warn!("rejecting unparseable message: {e}");
    ApiError::bad_request("Invalid email message")
  })?;

  let (result, error) = run_extraction(state, &extract_input).await;
  email.email_type = result.email_type;
  email.email_result = Some(result.result).filter(|r| !r.is_empty());
  email.email_result_text = Some(result.result_text).filter(|t| !t.is_empty());
  email.email_error = error;

  let stored = match db::email::create(&state.db, &email).await {
    Ok(row) => row,
    Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
      return Err(ApiError::Conflict("Email already stored".into()));
    }
    Err(e) => return Err(e.into()),
  };

  info!(
    id = stored.id,
    email_type = %stored.email_type,
    to = stored.to_address.as_deref().unwrap_or("-"),
    "stored inbound email"
  );

  notify::dispatch(state, &ApiEmail::from(stored.clone())).await;
  Ok(stored)
}
