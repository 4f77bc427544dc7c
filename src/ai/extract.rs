//! Classify an incoming email and pull out its code or link.

use super::{AiError, ChatClient};
use crate::models::email::EmailType;
use serde::Deserialize;

const EXTRACT_PROMPT: &str = r#"You read emails and extract the single most useful actionable item.

Classify the email with exactly one type:
- auth_code: a verification / one-time / login code
- auth_link: a link that verifies, confirms or signs in
- service_link: a link to act on an account or service (reset password, view order, accept invite)
- subscription_link: a link to manage or cancel a subscription or newsletter
- internal_link: a link pointing at the sender's own site that is not one of the above
- other_link: any other meaningful link
- none: nothing actionable

Reply with JSON only, no prose and no code fences:
{"type": "<type>", "result": "<the code or URL, empty for none>", "result_text": "<short human description, empty for none>"}"#;

/// Result of AI extraction, stored on the email record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtractResult {
  #[serde(rename = "type")]
  pub email_type: EmailType,
  #[serde(default)]
  pub result: String,
  #[serde(default)]
  pub result_text: String,
}

/// Ask the model to classify `content`.
pub async fn extract(client: &ChatClient, content: &str) -> Result<ExtractResult, AiError> {
  let reply = client.complete(EXTRACT_PROMPT, content).await?;
  parse_reply(&reply)
}

/// Parse model output, tolerating code fences and surrounding prose.
pub fn parse_reply(reply: &str) -> Result<ExtractResult, AiError> {
  let start = reply.find('{');
  let end = reply.rfind('}');
  let json = match (start, end) {
    (Some(s), Some(e)) if s < e => &reply[s..=e],
    _ => return Err(AiError::Malformed(truncate(reply))),
  };
  let mut parsed: ExtractResult =
    serde_json::from_str(json).map_err(|e| AiError::Malformed(e.to_string()))?;
  parsed.result = parsed.result.trim().to_string();
  parsed.result_text = parsed.result_text.trim().to_string();
  if parsed.email_type == EmailType::None {
    parsed.result.clear();
  }
  Ok(parsed)
}

fn truncate(s: &str) -> String {
  s.chars().take(120).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_plain_json() {
    let r = parse_reply(r#"{"type":"auth_code","result":" 123456 ","result_text":"Login code"}"#)
      .unwrap();
    assert_eq!(r.email_type, EmailType::AuthCode);
    assert_eq!(r.result, "123456");
    assert_eq!(r.result_text, "Login code");
  }

  #[test]
  fn strips_code_fences() {
    let reply = "```json\n{\"type\":\"auth_link\",\"result\":\"https://x.test/v\"}\n```";
    let r = parse_reply(reply).unwrap();
    assert_eq!(r.email_type, EmailType::AuthLink);
    assert_eq!(r.result_text, "");
  }

  #[test]
  fn unknown_type_is_malformed() {
    assert!(matches!(
      parse_reply(r#"{"type":"coupon","result":"x"}"#),
      Err(AiError::Malformed(_))
    ));
    assert!(matches!(parse_reply("no idea"), Err(AiError::Malformed(_))));
  }
}
