//! Chinese/English translation of email bodies.

use super::{AiError, ChatClient};
use once_cell::sync::Lazy;
use regex::Regex;

const PARAGRAPH_SEPARATOR: &str = "%%";

/// Inputs above this many characters are refused.
pub const MAX_CONTENT_CHARS: usize = 50_000;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
  Chinese,
  Other,
}

impl Language {
  /// Translation target for text written in this language.
  pub fn target(self) -> &'static str {
    match self {
      Language::Chinese => "English",
      Language::Other => "Simplified Chinese",
    }
  }
}

fn is_cjk(c: char) -> bool {
  matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}')
}

/// Chinese when CJK ideographs exceed 30% of the characters.
pub fn detect_language(text: &str) -> Language {
  let total = text.chars().count().max(1);
  let cjk = text.chars().filter(|c| is_cjk(*c)).count();
  if cjk as f64 / total as f64 > 0.3 {
    Language::Chinese
  } else {
    Language::Other
  }
}

pub fn build_prompt(target: &str) -> String {
  let sep = PARAGRAPH_SEPARATOR;
  format!(
    r#"You are a professional {target} native translator who needs to fluently translate text into {target}.

## Translation Rules
1. Output only the translated content, without explanations or additional content
2. The returned translation must keep exactly the same number of paragraphs and the same format as the original
3. Keep content that should not be translated (proper nouns, brand names, URLs, email addresses, code, numbers) unchanged
4. If the input contains {sep}, use {sep} between paragraphs in your output. If it has no {sep}, do not use {sep}

## Output format
- Single paragraph input: output the translation directly
- Multi-paragraph input: separate paragraph translations with {sep}

Translate to {target} (output translation only):"#
  )
}

fn build_html_prompt(target: &str) -> String {
  format!(
    "{}\n\nThe input is HTML. Keep every tag, attribute and URL exactly as is and translate only the visible text.",
    build_prompt(target)
  )
}

fn paragraphs(text: &str) -> Vec<&str> {
  PARAGRAPH_BREAK
    .split(text)
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect()
}

/// Join blank-line separated paragraphs with the separator marker.
pub fn pre_process(text: &str) -> String {
  let paras = paragraphs(text);
  if paras.len() <= 1 {
    return text.trim().to_string();
  }
  paras.join(&format!("\n{PARAGRAPH_SEPARATOR}\n"))
}

/// Restore blank-line paragraphs from a separator-marked translation.
pub fn post_process(translated: &str, original: &str) -> String {
  if paragraphs(original).len() <= 1 {
    return translated.trim().to_string();
  }
  translated
    .split(PARAGRAPH_SEPARATOR)
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Translate plain text, direction picked from its language.
pub async fn translate_text(client: &ChatClient, content: &str) -> Result<String, AiError> {
  let target = detect_language(content).target();
  let translated = client
    .complete(&build_prompt(target), &pre_process(content))
    .await?;
  Ok(post_process(&translated, content))
}

/// Translate an HTML body towards the same target as `reference_text`.
pub async fn translate_html(
  client: &ChatClient,
  html: &str,
  reference_text: &str,
) -> Result<String, AiError> {
  let target = detect_language(reference_text).target();
  let translated = client.complete(&build_html_prompt(target), html).await?;
  Ok(translated.trim().to_string())
}
