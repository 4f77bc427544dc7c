//! Utility functions: tracing setup and HTML flattening.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize pretty CLI logging.
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  fmt()
    .with_env_filter(filter)
    .with_target(false)
    .pretty()
    .init();
}

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>").expect("static regex")
});
static ANCHOR: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a\s*>"#)
    .expect("static regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"));
static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

fn decode_entities(s: &str) -> String {
  s.replace("&nbsp;", " ")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&amp;", "&")
}

/// Flatten an HTML body to one line of text; links become `[text](href)`.
pub fn html_to_text(html: &str) -> String {
  let without_code = SCRIPT_STYLE.replace_all(html, " ");
  let linked = ANCHOR.replace_all(&without_code, |caps: &Captures<'_>| {
    let href = caps[1].trim();
    let text = TAG.replace_all(&caps[2], " ");
    let text = SPACE.replace_all(text.trim(), " ");
    match (href.is_empty(), text.is_empty()) {
      (true, _) => text.into_owned(),
      (false, true) => href.to_string(),
      (false, false) => format!("[{text}]({href})"),
    }
  });
  let stripped = TAG.replace_all(&linked, " ");
  let decoded = decode_entities(&stripped);
  SPACE.replace_all(decoded.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn drops_scripts_and_styles() {
    let html = "<style>p{color:red}</style><p>Hello</p><script>alert(1)</script>";
    assert_eq!(html_to_text(html), "Hello");
  }

  #[test]
  fn renders_links_as_markdown() {
    let html = r#"<p>Click <a class="btn" href="https://x.test/verify?t=1">  <b>Verify</b> </a> now</p>"#;
    assert_eq!(
      html_to_text(html),
      "Click [Verify](https://x.test/verify?t=1) now"
    );
    assert_eq!(
      html_to_text(r#"<a href="https://x.test/img"><img src="a.png"></a>"#),
      "https://x.test/img"
    );
  }

  #[test]
  fn collapses_whitespace_and_decodes_entities() {
    let html = "<div>Tom&nbsp;&amp;\n\n  Jerry</div><div>&lt;3</div>";
    assert_eq!(html_to_text(html), "Tom & Jerry <3");
  }
}
