//! Closed set of extraction labels.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailType {
  InternalLink,
  AuthLink,
  AuthCode,
  ServiceLink,
  SubscriptionLink,
  OtherLink,
  #[default]
  None,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown email type: {0}")]
pub struct UnknownEmailType(pub String);

impl EmailType {
  pub const ALL: [EmailType; 7] = [
    EmailType::InternalLink,
    EmailType::AuthLink,
    EmailType::AuthCode,
    EmailType::ServiceLink,
    EmailType::SubscriptionLink,
    EmailType::OtherLink,
    EmailType::None,
  ];

  /// Stored and wire representation.
  pub fn as_str(self) -> &'static str {
    match self {
      EmailType::InternalLink => "internal_link",
      EmailType::AuthLink => "auth_link",
      EmailType::AuthCode => "auth_code",
      EmailType::ServiceLink => "service_link",
      EmailType::SubscriptionLink => "subscription_link",
      EmailType::OtherLink => "other_link",
      EmailType::None => "none",
    }
  }

  /// Human label used by notification templates.
  pub fn label(self) -> &'static str {
    match self {
      EmailType::InternalLink => "Internal link",
      EmailType::AuthLink => "Auth link",
      EmailType::AuthCode => "Auth code",
      EmailType::ServiceLink => "Service link",
      EmailType::SubscriptionLink => "Subscription link",
      EmailType::OtherLink => "Other link",
      EmailType::None => "None",
    }
  }

  /// Parse a comma-separated list. Every token must be a known type.
  pub fn parse_list(s: &str) -> Result<Vec<EmailType>, UnknownEmailType> {
    s.split(',').map(|t| t.trim().parse()).collect()
  }
}

impl FromStr for EmailType {
  type Err = UnknownEmailType;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    EmailType::ALL
      .into_iter()
      .find(|t| t.as_str() == s)
      .ok_or_else(|| UnknownEmailType(s.to_string()))
  }
}

impl fmt::Display for EmailType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
