use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{HindsightError, Result};

/// Placeholder written for optional resolution details that were not supplied
pub const NOT_AVAILABLE: &str = "N/A";

/// A support ticket as held by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
  #[serde(rename = "ticket_id", alias = "id")]
  pub id: String,
  pub issue: String,
  pub description: String,
  #[serde(default)]
  pub resolved: bool,

  // Populated once the ticket is resolved
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resolution: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub agent_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ai_suggestion_helpful: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub feedback: Option<String>,
}

impl Ticket {
  pub fn new(id: impl Into<String>, issue: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      issue: issue.into(),
      description: description.into(),
      resolved: false,
      resolution: None,
      agent_name: None,
      ai_suggestion_helpful: None,
      feedback: None,
    }
  }

  /// Text used both for indexing and for querying
  pub fn document_text(&self) -> String {
    document_text(&self.issue, &self.description)
  }

  /// Mark this ticket resolved, filling the resolution fields
  pub(crate) fn apply_resolution(&mut self, resolution: &Resolution) {
    self.resolved = true;
    self.resolution = Some(resolution.resolution.clone());
    self.agent_name = Some(or_not_available(resolution.agent_name.as_deref()));
    self.ai_suggestion_helpful = Some(resolution.ai_suggestion_helpful);
    self.feedback = Some(or_not_available(resolution.feedback.as_deref()));
  }
}

/// Join an issue and description the same way for corpus documents and queries
pub fn document_text(issue: &str, description: &str) -> String {
  format!("{issue} {description}")
}

/// Operator-supplied details for closing a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
  pub resolution: String,
  #[serde(default)]
  pub agent_name: Option<String>,
  #[serde(default)]
  pub ai_suggestion_helpful: bool,
  #[serde(default)]
  pub feedback: Option<String>,
}

impl Resolution {
  pub fn new(resolution: impl Into<String>, ai_suggestion_helpful: bool) -> Self {
    Self { resolution: resolution.into(), agent_name: None, ai_suggestion_helpful, feedback: None }
  }

  pub fn with_agent(mut self, agent_name: impl Into<String>) -> Self {
    self.agent_name = Some(agent_name.into());
    self
  }

  pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
    self.feedback = Some(feedback.into());
    self
  }

  /// The resolution text is mandatory; everything else falls back to "N/A"
  pub fn validate(&self) -> Result<()> {
    if self.resolution.trim().is_empty() {
      return Err(HindsightError::invalid_input("resolution", "must not be empty"));
    }
    Ok(())
  }
}

/// One row of the resolved-tickets log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTicket {
  pub ticket_id: String,
  pub issue: String,
  pub description: String,
  pub resolution: String,
  #[serde(deserialize_with = "deserialize_flag")]
  pub resolved: bool,
  pub agent_name: String,
  #[serde(deserialize_with = "deserialize_flag")]
  pub ai_suggestion_helpful: bool,
  pub feedback: String,
}

impl ResolvedTicket {
  /// Build a log row from a ticket that has just been resolved
  pub fn from_ticket(ticket: &Ticket) -> Self {
    Self {
      ticket_id: ticket.id.clone(),
      issue: ticket.issue.clone(),
      description: ticket.description.clone(),
      resolution: or_not_available(ticket.resolution.as_deref()),
      resolved: true,
      agent_name: or_not_available(ticket.agent_name.as_deref()),
      ai_suggestion_helpful: ticket.ai_suggestion_helpful.unwrap_or(false),
      feedback: or_not_available(ticket.feedback.as_deref()),
    }
  }
}

fn or_not_available(value: Option<&str>) -> String {
  match value.map(str::trim) {
    Some(text) if !text.is_empty() => text.to_string(),
    _ => NOT_AVAILABLE.to_string(),
  }
}

/// Parse the loose boolean spellings found in exported ticket dumps
pub fn parse_flag(value: &str) -> Option<bool> {
  match value.trim().to_lowercase().as_str() {
    "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
    "false" | "f" | "no" | "n" | "0" | "0.0" | "" | "nan" => Some(false),
    _ => None,
  }
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse_flag(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid boolean '{raw}'")))
}
