use thiserror::Error;

/// Failures surfaced by the record store, similarity index and resolution workflow
#[derive(Error, Debug)]
pub enum HindsightError {
  #[error("Ticket '{id}' not found")]
  NotFound { id: String },

  #[error("Ticket '{id}' already exists")]
  DuplicateId { id: String },

  #[error("Cannot build a similarity index from an empty corpus")]
  EmptyCorpus,

  #[error("Invalid {field}: {reason}")]
  InvalidInput { field: String, reason: String },

  #[error("Failed to persist {target}: {message}")]
  Persistence { target: String, message: String },
}

impl HindsightError {
  pub fn not_found(id: impl Into<String>) -> Self {
    Self::NotFound { id: id.into() }
  }

  pub fn duplicate_id(id: impl Into<String>) -> Self {
    Self::DuplicateId { id: id.into() }
  }

  pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::InvalidInput { field: field.into(), reason: reason.into() }
  }

  pub fn persistence(target: impl Into<String>, message: impl ToString) -> Self {
    Self::Persistence { target: target.into(), message: message.to_string() }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound { .. })
  }
}

pub type Result<T> = std::result::Result<T, HindsightError>;
