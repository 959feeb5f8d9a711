// core/src/error.rs
use anyhow::Error as AnyhowError;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the pipeline machinery itself, as opposed to step handlers.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Internal pipeline error: {0}")]
  Internal(String),
}

/// Client-facing error class. Serialized as e.g. `"BAD_REQUEST"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
  BadRequest,
  Unauthorized,
  NotFound,
  Conflict,
  Internal,
}

impl ErrorCode {
  pub fn as_str(&self) -> &'static str {
    match self {
      ErrorCode::BadRequest => "BAD_REQUEST",
      ErrorCode::Unauthorized => "UNAUTHORIZED",
      ErrorCode::NotFound => "NOT_FOUND",
      ErrorCode::Conflict => "CONFLICT",
      ErrorCode::Internal => "INTERNAL",
    }
  }
}

#[derive(Debug, Error)]
pub enum BackstoreError {
  #[error("Validation error: {0}")]
  Validation(String),

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  #[error("Conflict: {0}")]
  Conflict(String),

  /// Failure inside a persistence collaborator. The source is logged, never shown to clients.
  #[error("Store operation failed: {source}")]
  Store {
    #[source]
    source: AnyhowError,
  },

  #[error("Workflow error: {source}")]
  Pipeline {
    #[from]
    source: PipelineError,
  },
}

impl BackstoreError {
  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    BackstoreError::NotFound {
      entity,
      id: id.to_string(),
    }
  }

  pub fn store(source: impl Into<AnyhowError>) -> Self {
    BackstoreError::Store { source: source.into() }
  }

  pub fn code(&self) -> ErrorCode {
    match self {
      BackstoreError::Validation(_) => ErrorCode::BadRequest,
      BackstoreError::NotFound { .. } => ErrorCode::NotFound,
      BackstoreError::Conflict(_) => ErrorCode::Conflict,
      BackstoreError::Store { .. } | BackstoreError::Pipeline { .. } => ErrorCode::Internal,
    }
  }
}

impl From<AnyhowError> for BackstoreError {
  fn from(err: AnyhowError) -> Self {
    // A BackstoreError that travelled through anyhow keeps its class.
    match err.downcast::<BackstoreError>() {
      Ok(inner) => inner,
      Err(other) => BackstoreError::Store { source: other },
    }
  }
}

pub type BackstoreResult<T, E = BackstoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_follow_the_taxonomy() {
    assert_eq!(BackstoreError::Validation("x".into()).code(), ErrorCode::BadRequest);
    assert_eq!(BackstoreError::not_found("Order", 7).code(), ErrorCode::NotFound);
    assert_eq!(BackstoreError::Conflict("dup".into()).code(), ErrorCode::Conflict);
    assert_eq!(BackstoreError::store(anyhow::anyhow!("boom")).code(), ErrorCode::Internal);
  }

  #[test]
  fn anyhow_round_trip_keeps_the_variant() {
    let wrapped = anyhow::Error::new(BackstoreError::not_found("Coupon", "X"));
    assert!(matches!(BackstoreError::from(wrapped), BackstoreError::NotFound { .. }));
  }

  #[test]
  fn error_code_serializes_screaming_snake() {
    assert_eq!(serde_json::to_string(&ErrorCode::BadRequest).unwrap(), "\"BAD_REQUEST\"");
    assert_eq!(ErrorCode::Conflict.as_str(), "CONFLICT");
  }
}
