// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use backstore::{BackstoreError, ErrorCode, PipelineError};
use serde_json::json;
use thiserror::Error;

/// Postgres SQLSTATE for unique_violation.
pub const PG_UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign_key_violation.
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

const INTERNAL_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Mail Error: {0}")]
  Mail(String),

  #[error("{source}")]
  Domain {
    #[from]
    source: BackstoreError,
  },

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: PipelineError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(err) => AppError::Internal(err.to_string()),
      },
    }
  }
}

impl From<validator::ValidationErrors> for AppError {
  fn from(errors: validator::ValidationErrors) -> Self {
    let mut fields: Vec<String> = errors
      .field_errors()
      .iter()
      .map(|(field, errs)| {
        let detail = errs
          .iter()
          .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
          .next()
          .unwrap_or_else(|| "is invalid".to_string());
        format!("{} {}", field, detail)
      })
      .collect();
    fields.sort();
    AppError::Validation(fields.join("; "))
  }
}

/// The SQLSTATE of a database error, if any.
pub fn sqlstate(err: &sqlx::Error) -> Option<String> {
  match err {
    sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
    _ => None,
  }
}

impl AppError {
  pub fn code(&self) -> ErrorCode {
    match self {
      AppError::Validation(_) => ErrorCode::BadRequest,
      AppError::Auth(_) => ErrorCode::Unauthorized,
      AppError::NotFound(_) => ErrorCode::NotFound,
      AppError::Conflict(_) => ErrorCode::Conflict,
      AppError::Sqlx(sqlx::Error::RowNotFound) => ErrorCode::NotFound,
      AppError::Sqlx(e) => match sqlstate(e).as_deref() {
        Some(PG_UNIQUE_VIOLATION) | Some(PG_FOREIGN_KEY_VIOLATION) => ErrorCode::Conflict,
        _ => ErrorCode::Internal,
      },
      AppError::Domain { source } => source.code(),
      AppError::Config(_) | AppError::Mail(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        ErrorCode::Internal
      }
    }
  }

  /// What the client is allowed to see. Internal detail stays in the logs.
  pub fn public_message(&self) -> String {
    match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) | AppError::Conflict(m) => m.clone(),
      AppError::Sqlx(sqlx::Error::RowNotFound) => "Resource not found".to_string(),
      AppError::Sqlx(e) => match sqlstate(e).as_deref() {
        Some(PG_UNIQUE_VIOLATION) => "A record with the same unique value already exists".to_string(),
        Some(PG_FOREIGN_KEY_VIOLATION) => "The record is still referenced by other records".to_string(),
        _ => INTERNAL_MESSAGE.to_string(),
      },
      AppError::Domain { source } => match source {
        BackstoreError::Validation(m) | BackstoreError::Conflict(m) => m.clone(),
        BackstoreError::NotFound { entity, .. } => format!("{} not found", entity),
        BackstoreError::Store { .. } | BackstoreError::Pipeline { .. } => INTERNAL_MESSAGE.to_string(),
      },
      AppError::Config(_) | AppError::Mail(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        INTERNAL_MESSAGE.to_string()
      }
    }
  }
}

fn status_for(code: ErrorCode) -> StatusCode {
  match code {
    ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
    ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
    ErrorCode::NotFound => StatusCode::NOT_FOUND,
    ErrorCode::Conflict => StatusCode::CONFLICT,
    ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    status_for(self.code())
  }

  fn error_response(&self) -> HttpResponse {
    let code = self.code();
    if code == ErrorCode::Internal {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    HttpResponse::build(status_for(code)).json(json!({
      "success": false,
      "error": {
        "code": code,
        "message": self.public_message(),
      }
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
