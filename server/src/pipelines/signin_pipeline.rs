// server/src/pipelines/signin_pipeline.rs

use backstore::{ContextData, Pipeline, PipelineControl};
use chrono::{Duration, Utc};
use tracing::{event, warn, Level};

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::SigninCtx;
use crate::services::auth_service;

pub const STEP_VALIDATE: &str = "validate_signin_input";
pub const STEP_FETCH: &str = "fetch_admin_by_email";
pub const STEP_VERIFY: &str = "verify_admin_password";
pub const STEP_ISSUE: &str = "issue_session_token";

/// Every credential failure reads the same to the client.
const BAD_CREDENTIALS: &str = "Invalid email or password.";

pub fn build_signin_pipeline() -> Pipeline<SigninCtx, AppError> {
  let mut pipeline = Pipeline::<SigninCtx, AppError>::new(&[
    (STEP_VALIDATE, false, None),
    (STEP_FETCH, false, None),
    (STEP_VERIFY, false, None),
    (STEP_ISSUE, false, None),
  ]);

  pipeline.on_root(STEP_VALIDATE, validate_signin_input);
  pipeline.on_root(STEP_FETCH, fetch_admin_by_email);
  pipeline.on_root(STEP_VERIFY, verify_admin_password);
  pipeline.on_root(STEP_ISSUE, issue_session_token);
  pipeline
}

async fn validate_signin_input(ctx_data: ContextData<SigninCtx>) -> AppResult<PipelineControl> {
  let (email, password_is_empty) = {
    let mut guard = ctx_data.write();
    guard.email = guard.email.trim().to_string();
    (guard.email.clone(), guard.password.is_empty())
  };

  event!(Level::DEBUG, %email, "Validating sign-in input.");
  if email.is_empty() || !email.contains('@') {
    return Err(AppError::Validation("A valid email is required.".to_string()));
  }
  if password_is_empty {
    return Err(AppError::Validation("Password is required.".to_string()));
  }
  Ok(PipelineControl::Continue)
}

async fn fetch_admin_by_email(ctx_data: ContextData<SigninCtx>) -> AppResult<PipelineControl> {
  let (email, admins) = {
    let guard = ctx_data.read();
    (guard.email.clone(), guard.admins.clone())
  };

  match admins.find_active_admin_by_email(&email).await? {
    Some(admin) => {
      event!(Level::DEBUG, admin_id = %admin.id, "Admin found for sign-in.");
      ctx_data.write().admin = Some(admin);
      Ok(PipelineControl::Continue)
    }
    None => {
      warn!(%email, "Sign-in for unknown or inactive admin.");
      Err(AppError::Auth(BAD_CREDENTIALS.to_string()))
    }
  }
}

async fn verify_admin_password(ctx_data: ContextData<SigninCtx>) -> AppResult<PipelineControl> {
  let (stored_hash, password, admin_id) = {
    let guard = ctx_data.read();
    let admin = guard
      .admin
      .as_ref()
      .ok_or_else(|| AppError::Internal("Admin missing before password verification.".to_string()))?;
    (admin.password_hash.clone(), guard.password.clone(), admin.id)
  };

  let matches = auth_service::verify_password(&stored_hash, &password)?;
  // The plain-text password is not needed past this point.
  ctx_data.write().password.clear();
  if !matches {
    warn!(%admin_id, "Password mismatch on sign-in.");
    return Err(AppError::Auth(BAD_CREDENTIALS.to_string()));
  }
  Ok(PipelineControl::Continue)
}

async fn issue_session_token(ctx_data: ContextData<SigninCtx>) -> AppResult<PipelineControl> {
  let (admins, admin_id, ttl_hours) = {
    let guard = ctx_data.read();
    let admin_id = guard
      .admin
      .as_ref()
      .map(|a| a.id)
      .ok_or_else(|| AppError::Internal("Admin missing before session issue.".to_string()))?;
    (guard.admins.clone(), admin_id, guard.session_ttl_hours)
  };

  let token = auth_service::generate_session_token();
  let expires_at = Utc::now() + Duration::hours(ttl_hours);
  let session = admins.create_session(&token, admin_id, expires_at).await?;

  event!(Level::INFO, %admin_id, %expires_at, "Admin session issued.");
  ctx_data.write().session = Some(session);
  Ok(PipelineControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn steps_run_in_declared_order() {
    let pipeline = build_signin_pipeline();
    assert_eq!(pipeline.step_names(), vec![STEP_VALIDATE, STEP_FETCH, STEP_VERIFY, STEP_ISSUE]);
  }
}
