// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use backstore::{ContextData, PipelineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::AdminUser;
use crate::pipelines::SigninCtx;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedAdmin;
use crate::web::response;

#[derive(Deserialize)]
pub struct SigninRequest {
  pub email: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
  pub token: String,
  pub expires_at: DateTime<Utc>,
  pub admin: AdminUser,
}

#[derive(Debug, Serialize)]
pub struct SignedOut {
  pub signed_out: bool,
}

#[instrument(name = "handler::signin", skip(app_state, payload), fields(email = %payload.email))]
pub async fn signin(
  app_state: web::Data<AppState>,
  payload: web::Json<SigninRequest>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let ctx_data = ContextData::new(SigninCtx::new(
    app_state.admins.clone(),
    app_state.config.session_ttl_hours,
    payload.email,
    payload.password,
  ));

  match app_state.signin_pipeline.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {}
    PipelineResult::Stopped => {
      warn!("Sign-in pipeline stopped before issuing a session.");
      return Err(AppError::Auth("Authentication was halted.".to_string()));
    }
  }

  let ctx = ctx_data.into_inner();
  let (admin, session) = match (ctx.admin, ctx.session) {
    (Some(admin), Some(session)) => (admin, session),
    _ => return Err(AppError::Internal("Sign-in completed without a session.".to_string())),
  };
  info!(admin_id = %admin.id, "Admin signed in.");
  Ok(response::ok(SigninResponse {
    token: session.token,
    expires_at: session.expires_at,
    admin,
  }))
}

#[instrument(name = "handler::signout", skip_all, fields(admin_id = %auth.admin.id))]
pub async fn signout(app_state: web::Data<AppState>, auth: AuthenticatedAdmin) -> Result<HttpResponse, AppError> {
  let removed = app_state.admins.delete_session(&auth.token).await?;
  info!(removed, "Admin signed out.");
  Ok(response::ok(SignedOut { signed_out: true }))
}

#[derive(Debug, Serialize)]
pub struct Me {
  pub id: Uuid,
  pub email: String,
  pub name: String,
}

pub async fn me(auth: AuthenticatedAdmin) -> HttpResponse {
  response::ok(Me {
    id: auth.admin.id,
    email: auth.admin.email,
    name: auth.admin.name,
  })
}
