// server/src/web/extractors.rs

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::errors::AppError;
use crate::models::AdminUser;
use crate::state::AppState;

/// An admin resolved from `Authorization: Bearer <token>`.
///
/// Missing, unknown and expired tokens are all `401`.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
  pub admin: AdminUser,
  pub token: String,
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
  let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

impl FromRequest for AuthenticatedAdmin {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let token = bearer_token(req);
    let state = req.app_data::<web::Data<AppState>>().cloned();

    Box::pin(async move {
      let token = token.ok_or_else(|| AppError::Auth("Missing bearer token.".to_string()))?;
      let state = state.ok_or_else(|| AppError::Internal("Application state not configured.".to_string()))?;

      let (session, admin) = match state.admins.find_session(&token).await? {
        Some(found) => found,
        None => {
          warn!("Rejected unknown session token.");
          return Err(AppError::Auth("Invalid or expired session.".to_string()));
        }
      };
      if session.is_expired(Utc::now()) {
        warn!(admin_id = %admin.id, "Rejected expired session token.");
        return Err(AppError::Auth("Invalid or expired session.".to_string()));
      }
      Ok(AuthenticatedAdmin { admin, token })
    })
  }
}
