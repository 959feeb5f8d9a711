// server/src/web/handlers/category_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::db::catalog;
use crate::errors::AppError;
use crate::models::CategoryInput;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedAdmin;
use crate::web::response;

#[instrument(name = "handler::list_categories", skip_all)]
pub async fn list_categories(app_state: web::Data<AppState>, _auth: AuthenticatedAdmin) -> Result<HttpResponse, AppError> {
  Ok(response::ok(catalog::list_categories(&app_state.db_pool).await?))
}

#[instrument(name = "handler::get_category", skip(app_state, _auth))]
pub async fn get_category(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  Ok(response::ok(catalog::get_category(&app_state.db_pool, path.into_inner()).await?))
}

#[instrument(name = "handler::create_category", skip_all)]
pub async fn create_category(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  payload: web::Json<CategoryInput>,
) -> Result<HttpResponse, AppError> {
  payload.validate()?;
  Ok(response::created(catalog::create_category(&app_state.db_pool, &payload).await?))
}

#[instrument(name = "handler::update_category", skip(app_state, _auth, payload))]
pub async fn update_category(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
  payload: web::Json<CategoryInput>,
) -> Result<HttpResponse, AppError> {
  payload.validate()?;
  Ok(response::ok(
    catalog::update_category(&app_state.db_pool, path.into_inner(), &payload).await?,
  ))
}

/// `409` while products still reference the category.
#[instrument(name = "handler::delete_category", skip(app_state, _auth))]
pub async fn delete_category(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  catalog::delete_category(&app_state.db_pool, path.into_inner()).await?;
  Ok(response::deleted())
}
