// server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::catalog;
use crate::errors::AppError;
use crate::models::{Page, ProductInput, ProductUpdate};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedAdmin;
use crate::web::response;

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
  pub category_id: Option<Uuid>,
  pub limit: Option<i64>,
  pub offset: Option<i64>,
}

#[instrument(name = "handler::list_products", skip(app_state, _auth))]
pub async fn list_products(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  query: web::Query<ProductListQuery>,
) -> Result<HttpResponse, AppError> {
  let page = Page {
    limit: query.limit,
    offset: query.offset,
  };
  let products = catalog::list_products(&app_state.db_pool, query.category_id, page).await?;
  Ok(response::ok(products))
}

#[instrument(name = "handler::get_product", skip(app_state, _auth))]
pub async fn get_product(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = catalog::get_product(&app_state.db_pool, path.into_inner()).await?;
  Ok(response::ok(product))
}

#[instrument(name = "handler::create_product", skip_all, fields(admin_id = %auth.admin.id))]
pub async fn create_product(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  payload: web::Json<ProductInput>,
) -> Result<HttpResponse, AppError> {
  payload.validate()?;
  payload.check_prices()?;
  let product = catalog::create_product(&app_state.db_pool, &payload).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(response::created(product))
}

#[instrument(name = "handler::update_product", skip(app_state, auth, payload), fields(admin_id = %auth.admin.id))]
pub async fn update_product(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
  payload: web::Json<ProductUpdate>,
) -> Result<HttpResponse, AppError> {
  payload.validate()?;
  payload.check_prices()?;
  let product = catalog::update_product(&app_state.db_pool, path.into_inner(), &payload).await?;
  Ok(response::ok(product))
}

#[instrument(name = "handler::delete_product", skip(app_state, auth), fields(admin_id = %auth.admin.id))]
pub async fn delete_product(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  catalog::delete_product(&app_state.db_pool, path.into_inner()).await?;
  Ok(response::deleted())
}
