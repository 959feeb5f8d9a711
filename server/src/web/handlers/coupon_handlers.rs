// server/src/web/handlers/coupon_handlers.rs

use actix_web::{web, HttpResponse};
use backstore::{BackstoreError, CouponChanges, Decimal};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::coupon::check_changes;
use crate::models::CouponInput;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedAdmin;
use crate::web::response;

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
  pub code: String,
  pub order_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RedeemCouponRequest {
  pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CouponListQuery {
  pub active: Option<bool>,
}

/// Public. An unusable code is still `200` with `valid: false`.
#[instrument(name = "handler::validate_coupon", skip(app_state, payload), fields(code = %payload.code))]
pub async fn validate_coupon(
  app_state: web::Data<AppState>,
  payload: web::Json<ValidateCouponRequest>,
) -> Result<HttpResponse, AppError> {
  let quote = app_state
    .coupon_engine
    .validate_and_quote(&payload.code, payload.order_amount, Utc::now())
    .await?;
  Ok(response::ok(quote))
}

#[instrument(name = "handler::redeem_coupon", skip(app_state, payload, auth), fields(code = %payload.code, admin_id = %auth.admin.id))]
pub async fn redeem_coupon(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  payload: web::Json<RedeemCouponRequest>,
) -> Result<HttpResponse, AppError> {
  let coupon = app_state.coupon_engine.redeem(&payload.code, Utc::now()).await?;
  Ok(response::ok(coupon))
}

#[instrument(name = "handler::list_coupons", skip(app_state, _auth))]
pub async fn list_coupons(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  query: web::Query<CouponListQuery>,
) -> Result<HttpResponse, AppError> {
  let coupons = app_state.coupons.list(query.active).await?;
  Ok(response::ok(coupons))
}

#[instrument(name = "handler::get_coupon", skip(app_state, _auth))]
pub async fn get_coupon(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let id = path.into_inner();
  let coupon = app_state
    .coupons
    .find_by_id(id)
    .await?
    .ok_or_else(|| BackstoreError::not_found("Coupon", id))?;
  Ok(response::ok(coupon))
}

#[instrument(name = "handler::create_coupon", skip_all, fields(admin_id = %auth.admin.id))]
pub async fn create_coupon(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  payload: web::Json<CouponInput>,
) -> Result<HttpResponse, AppError> {
  let new_coupon = payload.into_inner().into_new_coupon()?;
  let coupon = app_state.coupons.insert(new_coupon).await?;
  info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon created.");
  Ok(response::created(coupon))
}

#[instrument(name = "handler::update_coupon", skip(app_state, auth, payload), fields(admin_id = %auth.admin.id))]
pub async fn update_coupon(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
  payload: web::Json<CouponChanges>,
) -> Result<HttpResponse, AppError> {
  let id = path.into_inner();
  let changes = payload.into_inner();
  let current = app_state
    .coupons
    .find_by_id(id)
    .await?
    .ok_or_else(|| BackstoreError::not_found("Coupon", id))?;
  check_changes(&current, &changes)?;

  let coupon = app_state
    .coupons
    .update(id, &changes)
    .await?
    .ok_or_else(|| BackstoreError::not_found("Coupon", id))?;
  Ok(response::ok(coupon))
}

/// Soft delete: the coupon is deactivated so past orders keep their reference.
#[instrument(name = "handler::delete_coupon", skip(app_state, auth), fields(admin_id = %auth.admin.id))]
pub async fn delete_coupon(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let id = path.into_inner();
  let changes = CouponChanges {
    is_active: Some(false),
    ..Default::default()
  };
  let coupon = app_state
    .coupons
    .update(id, &changes)
    .await?
    .ok_or_else(|| BackstoreError::not_found("Coupon", id))?;
  info!(coupon_id = %coupon.id, "Coupon deactivated.");
  Ok(response::ok(coupon))
}
