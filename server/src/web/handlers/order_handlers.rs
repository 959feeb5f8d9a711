// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use backstore::{BackstoreError, Order, OrderFilter, OrderItem, OrderPatch, OrderStatus, OrderStatusHistory};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Page;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedAdmin;
use crate::web::response;

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
  pub status: Option<String>,
  pub limit: Option<i64>,
  pub offset: Option<i64>,
}

/// `status` is taken as a raw string so a missing or unknown value is a
/// domain validation error rather than a deserializer message.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
  pub status: Option<String>,
  pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
  pub history: Vec<OrderStatusHistory>,
}

#[instrument(name = "handler::list_orders", skip(app_state, _auth))]
pub async fn list_orders(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let status = query
    .status
    .as_deref()
    .map(|s| s.trim().parse::<OrderStatus>())
    .transpose()?;
  let page = Page {
    limit: query.limit,
    offset: query.offset,
  };
  let filter = OrderFilter {
    status,
    limit: page.limit(),
    offset: page.offset(),
  };
  let orders = app_state.orders.list_orders(&filter).await?;
  Ok(response::ok(orders))
}

#[instrument(name = "handler::get_order", skip(app_state, _auth))]
pub async fn get_order(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let id = path.into_inner();
  let order = app_state
    .orders
    .find_order(id)
    .await?
    .ok_or_else(|| BackstoreError::not_found("Order", id))?;
  let (items, history) = tokio::try_join!(app_state.orders.order_items(id), app_state.orders.list_history(id))?;
  Ok(response::ok(OrderDetail { order, items, history }))
}

#[instrument(name = "handler::order_history", skip(app_state, _auth))]
pub async fn order_history(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let id = path.into_inner();
  if app_state.orders.find_order(id).await?.is_none() {
    return Err(BackstoreError::not_found("Order", id).into());
  }
  let history = app_state.orders.list_history(id).await?;
  Ok(response::ok(history))
}

/// Responds with the history row the update appended.
#[instrument(name = "handler::update_order_status", skip(app_state, auth, payload), fields(admin_id = %auth.admin.id))]
pub async fn update_order_status(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
  payload: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
  let id = path.into_inner();
  let payload = payload.into_inner();
  let status = payload
    .status
    .filter(|s| !s.trim().is_empty())
    .ok_or_else(|| AppError::Validation("status is required".to_string()))?;

  let change = app_state
    .order_workflow
    .set_status(id, &status, payload.notes, Some(auth.admin.id))
    .await?;
  info!(order_id = %id, status = %change.order.status, "Order status updated.");
  Ok(response::ok(change.history))
}

#[instrument(name = "handler::patch_order", skip(app_state, auth, payload), fields(admin_id = %auth.admin.id))]
pub async fn patch_order(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
  payload: web::Json<OrderPatch>,
) -> Result<HttpResponse, AppError> {
  let id = path.into_inner();
  let order = app_state
    .order_workflow
    .patch_order(id, payload.into_inner(), Some(auth.admin.id))
    .await?;
  Ok(response::ok(order))
}
