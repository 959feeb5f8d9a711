// server/src/db/orders.rs

use async_trait::async_trait;
use backstore::order::{
  Address, CustomerContact, NewStatusHistory, Order, OrderChanges, OrderFilter, OrderItem, OrderStatusHistory,
  OrderStore,
};
use backstore::{BackstoreError, BackstoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::store_error;

const ORDER_COLUMNS: &str = "id, order_number, user_id, status, payment_status, is_shipped, is_delivered, \
   courier_name, tracking_id, tracking_url, subtotal, shipping_charges, discount, total_amount, admin_notes, \
   shipping_address, billing_address, placed_at, created_at, updated_at";

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  order_number: String,
  user_id: Option<Uuid>,
  status: String,
  payment_status: String,
  is_shipped: bool,
  is_delivered: bool,
  courier_name: Option<String>,
  tracking_id: Option<String>,
  tracking_url: Option<String>,
  subtotal: Decimal,
  shipping_charges: Decimal,
  discount: Decimal,
  total_amount: Decimal,
  admin_notes: Option<String>,
  shipping_address: Option<Json<Address>>,
  billing_address: Option<Json<Address>>,
  placed_at: DateTime<Utc>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

fn corrupt(table: &str, id: Uuid, err: BackstoreError) -> BackstoreError {
  BackstoreError::store(anyhow::anyhow!("corrupt {} row {}: {}", table, id, err))
}

impl TryFrom<OrderRow> for Order {
  type Error = BackstoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    Ok(Order {
      id: row.id,
      order_number: row.order_number,
      user_id: row.user_id,
      status: row.status.parse().map_err(|e| corrupt("orders", row.id, e))?,
      payment_status: row.payment_status.parse().map_err(|e| corrupt("orders", row.id, e))?,
      is_shipped: row.is_shipped,
      is_delivered: row.is_delivered,
      courier_name: row.courier_name,
      tracking_id: row.tracking_id,
      tracking_url: row.tracking_url,
      subtotal: row.subtotal,
      shipping_charges: row.shipping_charges,
      discount: row.discount,
      total_amount: row.total_amount,
      admin_notes: row.admin_notes,
      shipping_address: row.shipping_address.map(|a| a.0),
      billing_address: row.billing_address.map(|a| a.0),
      placed_at: row.placed_at,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct HistoryRow {
  id: Uuid,
  order_id: Uuid,
  status: String,
  notes: String,
  changed_by: Option<Uuid>,
  changed_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for OrderStatusHistory {
  type Error = BackstoreError;

  fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
    Ok(OrderStatusHistory {
      id: row.id,
      order_id: row.order_id,
      status: row.status.parse().map_err(|e| corrupt("order_status_history", row.id, e))?,
      notes: row.notes,
      changed_by: row.changed_by,
      changed_at: row.changed_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct ItemRow {
  id: Uuid,
  order_id: Uuid,
  product_id: Option<Uuid>,
  product_name: String,
  quantity: i32,
  unit_price: Decimal,
  total_price: Decimal,
}

impl From<ItemRow> for OrderItem {
  fn from(row: ItemRow) -> Self {
    OrderItem {
      id: row.id,
      order_id: row.order_id,
      product_id: row.product_id,
      product_name: row.product_name,
      quantity: row.quantity,
      unit_price: row.unit_price,
      total_price: row.total_price,
    }
  }
}

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "db::orders::find_order", skip(self), err(Display))]
  async fn find_order(&self, id: Uuid) -> BackstoreResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    row.map(Order::try_from).transpose()
  }

  #[instrument(name = "db::orders::list_orders", skip(self), err(Display))]
  async fn list_orders(&self, filter: &OrderFilter) -> BackstoreResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE ($1::text IS NULL OR status = $1) \
       ORDER BY placed_at DESC LIMIT $2 OFFSET $3",
      ORDER_COLUMNS
    ))
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    rows.into_iter().map(Order::try_from).collect()
  }

  /// Absent fields keep their stored value. The total is recomputed only when
  /// shipping or discount change, mirroring `Order::apply_changes`.
  #[instrument(name = "db::orders::update_order", skip(self, changes), err(Display))]
  async fn update_order(&self, id: Uuid, changes: &OrderChanges) -> BackstoreResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
      "UPDATE orders SET \
         status = COALESCE($2, status), \
         payment_status = COALESCE($3, payment_status), \
         is_shipped = COALESCE($4, is_shipped), \
         is_delivered = COALESCE($5, is_delivered), \
         courier_name = COALESCE($6, courier_name), \
         tracking_id = COALESCE($7, tracking_id), \
         tracking_url = COALESCE($8, tracking_url), \
         shipping_charges = COALESCE($9, shipping_charges), \
         discount = COALESCE($10, discount), \
         total_amount = CASE \
           WHEN $9::numeric IS NULL AND $10::numeric IS NULL THEN total_amount \
           ELSE GREATEST(subtotal + COALESCE($9, shipping_charges) - COALESCE($10, discount), 0) \
         END, \
         admin_notes = COALESCE($11, admin_notes), \
         updated_at = now() \
       WHERE id = $1 \
       RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(id)
    .bind(changes.status.map(|s| s.as_str()))
    .bind(changes.payment_status.map(|s| s.as_str()))
    .bind(changes.is_shipped)
    .bind(changes.is_delivered)
    .bind(&changes.courier_name)
    .bind(&changes.tracking_id)
    .bind(&changes.tracking_url)
    .bind(changes.shipping_charges)
    .bind(changes.discount)
    .bind(&changes.admin_notes)
    .fetch_optional(&self.pool)
    .await
    .map_err(store_error)?;
    row.map(Order::try_from).transpose()
  }

  #[instrument(name = "db::orders::append_history", skip(self, entry), fields(order_id = %entry.order_id), err(Display))]
  async fn append_history(&self, entry: NewStatusHistory) -> BackstoreResult<OrderStatusHistory> {
    let row: HistoryRow = sqlx::query_as(
      "INSERT INTO order_status_history (id, order_id, status, notes, changed_by, changed_at) \
       VALUES ($1, $2, $3, $4, $5, $6) \
       RETURNING id, order_id, status, notes, changed_by, changed_at",
    )
    .bind(Uuid::new_v4())
    .bind(entry.order_id)
    .bind(entry.status.as_str())
    .bind(&entry.notes)
    .bind(entry.changed_by)
    .bind(entry.changed_at)
    .fetch_one(&self.pool)
    .await
    .map_err(store_error)?;
    OrderStatusHistory::try_from(row)
  }

  #[instrument(name = "db::orders::list_history", skip(self), err(Display))]
  async fn list_history(&self, order_id: Uuid) -> BackstoreResult<Vec<OrderStatusHistory>> {
    let rows: Vec<HistoryRow> = sqlx::query_as(
      "SELECT id, order_id, status, notes, changed_by, changed_at FROM order_status_history \
       WHERE order_id = $1 ORDER BY changed_at ASC, id ASC",
    )
    .bind(order_id)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    rows.into_iter().map(OrderStatusHistory::try_from).collect()
  }

  #[instrument(name = "db::orders::order_items", skip(self), err(Display))]
  async fn order_items(&self, order_id: Uuid) -> BackstoreResult<Vec<OrderItem>> {
    let rows: Vec<ItemRow> = sqlx::query_as(
      "SELECT id, order_id, product_id, product_name, quantity, unit_price, total_price \
       FROM order_items WHERE order_id = $1 ORDER BY product_name ASC",
    )
    .bind(order_id)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    Ok(rows.into_iter().map(OrderItem::from).collect())
  }

  #[instrument(name = "db::orders::customer_contact", skip(self), err(Display))]
  async fn customer_contact(&self, user_id: Uuid) -> BackstoreResult<Option<CustomerContact>> {
    let row: Option<(Option<String>, Option<String>)> =
      sqlx::query_as("SELECT name, email FROM customers WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
    Ok(row.map(|(name, email)| CustomerContact { name, email }))
  }
}
