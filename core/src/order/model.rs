// core/src/order/model.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::BackstoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Paid,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Paid,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Paid => "paid",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = BackstoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| {
        BackstoreError::Validation(format!(
          "Invalid status '{}'. Allowed: pending, paid, shipped, delivered, cancelled",
          s
        ))
      })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Paid,
  Failed,
  Refunded,
}

impl PaymentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Paid => "paid",
      PaymentStatus::Failed => "failed",
      PaymentStatus::Refunded => "refunded",
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PaymentStatus {
  type Err = BackstoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(PaymentStatus::Pending),
      "paid" => Ok(PaymentStatus::Paid),
      "failed" => Ok(PaymentStatus::Failed),
      "refunded" => Ok(PaymentStatus::Refunded),
      other => Err(BackstoreError::Validation(format!(
        "Invalid payment status '{}'. Allowed: pending, paid, failed, refunded",
        other
      ))),
    }
  }
}

/// Address snapshot captured on the order at checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
  pub full_name: String,
  pub phone: Option<String>,
  pub line1: String,
  pub line2: Option<String>,
  pub city: String,
  pub state: Option<String>,
  pub postal_code: String,
  pub country: String,
}

impl Address {
  /// Single-line rendering for notification bodies.
  pub fn one_line(&self) -> String {
    let mut parts: Vec<&str> = vec![self.full_name.as_str(), self.line1.as_str()];
    if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
      parts.push(line2);
    }
    parts.push(self.city.as_str());
    if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
      parts.push(state);
    }
    parts.push(self.postal_code.as_str());
    parts.push(self.country.as_str());
    parts.retain(|p| !p.is_empty());
    parts.join(", ")
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub order_number: String,
  pub user_id: Option<Uuid>,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  /// Set when the order first enters `shipped`; never cleared automatically.
  pub is_shipped: bool,
  /// Set when the order first enters `delivered`; never cleared automatically.
  pub is_delivered: bool,
  pub courier_name: Option<String>,
  pub tracking_id: Option<String>,
  pub tracking_url: Option<String>,
  pub subtotal: Decimal,
  pub shipping_charges: Decimal,
  pub discount: Decimal,
  pub total_amount: Decimal,
  pub admin_notes: Option<String>,
  pub shipping_address: Option<Address>,
  pub billing_address: Option<Address>,
  pub placed_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// Applies `changes` the same way the persistent stores do.
  pub fn apply_changes(&mut self, changes: &OrderChanges, now: DateTime<Utc>) {
    if let Some(status) = changes.status {
      self.status = status;
    }
    if let Some(payment_status) = changes.payment_status {
      self.payment_status = payment_status;
    }
    if let Some(is_shipped) = changes.is_shipped {
      self.is_shipped = is_shipped;
    }
    if let Some(is_delivered) = changes.is_delivered {
      self.is_delivered = is_delivered;
    }
    if let Some(courier) = &changes.courier_name {
      self.courier_name = Some(courier.clone());
    }
    if let Some(tracking_id) = &changes.tracking_id {
      self.tracking_id = Some(tracking_id.clone());
    }
    if let Some(tracking_url) = &changes.tracking_url {
      self.tracking_url = Some(tracking_url.clone());
    }
    if changes.shipping_charges.is_some() || changes.discount.is_some() {
      self.shipping_charges = changes.shipping_charges.unwrap_or(self.shipping_charges);
      self.discount = changes.discount.unwrap_or(self.discount);
      self.total_amount = (self.subtotal + self.shipping_charges - self.discount).max(Decimal::ZERO);
    }
    if let Some(notes) = &changes.admin_notes {
      self.admin_notes = Some(notes.clone());
    }
    self.updated_at = now;
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Option<Uuid>,
  pub product_name: String,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub total_price: Decimal,
}

/// Append-only log row written on every status update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusHistory {
  pub id: Uuid,
  pub order_id: Uuid,
  pub status: OrderStatus,
  pub notes: String,
  pub changed_by: Option<Uuid>,
  pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStatusHistory {
  pub order_id: Uuid,
  pub status: OrderStatus,
  pub notes: String,
  pub changed_by: Option<Uuid>,
  pub changed_at: DateTime<Utc>,
}

/// Who to notify about an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerContact {
  pub name: Option<String>,
  pub email: Option<String>,
}

/// Fields an administrator may edit from the order detail screen.
///
/// Identity and audit fields (`id`, `order_number`, `user_id`, `placed_at`,
/// `created_at`, `created_by`) cannot be expressed here, and unknown fields are
/// rejected at deserialization. A patched `status` is merged like any other
/// field: no history row, and notifications follow the flags only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderPatch {
  pub status: Option<OrderStatus>,
  pub payment_status: Option<PaymentStatus>,
  pub is_shipped: Option<bool>,
  pub is_delivered: Option<bool>,
  pub courier_name: Option<String>,
  pub tracking_id: Option<String>,
  pub tracking_url: Option<String>,
  pub shipping_charges: Option<Decimal>,
  pub discount: Option<Decimal>,
  pub admin_notes: Option<String>,
}

impl OrderPatch {
  pub fn is_empty(&self) -> bool {
    self == &OrderPatch::default()
  }

  pub fn validate(&self) -> Result<(), BackstoreError> {
    if self.is_empty() {
      return Err(BackstoreError::Validation("No updatable fields provided".to_string()));
    }
    if self.shipping_charges.map_or(false, |v| v < Decimal::ZERO) {
      return Err(BackstoreError::Validation(
        "shipping_charges cannot be negative".to_string(),
      ));
    }
    if self.discount.map_or(false, |v| v < Decimal::ZERO) {
      return Err(BackstoreError::Validation("discount cannot be negative".to_string()));
    }
    Ok(())
  }
}

/// The column-level change set handed to an `OrderStore`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderChanges {
  pub status: Option<OrderStatus>,
  pub payment_status: Option<PaymentStatus>,
  pub is_shipped: Option<bool>,
  pub is_delivered: Option<bool>,
  pub courier_name: Option<String>,
  pub tracking_id: Option<String>,
  pub tracking_url: Option<String>,
  pub shipping_charges: Option<Decimal>,
  pub discount: Option<Decimal>,
  pub admin_notes: Option<String>,
}

impl OrderChanges {
  /// Status change plus the derived flag it implies.
  pub fn for_status(status: OrderStatus) -> Self {
    Self {
      status: Some(status),
      is_shipped: (status == OrderStatus::Shipped).then_some(true),
      is_delivered: (status == OrderStatus::Delivered).then_some(true),
      ..Default::default()
    }
  }
}

impl From<&OrderPatch> for OrderChanges {
  fn from(patch: &OrderPatch) -> Self {
    Self {
      status: patch.status,
      payment_status: patch.payment_status,
      is_shipped: patch.is_shipped,
      is_delivered: patch.is_delivered,
      courier_name: patch.courier_name.clone(),
      tracking_id: patch.tracking_id.clone(),
      tracking_url: patch.tracking_url.clone(),
      shipping_charges: patch.shipping_charges,
      discount: patch.discount,
      admin_notes: patch.admin_notes.clone(),
    }
  }
}

/// Listing filter for the admin order table.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFilter {
  pub status: Option<OrderStatus>,
  pub limit: i64,
  pub offset: i64,
}

impl Default for OrderFilter {
  fn default() -> Self {
    Self {
      status: None,
      limit: 50,
      offset: 0,
    }
  }
}
