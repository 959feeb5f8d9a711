// core/src/order/notify.rs

//! The notification sink for order transitions and the payload it receives.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::model::{Address, CustomerContact, Order, OrderItem};

pub const FALLBACK_CUSTOMER_NAME: &str = "Valued Customer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
  Shipment,
  Delivery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoticeLine {
  pub product_name: String,
  pub quantity: i32,
  pub unit_price: Decimal,
  pub total_price: Decimal,
}

impl From<&OrderItem> for NoticeLine {
  fn from(item: &OrderItem) -> Self {
    Self {
      product_name: item.product_name.clone(),
      quantity: item.quantity,
      unit_price: item.unit_price,
      total_price: item.total_price,
    }
  }
}

/// Everything a shipment or delivery email needs, snapshotted at send time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderNotice {
  pub to_email: String,
  pub customer_name: String,
  pub order_number: String,
  pub courier_name: Option<String>,
  pub tracking_id: Option<String>,
  pub tracking_url: Option<String>,
  pub shipping_address: Option<Address>,
  pub items: Vec<NoticeLine>,
  pub total_amount: Decimal,
}

impl OrderNotice {
  /// `None` when the customer has no usable email address.
  pub fn build(order: &Order, contact: &CustomerContact, items: &[OrderItem]) -> Option<Self> {
    let to_email = contact
      .email
      .as_deref()
      .map(str::trim)
      .filter(|email| !email.is_empty())?
      .to_string();

    let customer_name = contact
      .name
      .as_deref()
      .map(str::trim)
      .filter(|name| !name.is_empty())
      .or_else(|| order.shipping_address.as_ref().map(|a| a.full_name.as_str()))
      .filter(|name| !name.is_empty())
      .unwrap_or(FALLBACK_CUSTOMER_NAME)
      .to_string();

    Some(Self {
      to_email,
      customer_name,
      order_number: order.order_number.clone(),
      courier_name: order.courier_name.clone(),
      tracking_id: order.tracking_id.clone(),
      tracking_url: order.tracking_url.clone(),
      shipping_address: order.shipping_address.clone(),
      items: items.iter().map(NoticeLine::from).collect(),
      total_amount: order.total_amount,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
  pub message_id: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("Notification provider rejected the message: {0}")]
  Rejected(String),

  #[error("Notification transport failed: {source}")]
  Transport {
    #[source]
    source: anyhow::Error,
  },
}

/// Sends transactional order emails. Callers treat every error as non-fatal.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
  async fn send_shipment(&self, notice: &OrderNotice) -> Result<SentNotification, NotifyError>;

  async fn send_delivery(&self, notice: &OrderNotice) -> Result<SentNotification, NotifyError>;
}
