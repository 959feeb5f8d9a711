// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper.

use async_trait::async_trait;
use backstore::order::{NoticeKind, NotifyError, OrderNotice, OrderNotifier, SentNotification};
use backstore::pipeline::Handler;
use backstore::{
  Address, ContextData, Coupon, CouponType, CustomerContact, Decimal, MemoryCouponStore, MemoryOrderStore, Order,
  OrderItem, OrderStatus, PaymentStatus, PipelineControl, PipelineError,
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

// --- Pipeline test context ---

/// A packing run used to exercise the pipeline in isolation.
#[derive(Clone, Debug, Default)]
pub struct PackingRun {
  pub trail: Vec<String>,
  pub boxes: u32,
  pub halt_after: Option<String>,
  pub skip_gift_wrap: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PackingError {
  #[error("pipeline: {0}")]
  Pipeline(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<PipelineError> for PackingError {
  fn from(err: PipelineError) -> Self {
    PackingError::Pipeline(format!("{:?}", err))
  }
}

/// Appends `label` to the trail and adds `boxes`; stops if `halt_after` names it.
pub fn packing_step(label: &'static str, boxes: u32) -> Handler<PackingRun, PackingError> {
  Box::new(move |ctx: ContextData<PackingRun>| {
    Box::pin(async move {
      let mut run = ctx.write();
      run.trail.push(label.to_string());
      run.boxes += boxes;
      tracing::debug!(step = label, boxes = run.boxes, "packing step ran");
      if run.halt_after.as_deref() == Some(label) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn broken_step(label: &'static str, reason: &'static str) -> Handler<PackingRun, PackingError> {
  Box::new(move |ctx: ContextData<PackingRun>| {
    Box::pin(async move {
      ctx.write().trail.push(label.to_string());
      Err(PackingError::Step(reason.to_string()))
    })
  })
}

// --- Tracing ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---
pub fn dec(s: &str) -> Decimal {
  s.parse().unwrap()
}

pub fn coupon(code: &str, coupon_type: CouponType, value: &str) -> Coupon {
  let now = Utc::now();
  Coupon {
    id: Uuid::new_v4(),
    code: code.to_string(),
    name: format!("{} promo", code),
    description: None,
    coupon_type,
    value: dec(value),
    min_order_amount: None,
    max_discount_amount: None,
    usage_limit: None,
    used_count: 0,
    valid_from: now - Duration::days(1),
    valid_until: now + Duration::days(30),
    is_active: true,
    created_at: now,
    updated_at: now,
  }
}

pub fn coupon_store_with(coupons: Vec<Coupon>) -> Arc<MemoryCouponStore> {
  let store = Arc::new(MemoryCouponStore::new());
  for c in coupons {
    store.insert_coupon(c);
  }
  store
}

pub fn address(full_name: &str) -> Address {
  Address {
    full_name: full_name.to_string(),
    phone: Some("+1 555 0100".to_string()),
    line1: "1 Market St".to_string(),
    line2: None,
    city: "Springfield".to_string(),
    state: Some("IL".to_string()),
    postal_code: "62701".to_string(),
    country: "US".to_string(),
  }
}

pub fn order(status: OrderStatus, user_id: Option<Uuid>) -> Order {
  let now = Utc::now();
  Order {
    id: Uuid::new_v4(),
    order_number: "ORD-1001".to_string(),
    user_id,
    status,
    payment_status: PaymentStatus::Paid,
    is_shipped: false,
    is_delivered: false,
    courier_name: Some("FastShip".to_string()),
    tracking_id: Some("FS123".to_string()),
    tracking_url: Some("https://track.example/FS123".to_string()),
    subtotal: dec("1200.00"),
    shipping_charges: dec("50.00"),
    discount: dec("0"),
    total_amount: dec("1250.00"),
    admin_notes: None,
    shipping_address: Some(address("Ada Lovelace")),
    billing_address: None,
    placed_at: now,
    created_at: now,
    updated_at: now,
  }
}

pub fn item(order_id: Uuid, name: &str, quantity: i32, unit_price: &str) -> OrderItem {
  let unit_price = dec(unit_price);
  OrderItem {
    id: Uuid::new_v4(),
    order_id,
    product_id: Some(Uuid::new_v4()),
    product_name: name.to_string(),
    quantity,
    unit_price,
    total_price: unit_price * Decimal::from(quantity),
  }
}

/// An order store seeded with one order whose customer has an email on file.
pub fn seeded_order_store(status: OrderStatus) -> (Arc<MemoryOrderStore>, Order) {
  let store = Arc::new(MemoryOrderStore::new());
  let user_id = Uuid::new_v4();
  let order = order(status, Some(user_id));
  store.insert_order(order.clone());
  store.insert_items(order.id, vec![item(order.id, "Walnut desk", 1, "1200.00")]);
  store.insert_customer(
    user_id,
    CustomerContact {
      name: Some("Ada".to_string()),
      email: Some("ada@example.com".to_string()),
    },
  );
  (store, order)
}

// --- Notifiers ---
#[derive(Debug, Clone)]
pub struct SentNotice {
  pub kind: NoticeKind,
  pub notice: OrderNotice,
  pub at: DateTime<Utc>,
}

/// Records every notice instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
  sent: Mutex<Vec<SentNotice>>,
}

impl RecordingNotifier {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn sent(&self) -> Vec<SentNotice> {
    self.sent.lock().clone()
  }

  pub fn count(&self, kind: NoticeKind) -> usize {
    self.sent.lock().iter().filter(|s| s.kind == kind).count()
  }

  fn record(&self, kind: NoticeKind, notice: &OrderNotice) -> SentNotification {
    let mut sent = self.sent.lock();
    sent.push(SentNotice {
      kind,
      notice: notice.clone(),
      at: Utc::now(),
    });
    SentNotification {
      message_id: format!("rec-{}", sent.len()),
    }
  }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
  async fn send_shipment(&self, notice: &OrderNotice) -> Result<SentNotification, NotifyError> {
    Ok(self.record(NoticeKind::Shipment, notice))
  }

  async fn send_delivery(&self, notice: &OrderNotice) -> Result<SentNotification, NotifyError> {
    Ok(self.record(NoticeKind::Delivery, notice))
  }
}

/// Fails every send, like a provider outage.
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[async_trait]
impl OrderNotifier for FailingNotifier {
  async fn send_shipment(&self, _notice: &OrderNotice) -> Result<SentNotification, NotifyError> {
    Err(NotifyError::Rejected("provider unavailable".to_string()))
  }

  async fn send_delivery(&self, _notice: &OrderNotice) -> Result<SentNotification, NotifyError> {
    Err(NotifyError::Transport {
      source: anyhow::anyhow!("connection reset"),
    })
  }
}
