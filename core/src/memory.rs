// core/src/memory.rs

//! In-process implementations of the store traits.
//!
//! Used by tests and benchmarks, and as a reference for what a persistent
//! store must guarantee. Each store serializes its operations behind a single
//! `parking_lot::Mutex`, which is what makes the conditional increment atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::coupon::{is_redeemable, normalize_code, Coupon, CouponChanges, CouponStore, NewCoupon};
use crate::error::{BackstoreError, BackstoreResult};
use crate::order::{
  CustomerContact, NewStatusHistory, Order, OrderChanges, OrderFilter, OrderItem, OrderStatusHistory, OrderStore,
};

#[derive(Debug, Default)]
pub struct MemoryCouponStore {
  coupons: Mutex<HashMap<Uuid, Coupon>>,
  writes: AtomicUsize,
}

impl MemoryCouponStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seeds a fully formed coupon, bypassing the duplicate check.
  pub fn insert_coupon(&self, mut coupon: Coupon) {
    coupon.code = normalize_code(&coupon.code);
    self.coupons.lock().insert(coupon.id, coupon);
  }

  pub fn get(&self, code: &str) -> Option<Coupon> {
    let code = normalize_code(code);
    self.coupons.lock().values().find(|c| c.code == code).cloned()
  }

  /// Number of mutating calls that changed state.
  pub fn write_count(&self) -> usize {
    self.writes.load(Ordering::SeqCst)
  }

  fn record_write(&self) {
    self.writes.fetch_add(1, Ordering::SeqCst);
  }
}

#[async_trait]
impl CouponStore for MemoryCouponStore {
  async fn find_by_code(&self, code: &str) -> BackstoreResult<Option<Coupon>> {
    Ok(self.coupons.lock().values().find(|c| c.code == code).cloned())
  }

  async fn find_by_id(&self, id: Uuid) -> BackstoreResult<Option<Coupon>> {
    Ok(self.coupons.lock().get(&id).cloned())
  }

  async fn list(&self, active: Option<bool>) -> BackstoreResult<Vec<Coupon>> {
    let mut coupons: Vec<Coupon> = self
      .coupons
      .lock()
      .values()
      .filter(|c| active.map_or(true, |a| c.is_active == a))
      .cloned()
      .collect();
    coupons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(coupons)
  }

  async fn insert(&self, new: NewCoupon) -> BackstoreResult<Coupon> {
    let code = normalize_code(&new.code);
    let mut coupons = self.coupons.lock();
    if coupons.values().any(|c| c.code == code) {
      return Err(BackstoreError::Conflict(format!("Coupon code '{}' already exists", code)));
    }
    let now = Utc::now();
    let coupon = Coupon {
      id: Uuid::new_v4(),
      code,
      name: new.name,
      description: new.description,
      coupon_type: new.coupon_type,
      value: new.value,
      min_order_amount: new.min_order_amount,
      max_discount_amount: new.max_discount_amount,
      usage_limit: new.usage_limit,
      used_count: 0,
      valid_from: new.valid_from,
      valid_until: new.valid_until,
      is_active: new.is_active,
      created_at: now,
      updated_at: now,
    };
    coupons.insert(coupon.id, coupon.clone());
    drop(coupons);
    self.record_write();
    Ok(coupon)
  }

  async fn update(&self, id: Uuid, changes: &CouponChanges) -> BackstoreResult<Option<Coupon>> {
    let mut coupons = self.coupons.lock();
    let updated = coupons.get_mut(&id).map(|coupon| {
      changes.apply_to(coupon, Utc::now());
      coupon.clone()
    });
    drop(coupons);
    if updated.is_some() {
      self.record_write();
    }
    Ok(updated)
  }

  async fn increment_usage_if_redeemable(&self, code: &str, now: DateTime<Utc>) -> BackstoreResult<Option<Coupon>> {
    let mut coupons = self.coupons.lock();
    let updated = coupons
      .values_mut()
      .find(|c| c.code == code && is_redeemable(c, now))
      .map(|coupon| {
        coupon.used_count += 1;
        coupon.updated_at = now;
        coupon.clone()
      });
    drop(coupons);
    if updated.is_some() {
      self.record_write();
    }
    Ok(updated)
  }
}

#[derive(Debug, Default)]
struct OrderTables {
  orders: HashMap<Uuid, Order>,
  items: HashMap<Uuid, Vec<OrderItem>>,
  history: Vec<OrderStatusHistory>,
  customers: HashMap<Uuid, CustomerContact>,
}

#[derive(Debug, Default)]
pub struct MemoryOrderStore {
  tables: Mutex<OrderTables>,
  writes: AtomicUsize,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_order(&self, order: Order) {
    self.tables.lock().orders.insert(order.id, order);
  }

  pub fn insert_items(&self, order_id: Uuid, items: Vec<OrderItem>) {
    self.tables.lock().items.insert(order_id, items);
  }

  pub fn insert_customer(&self, user_id: Uuid, contact: CustomerContact) {
    self.tables.lock().customers.insert(user_id, contact);
  }

  pub fn get(&self, id: Uuid) -> Option<Order> {
    self.tables.lock().orders.get(&id).cloned()
  }

  pub fn history_for(&self, order_id: Uuid) -> Vec<OrderStatusHistory> {
    self
      .tables
      .lock()
      .history
      .iter()
      .filter(|h| h.order_id == order_id)
      .cloned()
      .collect()
  }

  pub fn write_count(&self) -> usize {
    self.writes.load(Ordering::SeqCst)
  }

  fn record_write(&self) {
    self.writes.fetch_add(1, Ordering::SeqCst);
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  async fn find_order(&self, id: Uuid) -> BackstoreResult<Option<Order>> {
    Ok(self.tables.lock().orders.get(&id).cloned())
  }

  async fn list_orders(&self, filter: &OrderFilter) -> BackstoreResult<Vec<Order>> {
    let tables = self.tables.lock();
    let mut orders: Vec<Order> = tables
      .orders
      .values()
      .filter(|o| filter.status.map_or(true, |s| o.status == s))
      .cloned()
      .collect();
    drop(tables);
    orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
    Ok(
      orders
        .into_iter()
        .skip(filter.offset.max(0) as usize)
        .take(filter.limit.max(0) as usize)
        .collect(),
    )
  }

  async fn update_order(&self, id: Uuid, changes: &OrderChanges) -> BackstoreResult<Option<Order>> {
    let mut tables = self.tables.lock();
    let updated = tables.orders.get_mut(&id).map(|order| {
      order.apply_changes(changes, Utc::now());
      order.clone()
    });
    drop(tables);
    if updated.is_some() {
      self.record_write();
    }
    Ok(updated)
  }

  async fn append_history(&self, entry: NewStatusHistory) -> BackstoreResult<OrderStatusHistory> {
    let row = OrderStatusHistory {
      id: Uuid::new_v4(),
      order_id: entry.order_id,
      status: entry.status,
      notes: entry.notes,
      changed_by: entry.changed_by,
      changed_at: entry.changed_at,
    };
    self.tables.lock().history.push(row.clone());
    self.record_write();
    Ok(row)
  }

  async fn list_history(&self, order_id: Uuid) -> BackstoreResult<Vec<OrderStatusHistory>> {
    Ok(self.history_for(order_id))
  }

  async fn order_items(&self, order_id: Uuid) -> BackstoreResult<Vec<OrderItem>> {
    Ok(self.tables.lock().items.get(&order_id).cloned().unwrap_or_default())
  }

  async fn customer_contact(&self, user_id: Uuid) -> BackstoreResult<Option<CustomerContact>> {
    Ok(self.tables.lock().customers.get(&user_id).cloned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::coupon::CouponType;
  use chrono::Duration;
  use rust_decimal::Decimal;

  fn new_coupon(code: &str, usage_limit: Option<i32>) -> NewCoupon {
    let now = Utc::now();
    NewCoupon {
      code: code.to_string(),
      name: "Ten off".to_string(),
      description: None,
      coupon_type: CouponType::FixedAmount,
      value: Decimal::TEN,
      min_order_amount: None,
      max_discount_amount: None,
      usage_limit,
      valid_from: now - Duration::hours(1),
      valid_until: now + Duration::hours(1),
      is_active: true,
    }
  }

  #[tokio::test]
  async fn insert_normalizes_and_rejects_duplicates() {
    let store = MemoryCouponStore::new();
    let created = store.insert(new_coupon(" ten ", None)).await.unwrap();
    assert_eq!(created.code, "TEN");
    let err = store.insert(new_coupon("Ten", None)).await.unwrap_err();
    assert!(matches!(err, BackstoreError::Conflict(_)));
  }

  #[tokio::test]
  async fn conditional_increment_stops_at_the_limit() {
    let store = MemoryCouponStore::new();
    store.insert(new_coupon("ONCE", Some(1))).await.unwrap();
    let now = Utc::now();
    assert!(store.increment_usage_if_redeemable("ONCE", now).await.unwrap().is_some());
    assert!(store.increment_usage_if_redeemable("ONCE", now).await.unwrap().is_none());
    assert_eq!(store.get("once").unwrap().used_count, 1);
  }
}
