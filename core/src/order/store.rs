// core/src/order/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{
  CustomerContact, NewStatusHistory, Order, OrderChanges, OrderFilter, OrderItem, OrderStatusHistory,
};
use crate::error::BackstoreResult;

/// Persistence contract for orders and their status log.
///
/// `Ok(None)` means "no such record"; `Err` means the store itself failed.
#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn find_order(&self, id: Uuid) -> BackstoreResult<Option<Order>>;

  async fn list_orders(&self, filter: &OrderFilter) -> BackstoreResult<Vec<Order>>;

  /// Applies only the fields present in `changes` and returns the updated row.
  async fn update_order(&self, id: Uuid, changes: &OrderChanges) -> BackstoreResult<Option<Order>>;

  async fn append_history(&self, entry: NewStatusHistory) -> BackstoreResult<OrderStatusHistory>;

  /// Oldest first.
  async fn list_history(&self, order_id: Uuid) -> BackstoreResult<Vec<OrderStatusHistory>>;

  async fn order_items(&self, order_id: Uuid) -> BackstoreResult<Vec<OrderItem>>;

  async fn customer_contact(&self, user_id: Uuid) -> BackstoreResult<Option<CustomerContact>>;
}
