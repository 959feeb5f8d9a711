// core/src/order/transitions.rs

use serde::Serialize;

use super::model::{Order, OrderChanges, OrderPatch, OrderStatus};

/// An update request, from either entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderUpdate {
  /// Explicit status change from the status endpoint. Always logs history.
  Status { status: OrderStatus, notes: Option<String> },
  /// Field edit from the order detail screen.
  Patch(OrderPatch),
}

impl OrderUpdate {
  pub fn is_status(&self) -> bool {
    matches!(self, OrderUpdate::Status { .. })
  }

  pub fn changes(&self) -> OrderChanges {
    match self {
      OrderUpdate::Status { status, .. } => OrderChanges::for_status(*status),
      OrderUpdate::Patch(patch) => OrderChanges::from(patch),
    }
  }
}

/// Which notification-worthy edges an update crosses. Computed, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransitionFlags {
  pub entering_shipped: bool,
  pub entering_delivered: bool,
}

impl TransitionFlags {
  /// Status rule: the value changes to X from something other than X.
  pub fn for_status(previous: OrderStatus, next: OrderStatus) -> Self {
    Self {
      entering_shipped: next == OrderStatus::Shipped && previous != OrderStatus::Shipped,
      entering_delivered: next == OrderStatus::Delivered && previous != OrderStatus::Delivered,
    }
  }

  /// Flag rule: the patch sets a flag that was not already set.
  pub fn for_patch(before: &Order, patch: &OrderPatch) -> Self {
    Self {
      entering_shipped: patch.is_shipped == Some(true) && !before.is_shipped,
      entering_delivered: patch.is_delivered == Some(true) && !before.is_delivered,
    }
  }

  pub fn detect(before: &Order, update: &OrderUpdate) -> Self {
    match update {
      OrderUpdate::Status { status, .. } => Self::for_status(before.status, *status),
      OrderUpdate::Patch(patch) => Self::for_patch(before, patch),
    }
  }

  pub fn any(&self) -> bool {
    self.entering_shipped || self.entering_delivered
  }
}
