// core/src/order/workflow.rs

//! The order update workflow.
//!
//! Both administrative entry points, the status endpoint and the detail-screen
//! patch, run the same pipeline:
//!
//! 1. `load_current_order`: capture the pre-update order (404 if missing).
//! 2. `detect_transitions`: compute [`TransitionFlags`] from before/update.
//! 3. `persist_order_update`: write the change set.
//! 4. `append_status_history`: status updates only.
//! 5. `dispatch_notifications`: optional; best effort, failures are logged and dropped.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::model::{NewStatusHistory, Order, OrderPatch, OrderStatus, OrderStatusHistory};
use super::notify::{NoticeKind, OrderNotice, OrderNotifier};
use super::store::OrderStore;
use super::transitions::{OrderUpdate, TransitionFlags};
use crate::error::{BackstoreError, BackstoreResult};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult, SkipCondition};

pub const STEP_LOAD: &str = "load_current_order";
pub const STEP_DETECT: &str = "detect_transitions";
pub const STEP_PERSIST: &str = "persist_order_update";
pub const STEP_HISTORY: &str = "append_status_history";
pub const STEP_NOTIFY: &str = "dispatch_notifications";

/// Outcome of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAttempt {
  pub kind: NoticeKind,
  pub delivered: bool,
  pub detail: String,
}

/// Pipeline state for a single update.
#[derive(Debug, Clone)]
pub struct OrderUpdateCtx {
  pub order_id: Uuid,
  pub update: OrderUpdate,
  pub actor: Option<Uuid>,
  pub now: DateTime<Utc>,
  pub before: Option<Order>,
  pub transitions: TransitionFlags,
  pub updated: Option<Order>,
  pub history: Option<OrderStatusHistory>,
  pub notifications: Vec<NotificationAttempt>,
}

impl OrderUpdateCtx {
  pub fn new(order_id: Uuid, update: OrderUpdate, actor: Option<Uuid>, now: DateTime<Utc>) -> Self {
    Self {
      order_id,
      update,
      actor,
      now,
      before: None,
      transitions: TransitionFlags::default(),
      updated: None,
      history: None,
      notifications: Vec::new(),
    }
  }
}

/// What an update produced.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
  pub order: Order,
  pub history: Option<OrderStatusHistory>,
  pub transitions: TransitionFlags,
  pub notifications: Vec<NotificationAttempt>,
}

/// Result of the status entry point: the updated order and the row it logged.
#[derive(Debug, Clone)]
pub struct StatusChange {
  pub order: Order,
  pub history: OrderStatusHistory,
  pub transitions: TransitionFlags,
}

pub struct OrderWorkflow {
  pipeline: Pipeline<OrderUpdateCtx, BackstoreError>,
}

impl OrderWorkflow {
  pub fn new(store: Arc<dyn OrderStore>, notifier: Arc<dyn OrderNotifier>) -> Self {
    Self {
      pipeline: build_pipeline(store, notifier),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.pipeline.step_names()
  }

  /// Sets `status` (parsed from its wire form) and logs a history row.
  ///
  /// An unknown status is rejected before the store is touched.
  #[instrument(name = "order_workflow::set_status", skip(self, notes), err(Display))]
  pub async fn set_status(
    &self,
    order_id: Uuid,
    status: &str,
    notes: Option<String>,
    actor: Option<Uuid>,
  ) -> BackstoreResult<StatusChange> {
    let status: OrderStatus = status.trim().parse()?;
    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    let outcome = self
      .apply_update(order_id, OrderUpdate::Status { status, notes }, actor)
      .await?;

    let history = outcome.history.ok_or_else(|| {
      BackstoreError::Pipeline {
        source: crate::error::PipelineError::Internal(format!(
          "status update for order {} finished without a history entry",
          order_id
        )),
      }
    })?;
    Ok(StatusChange {
      order: outcome.order,
      history,
      transitions: outcome.transitions,
    })
  }

  /// Applies an allow-listed field patch. No history row is written.
  #[instrument(name = "order_workflow::patch_order", skip(self, patch), err(Display))]
  pub async fn patch_order(&self, order_id: Uuid, patch: OrderPatch, actor: Option<Uuid>) -> BackstoreResult<Order> {
    patch.validate()?;
    let outcome = self.apply_update(order_id, OrderUpdate::Patch(patch), actor).await?;
    Ok(outcome.order)
  }

  /// Runs the update pipeline. Both entry points land here.
  pub async fn apply_update(
    &self,
    order_id: Uuid,
    update: OrderUpdate,
    actor: Option<Uuid>,
  ) -> BackstoreResult<UpdateOutcome> {
    let ctx_data = ContextData::new(OrderUpdateCtx::new(order_id, update, actor, Utc::now()));

    match self.pipeline.run(ctx_data.clone()).await? {
      PipelineResult::Completed => {}
      PipelineResult::Stopped => {
        return Err(BackstoreError::Pipeline {
          source: crate::error::PipelineError::Internal(format!("update of order {} was halted", order_id)),
        });
      }
    }

    let ctx = ctx_data.into_inner();
    let order = ctx.updated.ok_or_else(|| BackstoreError::not_found("Order", order_id))?;
    Ok(UpdateOutcome {
      order,
      history: ctx.history,
      transitions: ctx.transitions,
      notifications: ctx.notifications,
    })
  }
}

fn build_pipeline(
  store: Arc<dyn OrderStore>,
  notifier: Arc<dyn OrderNotifier>,
) -> Pipeline<OrderUpdateCtx, BackstoreError> {
  let skip_unless_status: SkipCondition<OrderUpdateCtx> =
    Arc::new(|ctx: ContextData<OrderUpdateCtx>| !ctx.read().update.is_status());

  let mut p = Pipeline::<OrderUpdateCtx, BackstoreError>::new(&[
    (STEP_LOAD, false, None),
    (STEP_DETECT, false, None),
    (STEP_PERSIST, false, None),
    (STEP_HISTORY, false, Some(skip_unless_status)),
    (STEP_NOTIFY, true, None),
  ]);

  let s = store.clone();
  p.on_root(STEP_LOAD, move |ctx| load_current_order(s.clone(), ctx));
  p.on_root(STEP_DETECT, |ctx| async move { detect_transitions(ctx) });
  let s = store.clone();
  p.on_root(STEP_PERSIST, move |ctx| persist_order_update(s.clone(), ctx));
  let s = store.clone();
  p.on_root(STEP_HISTORY, move |ctx| append_status_history(s.clone(), ctx));
  p.on_root(STEP_NOTIFY, move |ctx| {
    dispatch_notifications(store.clone(), notifier.clone(), ctx)
  });
  p
}

async fn load_current_order(
  store: Arc<dyn OrderStore>,
  ctx: ContextData<OrderUpdateCtx>,
) -> BackstoreResult<PipelineControl> {
  let order_id = ctx.read().order_id;
  let order = store
    .find_order(order_id)
    .await?
    .ok_or_else(|| BackstoreError::not_found("Order", order_id))?;
  ctx.write().before = Some(order);
  Ok(PipelineControl::Continue)
}

fn detect_transitions(ctx: ContextData<OrderUpdateCtx>) -> BackstoreResult<PipelineControl> {
  let mut guard = ctx.write();
  let before = guard
    .before
    .as_ref()
    .ok_or_else(|| BackstoreError::not_found("Order", guard.order_id))?;
  let flags = TransitionFlags::detect(before, &guard.update);
  if flags.any() {
    info!(order_id = %guard.order_id, ?flags, "Order update crosses a notification edge.");
  }
  guard.transitions = flags;
  Ok(PipelineControl::Continue)
}

async fn persist_order_update(
  store: Arc<dyn OrderStore>,
  ctx: ContextData<OrderUpdateCtx>,
) -> BackstoreResult<PipelineControl> {
  let (order_id, changes) = {
    let guard = ctx.read();
    (guard.order_id, guard.update.changes())
  };
  // The order can vanish between load and write.
  let updated = store
    .update_order(order_id, &changes)
    .await?
    .ok_or_else(|| BackstoreError::not_found("Order", order_id))?;
  ctx.write().updated = Some(updated);
  Ok(PipelineControl::Continue)
}

async fn append_status_history(
  store: Arc<dyn OrderStore>,
  ctx: ContextData<OrderUpdateCtx>,
) -> BackstoreResult<PipelineControl> {
  let entry = {
    let guard = ctx.read();
    let (status, notes) = match &guard.update {
      OrderUpdate::Status { status, notes } => (*status, notes.clone()),
      OrderUpdate::Patch(_) => return Ok(PipelineControl::Continue),
    };
    NewStatusHistory {
      order_id: guard.order_id,
      status,
      notes: notes.unwrap_or_else(|| format!("Order status updated to {}", status)),
      changed_by: guard.actor,
      changed_at: guard.now,
    }
  };
  let row = store.append_history(entry).await?;
  ctx.write().history = Some(row);
  Ok(PipelineControl::Continue)
}

/// Never fails the pipeline: every error here is logged and recorded on the context.
async fn dispatch_notifications(
  store: Arc<dyn OrderStore>,
  notifier: Arc<dyn OrderNotifier>,
  ctx: ContextData<OrderUpdateCtx>,
) -> BackstoreResult<PipelineControl> {
  let (flags, order) = {
    let guard = ctx.read();
    (guard.transitions, guard.updated.clone())
  };
  let order = match order {
    Some(order) if flags.any() => order,
    _ => return Ok(PipelineControl::Continue),
  };

  let notice = match resolve_notice(store.as_ref(), &order).await {
    Ok(Some(notice)) => notice,
    Ok(None) => {
      info!(order_id = %order.id, "Skipping order notification: no customer email on file.");
      return Ok(PipelineControl::Continue);
    }
    Err(e) => {
      warn!(order_id = %order.id, error = %e, "Skipping order notification: could not load recipient details.");
      return Ok(PipelineControl::Continue);
    }
  };

  let mut attempts = Vec::new();
  if flags.entering_shipped {
    attempts.push(send_one(notifier.as_ref(), NoticeKind::Shipment, &notice).await);
  }
  if flags.entering_delivered {
    attempts.push(send_one(notifier.as_ref(), NoticeKind::Delivery, &notice).await);
  }
  ctx.write().notifications.extend(attempts);
  Ok(PipelineControl::Continue)
}

async fn resolve_notice(store: &dyn OrderStore, order: &Order) -> BackstoreResult<Option<OrderNotice>> {
  let user_id = match order.user_id {
    Some(user_id) => user_id,
    None => return Ok(None),
  };
  let contact = match store.customer_contact(user_id).await? {
    Some(contact) => contact,
    None => return Ok(None),
  };
  let items = store.order_items(order.id).await?;
  Ok(OrderNotice::build(order, &contact, &items))
}

async fn send_one(notifier: &dyn OrderNotifier, kind: NoticeKind, notice: &OrderNotice) -> NotificationAttempt {
  let result = match kind {
    NoticeKind::Shipment => notifier.send_shipment(notice).await,
    NoticeKind::Delivery => notifier.send_delivery(notice).await,
  };
  match result {
    Ok(sent) => {
      info!(
        order_number = %notice.order_number,
        ?kind,
        message_id = %sent.message_id,
        "Order notification sent."
      );
      NotificationAttempt {
        kind,
        delivered: true,
        detail: sent.message_id,
      }
    }
    Err(e) => {
      warn!(order_number = %notice.order_number, ?kind, error = %e, "Order notification failed; continuing.");
      NotificationAttempt {
        kind,
        delivered: false,
        detail: e.to_string(),
      }
    }
  }
}
