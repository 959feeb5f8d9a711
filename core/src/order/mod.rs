//! Orders: the record, the status workflow, and the notification contract.

pub mod model;
pub mod notify;
pub mod store;
pub mod transitions;
pub mod workflow;

pub use model::{
  Address, CustomerContact, NewStatusHistory, Order, OrderChanges, OrderFilter, OrderItem, OrderPatch,
  OrderStatus, OrderStatusHistory, PaymentStatus,
};
pub use notify::{
  NoticeKind, NoticeLine, NotifyError, OrderNotice, OrderNotifier, SentNotification, FALLBACK_CUSTOMER_NAME,
};
pub use store::OrderStore;
pub use transitions::{OrderUpdate, TransitionFlags};
pub use workflow::{NotificationAttempt, OrderUpdateCtx, OrderWorkflow, StatusChange, UpdateOutcome};
