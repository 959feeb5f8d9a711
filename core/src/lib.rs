// src/lib.rs

//! Backstore: the commerce rules behind a storefront's admin back office.
//!
//! - Coupons: case-insensitive lookup, eligibility checks, discount pricing
//!   and race-free redemption ([`CouponEngine`]).
//! - Orders: a single update workflow for status changes and field patches
//!   that keeps the status log and fires shipment/delivery notifications
//!   exactly once per edge ([`OrderWorkflow`]).
//!
//! Persistence and email are collaborators behind [`CouponStore`],
//! [`OrderStore`] and [`OrderNotifier`]. In-memory stores live in [`memory`].

pub mod coupon;
pub mod error;
pub mod memory;
pub mod order;
pub mod pipeline;

pub use crate::coupon::{
  normalize_code, Coupon, CouponChanges, CouponEngine, CouponQuote, CouponRejection, CouponStore, CouponSummary,
  CouponType, DiscountPolicy, NewCoupon,
};
pub use crate::error::{BackstoreError, BackstoreResult, ErrorCode, PipelineError};
pub use crate::memory::{MemoryCouponStore, MemoryOrderStore};
pub use crate::order::{
  Address, CustomerContact, NoticeKind, NotifyError, Order, OrderChanges, OrderFilter, OrderItem, OrderNotice,
  OrderNotifier, OrderPatch, OrderStatus, OrderStatusHistory, OrderStore, OrderUpdate, OrderWorkflow,
  PaymentStatus, SentNotification, StatusChange, TransitionFlags, UpdateOutcome,
};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult};

pub use rust_decimal::Decimal;
