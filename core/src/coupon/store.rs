// core/src/coupon/store.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::model::{Coupon, CouponChanges, NewCoupon};
use crate::error::BackstoreResult;

/// Persistence contract for coupons.
///
/// Lookups return `Ok(None)` for a missing record; `Err` is reserved for
/// failures of the store itself.
#[async_trait]
pub trait CouponStore: Send + Sync {
  /// `code` is already normalized by the caller.
  async fn find_by_code(&self, code: &str) -> BackstoreResult<Option<Coupon>>;

  async fn find_by_id(&self, id: Uuid) -> BackstoreResult<Option<Coupon>>;

  /// Newest first. `active` filters on `is_active` when set.
  async fn list(&self, active: Option<bool>) -> BackstoreResult<Vec<Coupon>>;

  /// Fails with `Conflict` when the normalized code already exists.
  async fn insert(&self, coupon: NewCoupon) -> BackstoreResult<Coupon>;

  async fn update(&self, id: Uuid, changes: &CouponChanges) -> BackstoreResult<Option<Coupon>>;

  /// Bumps `used_count` only if the coupon is redeemable at `now`, atomically.
  ///
  /// Returns `Ok(None)` when no row qualified; the caller decides whether that
  /// means "unknown code" or "not redeemable".
  async fn increment_usage_if_redeemable(&self, code: &str, now: DateTime<Utc>) -> BackstoreResult<Option<Coupon>>;
}
