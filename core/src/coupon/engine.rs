// core/src/coupon/engine.rs

//! Coupon redeemability checks and discount computation.
//!
//! The free functions are pure. [`CouponEngine`] adds the store lookup used by
//! the validation endpoint and the atomic redemption used at order placement.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::model::{normalize_code, Coupon, CouponQuote, CouponType};
use super::store::CouponStore;
use crate::error::{BackstoreError, BackstoreResult};

/// Shipping allowance granted by `free_shipping` coupons unless configured otherwise.
pub const DEFAULT_FREE_SHIPPING_DISCOUNT: Decimal = Decimal::ONE_HUNDRED;

pub const INVALID_CODE_MESSAGE: &str = "Invalid coupon code";

/// Why a coupon cannot be redeemed right now. Variants are listed in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
  Inactive,
  NotYetValid,
  Expired,
  UsageLimitReached,
}

impl CouponRejection {
  pub fn message(&self) -> &'static str {
    match self {
      CouponRejection::Inactive => "This coupon is no longer active",
      CouponRejection::NotYetValid => "This coupon is not yet valid",
      CouponRejection::Expired => "This coupon has expired",
      CouponRejection::UsageLimitReached => "This coupon has reached its usage limit",
    }
  }
}

impl fmt::Display for CouponRejection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.message())
  }
}

/// The first failing redeemability clause, or `None` if the coupon is usable at `now`.
pub fn rejection(coupon: &Coupon, now: DateTime<Utc>) -> Option<CouponRejection> {
  if !coupon.is_active {
    Some(CouponRejection::Inactive)
  } else if now < coupon.valid_from {
    Some(CouponRejection::NotYetValid)
  } else if now > coupon.valid_until {
    Some(CouponRejection::Expired)
  } else if coupon.usage_exhausted() {
    Some(CouponRejection::UsageLimitReached)
  } else {
    None
  }
}

pub fn is_redeemable(coupon: &Coupon, now: DateTime<Utc>) -> bool {
  rejection(coupon, now).is_none()
}

/// Discount rules that are configuration rather than coupon data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountPolicy {
  pub free_shipping_discount: Decimal,
}

impl Default for DiscountPolicy {
  fn default() -> Self {
    Self {
      free_shipping_discount: DEFAULT_FREE_SHIPPING_DISCOUNT,
    }
  }
}

impl DiscountPolicy {
  /// The discount before the final clamp. A fixed amount may exceed `order_amount`.
  pub fn compute_discount(&self, coupon: &Coupon, order_amount: Decimal) -> Decimal {
    match coupon.coupon_type {
      CouponType::Percentage => {
        let raw = order_amount * coupon.value / Decimal::ONE_HUNDRED;
        match coupon.discount_cap() {
          Some(cap) => raw.min(cap),
          None => raw,
        }
      }
      CouponType::FixedAmount => coupon.value,
      CouponType::FreeShipping => self.free_shipping_discount,
    }
  }
}

/// [`DiscountPolicy::compute_discount`] with the default policy.
pub fn compute_discount(coupon: &Coupon, order_amount: Decimal) -> Decimal {
  DiscountPolicy::default().compute_discount(coupon, order_amount)
}

/// `max(0, order_amount - discount)`.
pub fn final_amount(order_amount: Decimal, discount: Decimal) -> Decimal {
  (order_amount - discount).max(Decimal::ZERO)
}

fn minimum_order_message(min: Decimal) -> String {
  format!("Minimum order amount of {} required", min.normalize())
}

pub struct CouponEngine {
  store: Arc<dyn CouponStore>,
  policy: DiscountPolicy,
}

impl CouponEngine {
  pub fn new(store: Arc<dyn CouponStore>) -> Self {
    Self::with_policy(store, DiscountPolicy::default())
  }

  pub fn with_policy(store: Arc<dyn CouponStore>, policy: DiscountPolicy) -> Self {
    Self { store, policy }
  }

  pub fn policy(&self) -> &DiscountPolicy {
    &self.policy
  }

  /// Checks `code` against `order_amount` and prices the discount.
  ///
  /// Only malformed input and store failures are errors; every business
  /// rejection is a quote with `valid == false`. Never touches `used_count`.
  #[instrument(name = "coupon_engine::validate_and_quote", skip(self), err(Display))]
  pub async fn validate_and_quote(
    &self,
    code: &str,
    order_amount: Decimal,
    now: DateTime<Utc>,
  ) -> BackstoreResult<CouponQuote> {
    let code = normalize_code(code);
    if code.is_empty() {
      return Err(BackstoreError::Validation("Coupon code is required".to_string()));
    }
    if order_amount <= Decimal::ZERO {
      return Err(BackstoreError::Validation(
        "Order amount must be greater than zero".to_string(),
      ));
    }

    let coupon = match self.store.find_by_code(&code).await? {
      Some(coupon) => coupon,
      None => {
        debug!(%code, "No coupon with this code.");
        return Ok(CouponQuote::rejected(order_amount, INVALID_CODE_MESSAGE));
      }
    };

    if let Some(reason) = rejection(&coupon, now) {
      debug!(%code, ?reason, "Coupon is not redeemable.");
      return Ok(CouponQuote::rejected(order_amount, reason.message()));
    }

    let min = coupon.min_order_floor();
    if order_amount < min {
      debug!(%code, %order_amount, %min, "Order amount below the coupon minimum.");
      return Ok(CouponQuote::rejected(order_amount, minimum_order_message(min)));
    }

    let discount_amount = self.policy.compute_discount(&coupon, order_amount);
    Ok(CouponQuote {
      valid: true,
      discount_amount,
      final_amount: final_amount(order_amount, discount_amount),
      message: None,
      coupon: Some(coupon.summary()),
    })
  }

  /// Records one use of `code`, guarded by an atomic conditional increment.
  ///
  /// Unknown code is `NotFound`; a known but unusable coupon is `Conflict`
  /// carrying the rejection message.
  #[instrument(name = "coupon_engine::redeem", skip(self), err(Display))]
  pub async fn redeem(&self, code: &str, now: DateTime<Utc>) -> BackstoreResult<Coupon> {
    let code = normalize_code(code);
    if code.is_empty() {
      return Err(BackstoreError::Validation("Coupon code is required".to_string()));
    }

    if let Some(updated) = self.store.increment_usage_if_redeemable(&code, now).await? {
      info!(%code, used_count = updated.used_count, "Coupon redemption recorded.");
      return Ok(updated);
    }

    match self.store.find_by_code(&code).await? {
      None => Err(BackstoreError::not_found("Coupon", code)),
      Some(coupon) => {
        let reason = rejection(&coupon, now).unwrap_or(CouponRejection::UsageLimitReached);
        Err(BackstoreError::Conflict(reason.message().to_string()))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;
  use uuid::Uuid;

  fn coupon(coupon_type: CouponType, value: i64) -> Coupon {
    let now = Utc::now();
    Coupon {
      id: Uuid::new_v4(),
      code: "TEST".to_string(),
      name: "Test".to_string(),
      description: None,
      coupon_type,
      value: Decimal::from(value),
      min_order_amount: None,
      max_discount_amount: None,
      usage_limit: None,
      used_count: 0,
      valid_from: now - Duration::days(1),
      valid_until: now + Duration::days(1),
      is_active: true,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn percentage_is_capped_only_when_cap_is_positive() {
    let mut c = coupon(CouponType::Percentage, 20);
    c.max_discount_amount = Some(Decimal::from(150));
    assert_eq!(compute_discount(&c, Decimal::from(1000)), Decimal::from(150));
    assert_eq!(compute_discount(&c, Decimal::from(500)), Decimal::from(100));

    c.max_discount_amount = Some(Decimal::ZERO);
    assert_eq!(compute_discount(&c, Decimal::from(1000)), Decimal::from(200));
    c.max_discount_amount = None;
    assert_eq!(compute_discount(&c, Decimal::from(5000)), Decimal::from(1000));
  }

  #[test]
  fn percentage_keeps_fractional_cents() {
    let c = coupon(CouponType::Percentage, 10);
    assert_eq!(compute_discount(&c, Decimal::new(125, 2)), Decimal::new(125, 3));
    let c = coupon(CouponType::Percentage, 15);
    let discount = compute_discount(&c, Decimal::new(70, 2));
    assert_eq!(discount, Decimal::new(105, 3));
    assert_eq!(final_amount(Decimal::new(70, 2), discount), Decimal::new(595, 3));
  }

  #[test]
  fn fixed_amount_is_returned_verbatim_even_above_order_amount() {
    let c = coupon(CouponType::FixedAmount, 300);
    let discount = compute_discount(&c, Decimal::from(120));
    assert_eq!(discount, Decimal::from(300));
    assert_eq!(final_amount(Decimal::from(120), discount), Decimal::ZERO);
  }

  #[test]
  fn free_shipping_ignores_order_amount() {
    let c = coupon(CouponType::FreeShipping, 0);
    assert_eq!(compute_discount(&c, Decimal::from(10)), DEFAULT_FREE_SHIPPING_DISCOUNT);
    assert_eq!(compute_discount(&c, Decimal::from(10_000)), DEFAULT_FREE_SHIPPING_DISCOUNT);

    let policy = DiscountPolicy {
      free_shipping_discount: Decimal::from(49),
    };
    assert_eq!(policy.compute_discount(&c, Decimal::from(10)), Decimal::from(49));
  }

  #[test]
  fn exhausted_usage_limit_blocks_regardless_of_window() {
    let mut c = coupon(CouponType::Percentage, 10);
    c.usage_limit = Some(5);
    c.used_count = 5;
    let now = Utc::now();
    assert_eq!(rejection(&c, now), Some(CouponRejection::UsageLimitReached));
    assert!(!is_redeemable(&c, now));

    c.usage_limit = Some(0);
    assert!(is_redeemable(&c, now));
  }

  #[test]
  fn inactive_takes_precedence_over_window_checks() {
    let mut c = coupon(CouponType::Percentage, 10);
    let now = Utc::now();
    c.is_active = false;
    c.valid_until = now - Duration::days(2);
    c.usage_limit = Some(1);
    c.used_count = 1;
    assert_eq!(rejection(&c, now), Some(CouponRejection::Inactive));

    c.is_active = true;
    assert_eq!(rejection(&c, now), Some(CouponRejection::Expired));

    c.valid_from = now + Duration::hours(1);
    c.valid_until = now + Duration::days(1);
    assert_eq!(rejection(&c, now), Some(CouponRejection::NotYetValid));
  }

  #[test]
  fn window_bounds_are_inclusive() {
    let c = coupon(CouponType::Percentage, 10);
    assert!(is_redeemable(&c, c.valid_from));
    assert!(is_redeemable(&c, c.valid_until));
  }

  #[test]
  fn minimum_message_prints_normalized_amount() {
    assert_eq!(
      minimum_order_message(Decimal::new(100000, 2)),
      "Minimum order amount of 1000 required"
    );
  }
}
