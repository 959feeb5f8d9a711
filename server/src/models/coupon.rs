// server/src/models/coupon.rs

//! Request bodies for coupon administration. The coupon record and its rules
//! live in `backstore::coupon`.

use backstore::{normalize_code, Coupon, CouponChanges, CouponType, Decimal, NewCoupon};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::errors::AppError;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CouponInput {
  #[validate(length(min = 3, max = 32, message = "must be 3-32 characters"))]
  pub code: String,
  #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
  pub name: String,
  pub description: Option<String>,
  #[serde(rename = "type")]
  pub coupon_type: CouponType,
  pub value: Decimal,
  pub min_order_amount: Option<Decimal>,
  pub max_discount_amount: Option<Decimal>,
  #[validate(range(min = 0, message = "cannot be negative"))]
  pub usage_limit: Option<i32>,
  pub valid_from: DateTime<Utc>,
  pub valid_until: DateTime<Utc>,
  #[serde(default = "default_active")]
  pub is_active: bool,
}

fn default_active() -> bool {
  true
}

impl CouponInput {
  /// Field-level checks, then the rules that span fields.
  pub fn into_new_coupon(self) -> Result<NewCoupon, AppError> {
    self.validate()?;
    let code = normalize_code(&self.code);
    if code.len() < 3 || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
      return Err(AppError::Validation(
        "code must be 3-32 letters, digits, '-' or '_'".to_string(),
      ));
    }
    check_amounts(self.min_order_amount, self.max_discount_amount)?;
    check_rules(self.coupon_type, self.value, self.valid_from, self.valid_until)?;
    Ok(NewCoupon {
      code,
      name: self.name.trim().to_string(),
      description: self.description,
      coupon_type: self.coupon_type,
      value: self.value,
      min_order_amount: self.min_order_amount,
      max_discount_amount: self.max_discount_amount,
      usage_limit: self.usage_limit,
      valid_from: self.valid_from,
      valid_until: self.valid_until,
      is_active: self.is_active,
    })
  }
}

/// Checks `changes` against the coupon they will be applied to.
pub fn check_changes(current: &Coupon, changes: &CouponChanges) -> Result<(), AppError> {
  if changes.is_empty() {
    return Err(AppError::Validation("No updatable fields provided".to_string()));
  }
  if changes.name.as_deref().map_or(false, |n| n.trim().is_empty()) {
    return Err(AppError::Validation("name cannot be empty".to_string()));
  }
  if changes.usage_limit.map_or(false, |l| l < 0) {
    return Err(AppError::Validation("usage_limit cannot be negative".to_string()));
  }
  check_amounts(changes.min_order_amount, changes.max_discount_amount)?;
  check_rules(
    changes.coupon_type.unwrap_or(current.coupon_type),
    changes.value.unwrap_or(current.value),
    changes.valid_from.unwrap_or(current.valid_from),
    changes.valid_until.unwrap_or(current.valid_until),
  )
}

fn check_amounts(min_order: Option<Decimal>, max_discount: Option<Decimal>) -> Result<(), AppError> {
  if min_order.map_or(false, |v| v < Decimal::ZERO) {
    return Err(AppError::Validation("min_order_amount cannot be negative".to_string()));
  }
  if max_discount.map_or(false, |v| v < Decimal::ZERO) {
    return Err(AppError::Validation("max_discount_amount cannot be negative".to_string()));
  }
  Ok(())
}

/// Free-shipping coupons ignore `value`, so zero is allowed for them.
fn check_rules(
  coupon_type: CouponType,
  value: Decimal,
  valid_from: DateTime<Utc>,
  valid_until: DateTime<Utc>,
) -> Result<(), AppError> {
  match coupon_type {
    CouponType::FreeShipping if value < Decimal::ZERO => {
      return Err(AppError::Validation("value cannot be negative".to_string()));
    }
    CouponType::Percentage | CouponType::FixedAmount if value <= Decimal::ZERO => {
      return Err(AppError::Validation("value must be greater than 0".to_string()));
    }
    CouponType::Percentage if value > Decimal::ONE_HUNDRED => {
      return Err(AppError::Validation("percentage value cannot exceed 100".to_string()));
    }
    _ => {}
  }
  if valid_from > valid_until {
    return Err(AppError::Validation("valid_from must not be after valid_until".to_string()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;
  use std::str::FromStr;

  fn input(coupon_type: CouponType, value: &str) -> CouponInput {
    let now = Utc::now();
    CouponInput {
      code: " welcome20 ".to_string(),
      name: "Welcome".to_string(),
      description: None,
      coupon_type,
      value: Decimal::from_str(value).unwrap(),
      min_order_amount: None,
      max_discount_amount: None,
      usage_limit: Some(100),
      valid_from: now,
      valid_until: now + Duration::days(30),
      is_active: true,
    }
  }

  #[test]
  fn code_is_normalized() {
    let new = input(CouponType::Percentage, "20").into_new_coupon().unwrap();
    assert_eq!(new.code, "WELCOME20");
  }

  #[test]
  fn percentage_over_100_is_rejected() {
    let err = input(CouponType::Percentage, "150").into_new_coupon().unwrap_err();
    assert!(err.to_string().contains("exceed 100"));
  }

  #[test]
  fn zero_value_only_allowed_for_free_shipping() {
    assert!(input(CouponType::FixedAmount, "0").into_new_coupon().is_err());
    assert!(input(CouponType::FreeShipping, "0").into_new_coupon().is_ok());
  }

  #[test]
  fn window_must_be_ordered() {
    let mut bad = input(CouponType::FixedAmount, "10");
    bad.valid_until = bad.valid_from - Duration::days(1);
    assert!(matches!(bad.into_new_coupon(), Err(AppError::Validation(_))));
  }

  #[test]
  fn short_code_fails_field_validation() {
    let mut bad = input(CouponType::FixedAmount, "10");
    bad.code = "AB".to_string();
    let err = bad.into_new_coupon().unwrap_err();
    assert!(err.to_string().contains("code"));
  }
}
