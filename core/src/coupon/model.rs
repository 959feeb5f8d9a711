// core/src/coupon/model.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::BackstoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponType {
  /// `value` is a percentage of the order amount.
  Percentage,
  /// `value` is a flat amount off.
  FixedAmount,
  /// `value` is ignored; the discount is the configured shipping allowance.
  FreeShipping,
}

impl CouponType {
  pub fn as_str(&self) -> &'static str {
    match self {
      CouponType::Percentage => "percentage",
      CouponType::FixedAmount => "fixed_amount",
      CouponType::FreeShipping => "free_shipping",
    }
  }
}

impl fmt::Display for CouponType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CouponType {
  type Err = BackstoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "percentage" => Ok(CouponType::Percentage),
      "fixed_amount" => Ok(CouponType::FixedAmount),
      "free_shipping" => Ok(CouponType::FreeShipping),
      other => Err(BackstoreError::Validation(format!(
        "Invalid coupon type '{}'. Allowed: percentage, fixed_amount, free_shipping",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
  pub id: Uuid,
  /// Always stored upper-case; see [`normalize_code`].
  pub code: String,
  pub name: String,
  pub description: Option<String>,
  #[serde(rename = "type")]
  pub coupon_type: CouponType,
  pub value: Decimal,
  pub min_order_amount: Option<Decimal>,
  pub max_discount_amount: Option<Decimal>,
  pub usage_limit: Option<i32>,
  pub used_count: i32,
  pub valid_from: DateTime<Utc>,
  pub valid_until: DateTime<Utc>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Coupon {
  /// Zero when no floor is configured.
  pub fn min_order_floor(&self) -> Decimal {
    self.min_order_amount.unwrap_or(Decimal::ZERO)
  }

  /// `None` means uncapped. A stored zero is treated as uncapped too.
  pub fn discount_cap(&self) -> Option<Decimal> {
    self.max_discount_amount.filter(|cap| *cap > Decimal::ZERO)
  }

  pub fn usage_exhausted(&self) -> bool {
    match self.usage_limit {
      Some(limit) if limit > 0 => self.used_count >= limit,
      _ => false,
    }
  }

  pub fn summary(&self) -> CouponSummary {
    CouponSummary {
      id: self.id,
      code: self.code.clone(),
      name: self.name.clone(),
      coupon_type: self.coupon_type,
      value: self.value,
    }
  }
}

/// Trims and upper-cases a code so lookups are case-insensitive.
pub fn normalize_code(code: &str) -> String {
  code.trim().to_uppercase()
}

/// The projection of a coupon returned with a successful quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponSummary {
  pub id: Uuid,
  pub code: String,
  pub name: String,
  #[serde(rename = "type")]
  pub coupon_type: CouponType,
  pub value: Decimal,
}

/// Result of checking a code against an order amount.
///
/// An unusable coupon is still a successful quote, with `valid == false`
/// and a human-readable `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponQuote {
  pub valid: bool,
  pub discount_amount: Decimal,
  pub final_amount: Decimal,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub coupon: Option<CouponSummary>,
}

impl CouponQuote {
  pub fn rejected(order_amount: Decimal, message: impl Into<String>) -> Self {
    Self {
      valid: false,
      discount_amount: Decimal::ZERO,
      final_amount: order_amount,
      message: Some(message.into()),
      coupon: None,
    }
  }
}

/// Fields for creating a coupon. `code` is normalized by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCoupon {
  pub code: String,
  pub name: String,
  pub description: Option<String>,
  #[serde(rename = "type")]
  pub coupon_type: CouponType,
  pub value: Decimal,
  pub min_order_amount: Option<Decimal>,
  pub max_discount_amount: Option<Decimal>,
  pub usage_limit: Option<i32>,
  pub valid_from: DateTime<Utc>,
  pub valid_until: DateTime<Utc>,
  pub is_active: bool,
}

/// Editable coupon fields. `code` and `used_count` are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CouponChanges {
  pub name: Option<String>,
  pub description: Option<String>,
  #[serde(rename = "type")]
  pub coupon_type: Option<CouponType>,
  pub value: Option<Decimal>,
  pub min_order_amount: Option<Decimal>,
  pub max_discount_amount: Option<Decimal>,
  pub usage_limit: Option<i32>,
  pub valid_from: Option<DateTime<Utc>>,
  pub valid_until: Option<DateTime<Utc>>,
  pub is_active: Option<bool>,
}

impl CouponChanges {
  pub fn is_empty(&self) -> bool {
    self == &CouponChanges::default()
  }

  /// Applies the present fields onto `coupon`, bumping `updated_at`.
  pub fn apply_to(&self, coupon: &mut Coupon, now: DateTime<Utc>) {
    if let Some(name) = &self.name {
      coupon.name = name.clone();
    }
    if let Some(description) = &self.description {
      coupon.description = Some(description.clone());
    }
    if let Some(coupon_type) = self.coupon_type {
      coupon.coupon_type = coupon_type;
    }
    if let Some(value) = self.value {
      coupon.value = value;
    }
    if let Some(min) = self.min_order_amount {
      coupon.min_order_amount = Some(min);
    }
    if let Some(cap) = self.max_discount_amount {
      coupon.max_discount_amount = Some(cap);
    }
    if let Some(limit) = self.usage_limit {
      coupon.usage_limit = Some(limit);
    }
    if let Some(from) = self.valid_from {
      coupon.valid_from = from;
    }
    if let Some(until) = self.valid_until {
      coupon.valid_until = until;
    }
    if let Some(active) = self.is_active {
      coupon.is_active = active;
    }
    coupon.updated_at = now;
  }
}
