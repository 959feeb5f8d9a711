// server/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub category_id: Option<Uuid>,
  pub name: String,
  pub slug: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub compare_at_price: Option<Decimal>,
  pub stock_quantity: i32,
  pub image_urls: Vec<String>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProductInput {
  pub category_id: Option<Uuid>,
  #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub compare_at_price: Option<Decimal>,
  #[validate(range(min = 0, message = "cannot be negative"))]
  #[serde(default)]
  pub stock_quantity: i32,
  #[serde(default)]
  pub image_urls: Vec<String>,
  #[serde(default = "default_true")]
  pub is_active: bool,
}

fn default_true() -> bool {
  true
}

impl ProductInput {
  pub fn check_prices(&self) -> Result<(), AppError> {
    check_prices(Some(self.price), self.compare_at_price)
  }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProductUpdate {
  pub category_id: Option<Uuid>,
  #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  pub compare_at_price: Option<Decimal>,
  #[validate(range(min = 0, message = "cannot be negative"))]
  pub stock_quantity: Option<i32>,
  pub image_urls: Option<Vec<String>>,
  pub is_active: Option<bool>,
}

impl ProductUpdate {
  pub fn check_prices(&self) -> Result<(), AppError> {
    check_prices(self.price, self.compare_at_price)
  }
}

fn check_prices(price: Option<Decimal>, compare_at: Option<Decimal>) -> Result<(), AppError> {
  if price.map_or(false, |p| p < Decimal::ZERO) {
    return Err(AppError::Validation("price cannot be negative".to_string()));
  }
  if compare_at.map_or(false, |p| p < Decimal::ZERO) {
    return Err(AppError::Validation("compare_at_price cannot be negative".to_string()));
  }
  Ok(())
}
