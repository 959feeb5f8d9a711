// server/src/models/partner.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A "partner of the month" influencer feature.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Partner {
  pub id: Uuid,
  pub name: String,
  pub handle: String,
  pub platform: String,
  pub image_url: Option<String>,
  /// First day of the featured month.
  pub month: NaiveDate,
  pub bio: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PartnerInput {
  #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
  pub name: String,
  #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
  pub handle: String,
  #[validate(length(min = 1, max = 60, message = "must be 1-60 characters"))]
  pub platform: String,
  #[validate(url(message = "must be a URL"))]
  pub image_url: Option<String>,
  pub month: NaiveDate,
  pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PartnerUpdate {
  #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
  pub name: Option<String>,
  #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
  pub handle: Option<String>,
  #[validate(length(min = 1, max = 60, message = "must be 1-60 characters"))]
  pub platform: Option<String>,
  #[validate(url(message = "must be a URL"))]
  pub image_url: Option<String>,
  pub month: Option<NaiveDate>,
  pub bio: Option<String>,
}

/// Normalizes any date to the first of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
  use chrono::Datelike;
  date.with_day(1).unwrap_or(date)
}
