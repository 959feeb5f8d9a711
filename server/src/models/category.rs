// server/src/models/category.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
  pub id: Uuid,
  pub name: String,
  pub slug: String,
  pub description: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Used for both create and update; the slug is always derived from `name`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CategoryInput {
  #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
  pub name: String,
  #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
  pub description: Option<String>,
}
