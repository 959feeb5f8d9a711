// server/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
  pub id: Uuid,
  pub product_id: Uuid,
  pub customer_name: String,
  pub rating: i16,
  pub title: Option<String>,
  pub body: String,
  pub is_approved: bool,
  pub created_at: DateTime<Utc>,
}
