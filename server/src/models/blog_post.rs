// server/src/models/blog_post.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BlogPost {
  pub id: Uuid,
  pub title: String,
  pub slug: String,
  pub excerpt: Option<String>,
  pub content: String,
  pub cover_image_url: Option<String>,
  pub is_published: bool,
  /// Set the first time the post is published and kept afterwards.
  pub published_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BlogPostInput {
  #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
  pub title: String,
  /// Derived from the title when absent.
  pub slug: Option<String>,
  pub excerpt: Option<String>,
  #[validate(length(min = 1, message = "is required"))]
  pub content: String,
  #[validate(url(message = "must be a URL"))]
  pub cover_image_url: Option<String>,
  #[serde(default)]
  pub is_published: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BlogPostUpdate {
  #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
  pub title: Option<String>,
  pub slug: Option<String>,
  pub excerpt: Option<String>,
  #[validate(length(min = 1, message = "cannot be empty"))]
  pub content: Option<String>,
  #[validate(url(message = "must be a URL"))]
  pub cover_image_url: Option<String>,
  pub is_published: Option<bool>,
}
