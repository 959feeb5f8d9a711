// server/src/models/mod.rs

//! Row types for the routine admin tables and the request bodies that write them.
//! Coupon and order records live in the `backstore` crate.

pub mod admin;
pub mod blog_post;
pub mod category;
pub mod coupon;
pub mod partner;
pub mod product;
pub mod review;

pub use admin::{AdminSession, AdminUser};
pub use blog_post::{BlogPost, BlogPostInput, BlogPostUpdate};
pub use category::{Category, CategoryInput};
pub use coupon::CouponInput;
pub use partner::{Partner, PartnerInput, PartnerUpdate};
pub use product::{Product, ProductInput, ProductUpdate};
pub use review::Review;

use serde::Deserialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 200;

/// `?limit=&offset=` query parameters shared by the list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Page {
  pub limit: Option<i64>,
  pub offset: Option<i64>,
}

impl Page {
  pub fn limit(&self) -> i64 {
    self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
  }

  pub fn offset(&self) -> i64 {
    self.offset.unwrap_or(0).max(0)
  }
}

/// Lower-case, dash-separated slug from free text.
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_dash = false;
  for ch in text.trim().chars() {
    if ch.is_ascii_alphanumeric() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(ch.to_ascii_lowercase());
    } else {
      pending_dash = true;
    }
  }
  slug
}
