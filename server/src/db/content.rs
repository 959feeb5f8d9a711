// server/src/db/content.rs

//! Reviews, blog posts and partners of the month.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::partner::month_start;
use crate::models::{
  slugify, BlogPost, BlogPostInput, BlogPostUpdate, Page, Partner, PartnerInput, PartnerUpdate, Review,
};

const REVIEW_COLUMNS: &str = "id, product_id, customer_name, rating, title, body, is_approved, created_at";

const BLOG_COLUMNS: &str =
  "id, title, slug, excerpt, content, cover_image_url, is_published, published_at, created_at, updated_at";

const PARTNER_COLUMNS: &str = "id, name, handle, platform, image_url, month, bio, created_at, updated_at";

fn not_found(entity: &str, id: Uuid) -> AppError {
  AppError::NotFound(format!("{} with ID {} not found", entity, id))
}

/// An explicit slug wins; otherwise the title is slugified.
fn post_slug(slug: Option<&str>, title: &str) -> Result<String> {
  let slug = slugify(slug.unwrap_or(title));
  if slug.is_empty() {
    return Err(AppError::Validation("slug must contain at least one letter or digit".to_string()));
  }
  Ok(slug)
}

// --- Reviews ---

#[instrument(name = "db::content::list_reviews", skip(pool), err(Display))]
pub async fn list_reviews(pool: &PgPool, approved: Option<bool>, page: Page) -> Result<Vec<Review>> {
  let reviews = sqlx::query_as::<_, Review>(&format!(
    "SELECT {} FROM reviews WHERE ($1::boolean IS NULL OR is_approved = $1) \
     ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    REVIEW_COLUMNS
  ))
  .bind(approved)
  .bind(page.limit())
  .bind(page.offset())
  .fetch_all(pool)
  .await?;
  Ok(reviews)
}

#[instrument(name = "db::content::set_review_approval", skip(pool), err(Display))]
pub async fn set_review_approval(pool: &PgPool, id: Uuid, approved: bool) -> Result<Review> {
  sqlx::query_as::<_, Review>(&format!(
    "UPDATE reviews SET is_approved = $2 WHERE id = $1 RETURNING {}",
    REVIEW_COLUMNS
  ))
  .bind(id)
  .bind(approved)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| not_found("Review", id))
}

#[instrument(name = "db::content::delete_review", skip(pool), err(Display))]
pub async fn delete_review(pool: &PgPool, id: Uuid) -> Result<()> {
  let result = sqlx::query("DELETE FROM reviews WHERE id = $1").bind(id).execute(pool).await?;
  if result.rows_affected() == 0 {
    return Err(not_found("Review", id));
  }
  Ok(())
}

// --- Blog posts ---

#[instrument(name = "db::content::list_blog_posts", skip(pool), err(Display))]
pub async fn list_blog_posts(pool: &PgPool, published: Option<bool>, page: Page) -> Result<Vec<BlogPost>> {
  let posts = sqlx::query_as::<_, BlogPost>(&format!(
    "SELECT {} FROM blog_posts WHERE ($1::boolean IS NULL OR is_published = $1) \
     ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    BLOG_COLUMNS
  ))
  .bind(published)
  .bind(page.limit())
  .bind(page.offset())
  .fetch_all(pool)
  .await?;
  Ok(posts)
}

#[instrument(name = "db::content::get_blog_post", skip(pool), err(Display))]
pub async fn get_blog_post(pool: &PgPool, id: Uuid) -> Result<BlogPost> {
  sqlx::query_as::<_, BlogPost>(&format!("SELECT {} FROM blog_posts WHERE id = $1", BLOG_COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found("Blog post", id))
}

#[instrument(name = "db::content::create_blog_post", skip(pool, input), fields(title = %input.title), err(Display))]
pub async fn create_blog_post(pool: &PgPool, input: &BlogPostInput) -> Result<BlogPost> {
  let slug = post_slug(input.slug.as_deref(), &input.title)?;
  let post = sqlx::query_as::<_, BlogPost>(&format!(
    "INSERT INTO blog_posts (id, title, slug, excerpt, content, cover_image_url, is_published, published_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $7 THEN now() ELSE NULL END) RETURNING {}",
    BLOG_COLUMNS
  ))
  .bind(Uuid::new_v4())
  .bind(input.title.trim())
  .bind(&slug)
  .bind(&input.excerpt)
  .bind(&input.content)
  .bind(&input.cover_image_url)
  .bind(input.is_published)
  .fetch_one(pool)
  .await?;
  Ok(post)
}

/// `published_at` is stamped the first time the post is published and kept
/// through later unpublish/republish cycles.
#[instrument(name = "db::content::update_blog_post", skip(pool, update), err(Display))]
pub async fn update_blog_post(pool: &PgPool, id: Uuid, update: &BlogPostUpdate) -> Result<BlogPost> {
  // Retitling keeps the existing slug so published links stay valid.
  let slug = update.slug.as_deref().map(|s| post_slug(Some(s), s)).transpose()?;
  sqlx::query_as::<_, BlogPost>(&format!(
    "UPDATE blog_posts SET \
       title = COALESCE($2, title), \
       slug = COALESCE($3, slug), \
       excerpt = COALESCE($4, excerpt), \
       content = COALESCE($5, content), \
       cover_image_url = COALESCE($6, cover_image_url), \
       is_published = COALESCE($7, is_published), \
       published_at = CASE \
         WHEN COALESCE($7, is_published) AND published_at IS NULL THEN now() \
         ELSE published_at \
       END, \
       updated_at = now() \
     WHERE id = $1 RETURNING {}",
    BLOG_COLUMNS
  ))
  .bind(id)
  .bind(update.title.as_deref().map(str::trim))
  .bind(slug)
  .bind(&update.excerpt)
  .bind(&update.content)
  .bind(&update.cover_image_url)
  .bind(update.is_published)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| not_found("Blog post", id))
}

#[instrument(name = "db::content::delete_blog_post", skip(pool), err(Display))]
pub async fn delete_blog_post(pool: &PgPool, id: Uuid) -> Result<()> {
  let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1").bind(id).execute(pool).await?;
  if result.rows_affected() == 0 {
    return Err(not_found("Blog post", id));
  }
  Ok(())
}

// --- Partners of the month ---

#[instrument(name = "db::content::list_partners", skip(pool), err(Display))]
pub async fn list_partners(pool: &PgPool, page: Page) -> Result<Vec<Partner>> {
  let partners = sqlx::query_as::<_, Partner>(&format!(
    "SELECT {} FROM partners ORDER BY month DESC, name ASC LIMIT $1 OFFSET $2",
    PARTNER_COLUMNS
  ))
  .bind(page.limit())
  .bind(page.offset())
  .fetch_all(pool)
  .await?;
  Ok(partners)
}

#[instrument(name = "db::content::get_partner", skip(pool), err(Display))]
pub async fn get_partner(pool: &PgPool, id: Uuid) -> Result<Partner> {
  sqlx::query_as::<_, Partner>(&format!("SELECT {} FROM partners WHERE id = $1", PARTNER_COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found("Partner", id))
}

#[instrument(name = "db::content::create_partner", skip(pool, input), fields(name = %input.name), err(Display))]
pub async fn create_partner(pool: &PgPool, input: &PartnerInput) -> Result<Partner> {
  let partner = sqlx::query_as::<_, Partner>(&format!(
    "INSERT INTO partners (id, name, handle, platform, image_url, month, bio) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
    PARTNER_COLUMNS
  ))
  .bind(Uuid::new_v4())
  .bind(input.name.trim())
  .bind(input.handle.trim())
  .bind(input.platform.trim())
  .bind(&input.image_url)
  .bind(month_start(input.month))
  .bind(&input.bio)
  .fetch_one(pool)
  .await?;
  Ok(partner)
}

#[instrument(name = "db::content::update_partner", skip(pool, update), err(Display))]
pub async fn update_partner(pool: &PgPool, id: Uuid, update: &PartnerUpdate) -> Result<Partner> {
  sqlx::query_as::<_, Partner>(&format!(
    "UPDATE partners SET \
       name = COALESCE($2, name), \
       handle = COALESCE($3, handle), \
       platform = COALESCE($4, platform), \
       image_url = COALESCE($5, image_url), \
       month = COALESCE($6, month), \
       bio = COALESCE($7, bio), \
       updated_at = now() \
     WHERE id = $1 RETURNING {}",
    PARTNER_COLUMNS
  ))
  .bind(id)
  .bind(update.name.as_deref().map(str::trim))
  .bind(update.handle.as_deref().map(str::trim))
  .bind(update.platform.as_deref().map(str::trim))
  .bind(&update.image_url)
  .bind(update.month.map(month_start))
  .bind(&update.bio)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| not_found("Partner", id))
}

#[instrument(name = "db::content::delete_partner", skip(pool), err(Display))]
pub async fn delete_partner(pool: &PgPool, id: Uuid) -> Result<()> {
  let result = sqlx::query("DELETE FROM partners WHERE id = $1").bind(id).execute(pool).await?;
  if result.rows_affected() == 0 {
    return Err(not_found("Partner", id));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn explicit_slug_wins_over_title() {
    assert_eq!(post_slug(Some("Spring Launch"), "Anything").unwrap(), "spring-launch");
    assert_eq!(post_slug(None, "How We Pack: A Tour").unwrap(), "how-we-pack-a-tour");
  }

  #[test]
  fn unusable_slug_is_a_validation_error() {
    assert!(matches!(post_slug(Some("???"), "Good title"), Err(AppError::Validation(_))));
    assert!(matches!(post_slug(None, "  "), Err(AppError::Validation(_))));
  }
}
