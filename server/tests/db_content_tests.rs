// tests/db_content_tests.rs
//
// Runs against a real PostgreSQL when TEST_DATABASE_URL is set; otherwise each
// test logs and returns. Tests share one database, hence `#[serial]`.
mod common;

use backstore::ErrorCode;
use backstore_server::db::{self, catalog, content, dashboard};
use backstore_server::models::{slugify, BlogPostInput, BlogPostUpdate, CategoryInput, Page, Product, ProductInput};
use backstore_server::AppError;
use common::*;
use serial_test::serial;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
  setup_tracing();
  let url = match std::env::var("TEST_DATABASE_URL") {
    Ok(url) if !url.trim().is_empty() => url,
    _ => {
      tracing::warn!("TEST_DATABASE_URL not set; skipping database test.");
      return None;
    }
  };
  let pool = PgPoolOptions::new().max_connections(4).connect(&url).await.unwrap();
  db::run_migrations(&pool).await.unwrap();
  Some(pool)
}

fn suffix() -> String {
  Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn product(pool: &PgPool, category_id: Option<Uuid>) -> Product {
  catalog::create_product(
    pool,
    &ProductInput {
      category_id,
      name: format!("Brass lamp {}", suffix()),
      description: None,
      price: dec("150.00"),
      compare_at_price: None,
      stock_quantity: 3,
      image_urls: vec![],
      is_active: true,
    },
  )
  .await
  .unwrap()
}

#[tokio::test]
#[serial]
async fn test_published_at_is_stamped_once() {
  let Some(pool) = test_pool().await else { return };
  let title = format!("Packing Notes {}", suffix());

  let draft = content::create_blog_post(
    &pool,
    &BlogPostInput {
      title: title.clone(),
      slug: None,
      excerpt: None,
      content: "How we wrap lamps.".to_string(),
      cover_image_url: None,
      is_published: false,
    },
  )
  .await
  .unwrap();
  assert_eq!(draft.slug, slugify(&title));
  assert!(draft.published_at.is_none());

  let publish = |flag: bool| BlogPostUpdate {
    is_published: Some(flag),
    ..Default::default()
  };

  let published = content::update_blog_post(&pool, draft.id, &publish(true)).await.unwrap();
  let first = published.published_at.unwrap();

  let retitled = content::update_blog_post(
    &pool,
    draft.id,
    &BlogPostUpdate {
      title: Some("A different title".to_string()),
      is_published: Some(false),
      ..Default::default()
    },
  )
  .await
  .unwrap();
  assert_eq!(retitled.slug, draft.slug);
  assert_eq!(retitled.published_at, Some(first));

  let republished = content::update_blog_post(&pool, draft.id, &publish(true)).await.unwrap();
  assert_eq!(republished.published_at, Some(first));

  content::delete_blog_post(&pool, draft.id).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_referenced_category_cannot_be_deleted() {
  let Some(pool) = test_pool().await else { return };

  let category = catalog::create_category(
    &pool,
    &CategoryInput {
      name: format!("Lighting {}", suffix()),
      description: None,
    },
  )
  .await
  .unwrap();
  let lamp = product(&pool, Some(category.id)).await;

  let err = catalog::delete_category(&pool, category.id).await.unwrap_err();
  assert_eq!(err.code(), ErrorCode::Conflict);
  assert!(err.public_message().contains("still referenced"));

  catalog::delete_product(&pool, lamp.id).await.unwrap();
  catalog::delete_category(&pool, category.id).await.unwrap();
  assert!(matches!(
    catalog::get_category(&pool, category.id).await,
    Err(AppError::NotFound(_))
  ));
}

#[tokio::test]
#[serial]
async fn test_review_approval_moves_the_dashboard_counts() {
  let Some(pool) = test_pool().await else { return };
  let before = dashboard::stats(&pool).await.unwrap();

  let lamp = product(&pool, None).await;
  let review_id = Uuid::new_v4();
  sqlx::query("INSERT INTO reviews (id, product_id, customer_name, rating, body) VALUES ($1, $2, $3, $4, $5)")
    .bind(review_id)
    .bind(lamp.id)
    .bind("Alan")
    .bind(5i16)
    .bind("Warm light, solid base.")
    .execute(&pool)
    .await
    .unwrap();

  let pending = dashboard::stats(&pool).await.unwrap();
  assert_eq!(pending.pending_reviews, before.pending_reviews + 1);
  assert_eq!(pending.total_products, before.total_products + 1);

  let approved = content::set_review_approval(&pool, review_id, true).await.unwrap();
  assert!(approved.is_approved);
  let listed = content::list_reviews(&pool, Some(true), Page::default()).await.unwrap();
  assert!(listed.iter().any(|r| r.id == review_id));
  assert_eq!(dashboard::stats(&pool).await.unwrap().pending_reviews, before.pending_reviews);

  let withdrawn = content::set_review_approval(&pool, review_id, false).await.unwrap();
  assert!(!withdrawn.is_approved);
  assert_eq!(
    dashboard::stats(&pool).await.unwrap().pending_reviews,
    before.pending_reviews + 1
  );

  // Reviews cascade with their product.
  catalog::delete_product(&pool, lamp.id).await.unwrap();
  assert!(matches!(
    content::delete_review(&pool, review_id).await,
    Err(AppError::NotFound(_))
  ));
}
