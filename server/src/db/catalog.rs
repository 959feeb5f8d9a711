// server/src/db/catalog.rs

//! Products and categories.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{slugify, Category, CategoryInput, Page, Product, ProductInput, ProductUpdate};

const PRODUCT_COLUMNS: &str = "id, category_id, name, slug, description, price, compare_at_price, stock_quantity, \
   image_urls, is_active, created_at, updated_at";

const CATEGORY_COLUMNS: &str = "id, name, slug, description, created_at, updated_at";

fn slug_for(name: &str) -> Result<String> {
  let slug = slugify(name);
  if slug.is_empty() {
    return Err(AppError::Validation("name must contain at least one letter or digit".to_string()));
  }
  Ok(slug)
}

fn product_not_found(id: Uuid) -> AppError {
  AppError::NotFound(format!("Product with ID {} not found", id))
}

fn category_not_found(id: Uuid) -> AppError {
  AppError::NotFound(format!("Category with ID {} not found", id))
}

#[instrument(name = "db::catalog::list_products", skip(pool), err(Display))]
pub async fn list_products(pool: &PgPool, category_id: Option<Uuid>, page: Page) -> Result<Vec<Product>> {
  let products = sqlx::query_as::<_, Product>(&format!(
    "SELECT {} FROM products WHERE ($1::uuid IS NULL OR category_id = $1) \
     ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    PRODUCT_COLUMNS
  ))
  .bind(category_id)
  .bind(page.limit())
  .bind(page.offset())
  .fetch_all(pool)
  .await?;
  Ok(products)
}

#[instrument(name = "db::catalog::get_product", skip(pool), err(Display))]
pub async fn get_product(pool: &PgPool, id: Uuid) -> Result<Product> {
  sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| product_not_found(id))
}

#[instrument(name = "db::catalog::create_product", skip(pool, input), fields(name = %input.name), err(Display))]
pub async fn create_product(pool: &PgPool, input: &ProductInput) -> Result<Product> {
  let slug = slug_for(&input.name)?;
  let product = sqlx::query_as::<_, Product>(&format!(
    "INSERT INTO products (id, category_id, name, slug, description, price, compare_at_price, \
       stock_quantity, image_urls, is_active) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
    PRODUCT_COLUMNS
  ))
  .bind(Uuid::new_v4())
  .bind(input.category_id)
  .bind(input.name.trim())
  .bind(&slug)
  .bind(&input.description)
  .bind(input.price)
  .bind(input.compare_at_price)
  .bind(input.stock_quantity)
  .bind(&input.image_urls)
  .bind(input.is_active)
  .fetch_one(pool)
  .await?;
  Ok(product)
}

#[instrument(name = "db::catalog::update_product", skip(pool, update), err(Display))]
pub async fn update_product(pool: &PgPool, id: Uuid, update: &ProductUpdate) -> Result<Product> {
  let slug = update.name.as_deref().map(slug_for).transpose()?;
  sqlx::query_as::<_, Product>(&format!(
    "UPDATE products SET \
       category_id = COALESCE($2, category_id), \
       name = COALESCE($3, name), \
       slug = COALESCE($4, slug), \
       description = COALESCE($5, description), \
       price = COALESCE($6, price), \
       compare_at_price = COALESCE($7, compare_at_price), \
       stock_quantity = COALESCE($8, stock_quantity), \
       image_urls = COALESCE($9, image_urls), \
       is_active = COALESCE($10, is_active), \
       updated_at = now() \
     WHERE id = $1 RETURNING {}",
    PRODUCT_COLUMNS
  ))
  .bind(id)
  .bind(update.category_id)
  .bind(update.name.as_deref().map(str::trim))
  .bind(slug)
  .bind(&update.description)
  .bind(update.price)
  .bind(update.compare_at_price)
  .bind(update.stock_quantity)
  .bind(&update.image_urls)
  .bind(update.is_active)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| product_not_found(id))
}

#[instrument(name = "db::catalog::delete_product", skip(pool), err(Display))]
pub async fn delete_product(pool: &PgPool, id: Uuid) -> Result<()> {
  let result = sqlx::query("DELETE FROM products WHERE id = $1")
    .bind(id)
    .execute(pool)
    .await?;
  if result.rows_affected() == 0 {
    return Err(product_not_found(id));
  }
  Ok(())
}

#[instrument(name = "db::catalog::list_categories", skip(pool), err(Display))]
pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>> {
  let categories = sqlx::query_as::<_, Category>(&format!(
    "SELECT {} FROM categories ORDER BY name ASC",
    CATEGORY_COLUMNS
  ))
  .fetch_all(pool)
  .await?;
  Ok(categories)
}

#[instrument(name = "db::catalog::get_category", skip(pool), err(Display))]
pub async fn get_category(pool: &PgPool, id: Uuid) -> Result<Category> {
  sqlx::query_as::<_, Category>(&format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| category_not_found(id))
}

#[instrument(name = "db::catalog::create_category", skip(pool, input), fields(name = %input.name), err(Display))]
pub async fn create_category(pool: &PgPool, input: &CategoryInput) -> Result<Category> {
  let slug = slug_for(&input.name)?;
  let category = sqlx::query_as::<_, Category>(&format!(
    "INSERT INTO categories (id, name, slug, description) VALUES ($1, $2, $3, $4) RETURNING {}",
    CATEGORY_COLUMNS
  ))
  .bind(Uuid::new_v4())
  .bind(input.name.trim())
  .bind(&slug)
  .bind(&input.description)
  .fetch_one(pool)
  .await?;
  Ok(category)
}

/// Renaming a category re-derives its slug.
#[instrument(name = "db::catalog::update_category", skip(pool, input), err(Display))]
pub async fn update_category(pool: &PgPool, id: Uuid, input: &CategoryInput) -> Result<Category> {
  let slug = slug_for(&input.name)?;
  sqlx::query_as::<_, Category>(&format!(
    "UPDATE categories SET name = $2, slug = $3, description = $4, updated_at = now() \
     WHERE id = $1 RETURNING {}",
    CATEGORY_COLUMNS
  ))
  .bind(id)
  .bind(input.name.trim())
  .bind(&slug)
  .bind(&input.description)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| category_not_found(id))
}

/// Fails with a foreign-key conflict while products still reference the category.
#[instrument(name = "db::catalog::delete_category", skip(pool), err(Display))]
pub async fn delete_category(pool: &PgPool, id: Uuid) -> Result<()> {
  let result = sqlx::query("DELETE FROM categories WHERE id = $1")
    .bind(id)
    .execute(pool)
    .await?;
  if result.rows_affected() == 0 {
    return Err(category_not_found(id));
  }
  Ok(())
}
