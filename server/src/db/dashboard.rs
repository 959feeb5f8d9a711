// server/src/db/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
  pub total_orders: i64,
  pub pending_orders: i64,
  /// Sum of `total_amount` over orders with `payment_status = 'paid'`.
  pub revenue: Decimal,
  pub total_products: i64,
  pub active_coupons: i64,
  pub pending_reviews: i64,
}

async fn count(pool: &PgPool, sql: &str) -> Result<i64> {
  let (n,): (i64,) = sqlx::query_as(sql).fetch_one(pool).await?;
  Ok(n)
}

/// Runs the independent aggregate queries concurrently.
#[instrument(name = "db::dashboard::stats", skip(pool), err(Display))]
pub async fn stats(pool: &PgPool) -> Result<DashboardStats> {
  let revenue = async {
    let (sum,): (Decimal,) =
      sqlx::query_as("SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE payment_status = 'paid'")
        .fetch_one(pool)
        .await?;
    Ok::<_, crate::errors::AppError>(sum)
  };

  let (total_orders, pending_orders, revenue, total_products, active_coupons, pending_reviews) = tokio::try_join!(
    count(pool, "SELECT COUNT(*) FROM orders"),
    count(pool, "SELECT COUNT(*) FROM orders WHERE status = 'pending'"),
    revenue,
    count(pool, "SELECT COUNT(*) FROM products"),
    count(
      pool,
      "SELECT COUNT(*) FROM coupons WHERE is_active AND now() BETWEEN valid_from AND valid_until"
    ),
    count(pool, "SELECT COUNT(*) FROM reviews WHERE NOT is_approved"),
  )?;

  Ok(DashboardStats {
    total_orders,
    pending_orders,
    revenue,
    total_products,
    active_coupons,
    pending_reviews,
  })
}
