// server/src/state.rs

use backstore::{CouponEngine, CouponStore, DiscountPolicy, OrderNotifier, OrderStore, OrderWorkflow, Pipeline};
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{AdminStore, PgAdminStore, PgCouponStore, PgOrderStore};
use crate::errors::AppError;
use crate::pipelines::{build_signin_pipeline, SigninCtx};

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  /// Routine admin tables (catalog, content, dashboard) query the pool directly.
  pub db_pool: PgPool,
  pub coupons: Arc<dyn CouponStore>,
  pub coupon_engine: Arc<CouponEngine>,
  pub orders: Arc<dyn OrderStore>,
  pub order_workflow: Arc<OrderWorkflow>,
  pub admins: Arc<dyn AdminStore>,
  pub signin_pipeline: Arc<Pipeline<SigninCtx, AppError>>,
}

impl AppState {
  /// Wires the given collaborators together.
  pub fn new(
    config: Arc<AppConfig>,
    db_pool: PgPool,
    coupons: Arc<dyn CouponStore>,
    orders: Arc<dyn OrderStore>,
    admins: Arc<dyn AdminStore>,
    notifier: Arc<dyn OrderNotifier>,
  ) -> Self {
    let policy = DiscountPolicy {
      free_shipping_discount: config.free_shipping_discount,
    };
    Self {
      coupon_engine: Arc::new(CouponEngine::with_policy(coupons.clone(), policy)),
      order_workflow: Arc::new(OrderWorkflow::new(orders.clone(), notifier)),
      signin_pipeline: Arc::new(build_signin_pipeline()),
      config,
      db_pool,
      coupons,
      orders,
      admins,
    }
  }

  /// Postgres-backed stores over one pool.
  pub fn postgres(config: Arc<AppConfig>, db_pool: PgPool, notifier: Arc<dyn OrderNotifier>) -> Self {
    Self::new(
      config,
      db_pool.clone(),
      Arc::new(PgCouponStore::new(db_pool.clone())),
      Arc::new(PgOrderStore::new(db_pool.clone())),
      Arc::new(PgAdminStore::new(db_pool.clone())),
      notifier,
    )
  }
}
