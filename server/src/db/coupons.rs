// server/src/db/coupons.rs

use async_trait::async_trait;
use backstore::coupon::CouponStore;
use backstore::{normalize_code, BackstoreError, BackstoreResult, Coupon, CouponChanges, CouponType, NewCoupon};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::store_error;

const COUPON_COLUMNS: &str = "id, code, name, description, type, value, min_order_amount, max_discount_amount, \
   usage_limit, used_count, valid_from, valid_until, is_active, created_at, updated_at";

#[derive(Debug, FromRow)]
struct CouponRow {
  id: Uuid,
  code: String,
  name: String,
  description: Option<String>,
  #[sqlx(rename = "type")]
  coupon_type: String,
  value: Decimal,
  min_order_amount: Option<Decimal>,
  max_discount_amount: Option<Decimal>,
  usage_limit: Option<i32>,
  used_count: i32,
  valid_from: DateTime<Utc>,
  valid_until: DateTime<Utc>,
  is_active: bool,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
  type Error = BackstoreError;

  fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
    let coupon_type: CouponType = row
      .coupon_type
      .parse()
      .map_err(|e: BackstoreError| BackstoreError::store(anyhow::anyhow!("corrupt coupon row {}: {}", row.id, e)))?;
    Ok(Coupon {
      id: row.id,
      code: row.code,
      name: row.name,
      description: row.description,
      coupon_type,
      value: row.value,
      min_order_amount: row.min_order_amount,
      max_discount_amount: row.max_discount_amount,
      usage_limit: row.usage_limit,
      used_count: row.used_count,
      valid_from: row.valid_from,
      valid_until: row.valid_until,
      is_active: row.is_active,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

fn into_coupon(row: Option<CouponRow>) -> BackstoreResult<Option<Coupon>> {
  row.map(Coupon::try_from).transpose()
}

#[derive(Clone)]
pub struct PgCouponStore {
  pool: PgPool,
}

impl PgCouponStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CouponStore for PgCouponStore {
  #[instrument(name = "db::coupons::find_by_code", skip(self), err(Display))]
  async fn find_by_code(&self, code: &str) -> BackstoreResult<Option<Coupon>> {
    let row: Option<CouponRow> = sqlx::query_as(&format!("SELECT {} FROM coupons WHERE code = $1", COUPON_COLUMNS))
      .bind(code)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    into_coupon(row)
  }

  #[instrument(name = "db::coupons::find_by_id", skip(self), err(Display))]
  async fn find_by_id(&self, id: Uuid) -> BackstoreResult<Option<Coupon>> {
    let row: Option<CouponRow> = sqlx::query_as(&format!("SELECT {} FROM coupons WHERE id = $1", COUPON_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(store_error)?;
    into_coupon(row)
  }

  #[instrument(name = "db::coupons::list", skip(self), err(Display))]
  async fn list(&self, active: Option<bool>) -> BackstoreResult<Vec<Coupon>> {
    let rows: Vec<CouponRow> = sqlx::query_as(&format!(
      "SELECT {} FROM coupons WHERE ($1::boolean IS NULL OR is_active = $1) ORDER BY created_at DESC",
      COUPON_COLUMNS
    ))
    .bind(active)
    .fetch_all(&self.pool)
    .await
    .map_err(store_error)?;
    rows.into_iter().map(Coupon::try_from).collect()
  }

  #[instrument(name = "db::coupons::insert", skip(self, coupon), fields(code = %coupon.code), err(Display))]
  async fn insert(&self, coupon: NewCoupon) -> BackstoreResult<Coupon> {
    let code = normalize_code(&coupon.code);
    let row: CouponRow = sqlx::query_as(&format!(
      "INSERT INTO coupons (id, code, name, description, type, value, min_order_amount, max_discount_amount, \
         usage_limit, used_count, valid_from, valid_until, is_active, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $10, $11, $12, now(), now()) \
       RETURNING {}",
      COUPON_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&code)
    .bind(&coupon.name)
    .bind(&coupon.description)
    .bind(coupon.coupon_type.as_str())
    .bind(coupon.value)
    .bind(coupon.min_order_amount)
    .bind(coupon.max_discount_amount)
    .bind(coupon.usage_limit)
    .bind(coupon.valid_from)
    .bind(coupon.valid_until)
    .bind(coupon.is_active)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| match store_error(e) {
      BackstoreError::Conflict(_) => BackstoreError::Conflict(format!("Coupon code '{}' already exists", code)),
      other => other,
    })?;
    Coupon::try_from(row)
  }

  #[instrument(name = "db::coupons::update", skip(self, changes), err(Display))]
  async fn update(&self, id: Uuid, changes: &CouponChanges) -> BackstoreResult<Option<Coupon>> {
    let row: Option<CouponRow> = sqlx::query_as(&format!(
      "UPDATE coupons SET \
         name = COALESCE($2, name), \
         description = COALESCE($3, description), \
         type = COALESCE($4, type), \
         value = COALESCE($5, value), \
         min_order_amount = COALESCE($6, min_order_amount), \
         max_discount_amount = COALESCE($7, max_discount_amount), \
         usage_limit = COALESCE($8, usage_limit), \
         valid_from = COALESCE($9, valid_from), \
         valid_until = COALESCE($10, valid_until), \
         is_active = COALESCE($11, is_active), \
         updated_at = now() \
       WHERE id = $1 \
       RETURNING {}",
      COUPON_COLUMNS
    ))
    .bind(id)
    .bind(&changes.name)
    .bind(&changes.description)
    .bind(changes.coupon_type.map(|t| t.as_str()))
    .bind(changes.value)
    .bind(changes.min_order_amount)
    .bind(changes.max_discount_amount)
    .bind(changes.usage_limit)
    .bind(changes.valid_from)
    .bind(changes.valid_until)
    .bind(changes.is_active)
    .fetch_optional(&self.pool)
    .await
    .map_err(store_error)?;
    into_coupon(row)
  }

  /// The eligibility check and the increment happen in one statement, so two
  /// concurrent redemptions cannot both take the last use.
  #[instrument(name = "db::coupons::increment_usage_if_redeemable", skip(self), err(Display))]
  async fn increment_usage_if_redeemable(&self, code: &str, now: DateTime<Utc>) -> BackstoreResult<Option<Coupon>> {
    let row: Option<CouponRow> = sqlx::query_as(&format!(
      "UPDATE coupons SET used_count = used_count + 1, updated_at = $2 \
       WHERE code = $1 \
         AND is_active \
         AND $2 BETWEEN valid_from AND valid_until \
         AND (usage_limit IS NULL OR usage_limit <= 0 OR used_count < usage_limit) \
       RETURNING {}",
      COUPON_COLUMNS
    ))
    .bind(code)
    .bind(now)
    .fetch_optional(&self.pool)
    .await
    .map_err(store_error)?;
    into_coupon(row)
  }
}
