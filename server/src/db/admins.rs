// server/src/db/admins.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{AdminSession, AdminUser};

/// Admin accounts and their opaque session tokens.
#[async_trait]
pub trait AdminStore: Send + Sync {
  /// Inactive accounts are treated as absent.
  async fn find_active_admin_by_email(&self, email: &str) -> Result<Option<AdminUser>>;

  async fn create_session(&self, token: &str, admin_id: Uuid, expires_at: DateTime<Utc>) -> Result<AdminSession>;

  /// The session together with its admin, if the admin is still active.
  async fn find_session(&self, token: &str) -> Result<Option<(AdminSession, AdminUser)>>;

  /// Returns whether a session was removed.
  async fn delete_session(&self, token: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgAdminStore {
  pool: PgPool,
}

impl PgAdminStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[derive(sqlx::FromRow)]
struct SessionWithAdmin {
  token: String,
  admin_id: Uuid,
  expires_at: DateTime<Utc>,
  session_created_at: DateTime<Utc>,
  email: String,
  name: String,
  password_hash: String,
  is_active: bool,
  admin_created_at: DateTime<Utc>,
}

#[async_trait]
impl AdminStore for PgAdminStore {
  #[instrument(name = "db::admins::find_active_admin_by_email", skip(self), err(Display))]
  async fn find_active_admin_by_email(&self, email: &str) -> Result<Option<AdminUser>> {
    let admin = sqlx::query_as::<_, AdminUser>(
      "SELECT id, email, name, password_hash, is_active, created_at FROM admin_users \
       WHERE lower(email) = lower($1) AND is_active",
    )
    .bind(email)
    .fetch_optional(&self.pool)
    .await?;
    Ok(admin)
  }

  #[instrument(name = "db::admins::create_session", skip(self, token), err(Display))]
  async fn create_session(&self, token: &str, admin_id: Uuid, expires_at: DateTime<Utc>) -> Result<AdminSession> {
    let session = sqlx::query_as::<_, AdminSession>(
      "INSERT INTO admin_sessions (token, admin_id, expires_at) VALUES ($1, $2, $3) \
       RETURNING token, admin_id, expires_at, created_at",
    )
    .bind(token)
    .bind(admin_id)
    .bind(expires_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(session)
  }

  #[instrument(name = "db::admins::find_session", skip_all, err(Display))]
  async fn find_session(&self, token: &str) -> Result<Option<(AdminSession, AdminUser)>> {
    let row = sqlx::query_as::<_, SessionWithAdmin>(
      "SELECT s.token, s.admin_id, s.expires_at, s.created_at AS session_created_at, \
              a.email, a.name, a.password_hash, a.is_active, a.created_at AS admin_created_at \
       FROM admin_sessions s JOIN admin_users a ON a.id = s.admin_id \
       WHERE s.token = $1 AND a.is_active",
    )
    .bind(token)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(|r| {
      (
        AdminSession {
          token: r.token,
          admin_id: r.admin_id,
          expires_at: r.expires_at,
          created_at: r.session_created_at,
        },
        AdminUser {
          id: r.admin_id,
          email: r.email,
          name: r.name,
          password_hash: r.password_hash,
          is_active: r.is_active,
          created_at: r.admin_created_at,
        },
      )
    }))
  }

  #[instrument(name = "db::admins::delete_session", skip_all, err(Display))]
  async fn delete_session(&self, token: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM admin_sessions WHERE token = $1")
      .bind(token)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}
