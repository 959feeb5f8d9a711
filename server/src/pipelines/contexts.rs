// server/src/pipelines/contexts.rs

//! Pipeline state structs. Handlers receive these wrapped in `backstore::ContextData`.

use std::sync::Arc;

use crate::db::AdminStore;
use crate::models::{AdminSession, AdminUser};

#[derive(Clone)]
pub struct SigninCtx {
  pub admins: Arc<dyn AdminStore>,
  pub session_ttl_hours: i64,
  pub email: String,
  pub password: String,
  /// Set by the lookup step; the hash is only read by the verify step.
  pub admin: Option<AdminUser>,
  pub session: Option<AdminSession>,
}

impl SigninCtx {
  pub fn new(admins: Arc<dyn AdminStore>, session_ttl_hours: i64, email: String, password: String) -> Self {
    Self {
      admins,
      session_ttl_hours,
      email,
      password,
      admin: None,
      session: None,
    }
  }
}
