// server/src/web/handlers/dashboard_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::db::dashboard;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedAdmin;
use crate::web::response;

#[instrument(name = "handler::dashboard_stats", skip_all)]
pub async fn stats(app_state: web::Data<AppState>, _auth: AuthenticatedAdmin) -> Result<HttpResponse, AppError> {
  Ok(response::ok(dashboard::stats(&app_state.db_pool).await?))
}
