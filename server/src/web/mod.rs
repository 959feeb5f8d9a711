// server/src/web/mod.rs

pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, HttpRequest};

use crate::errors::AppError;

pub use routes::configure_app_routes;

/// Body, query and path extraction failures become `400 BAD_REQUEST` in the
/// standard error envelope.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
    AppError::Validation(format!("Invalid request body: {}", err)).into()
  })
}

pub fn query_config() -> web::QueryConfig {
  web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
    AppError::Validation(format!("Invalid query string: {}", err)).into()
  })
}

pub fn path_config() -> web::PathConfig {
  web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
    AppError::Validation(format!("Invalid path parameter: {}", err)).into()
  })
}

/// Registers shared extractor config and all routes; used by `main` and the endpoint tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(json_config())
    .app_data(query_config())
    .app_data(path_config())
    .configure(configure_app_routes);
}
