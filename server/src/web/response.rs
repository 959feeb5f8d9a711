// server/src/web/response.rs

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;

/// Success body: `{"success": true, "data": ...}`. Errors are rendered by `AppError`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
  pub success: bool,
  pub data: T,
}

fn respond<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
  HttpResponse::build(status).json(Envelope { success: true, data })
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
  respond(StatusCode::OK, data)
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
  respond(StatusCode::CREATED, data)
}

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub deleted: bool,
}

pub fn deleted() -> HttpResponse {
  ok(Deleted { deleted: true })
}
