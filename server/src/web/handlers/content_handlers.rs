// server/src/web/handlers/content_handlers.rs

//! Reviews, blog posts and partners of the month.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::content;
use crate::errors::AppError;
use crate::models::{BlogPostInput, BlogPostUpdate, Page, PartnerInput, PartnerUpdate};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedAdmin;
use crate::web::response;

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
  pub approved: Option<bool>,
  pub limit: Option<i64>,
  pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BlogListQuery {
  pub published: Option<bool>,
  pub limit: Option<i64>,
  pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
  pub approved: bool,
}

// --- Reviews ---

#[instrument(name = "handler::list_reviews", skip(app_state, _auth))]
pub async fn list_reviews(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  query: web::Query<ReviewListQuery>,
) -> Result<HttpResponse, AppError> {
  let page = Page {
    limit: query.limit,
    offset: query.offset,
  };
  Ok(response::ok(content::list_reviews(&app_state.db_pool, query.approved, page).await?))
}

/// `PUT /reviews/{id}/approval` with `{"approved": bool}` approves or unapproves.
#[instrument(name = "handler::set_review_approval", skip(app_state, auth), fields(admin_id = %auth.admin.id))]
pub async fn set_review_approval(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
  payload: web::Json<ApprovalRequest>,
) -> Result<HttpResponse, AppError> {
  let review = content::set_review_approval(&app_state.db_pool, path.into_inner(), payload.approved).await?;
  info!(review_id = %review.id, approved = review.is_approved, "Review moderation updated.");
  Ok(response::ok(review))
}

#[instrument(name = "handler::delete_review", skip(app_state, _auth))]
pub async fn delete_review(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  content::delete_review(&app_state.db_pool, path.into_inner()).await?;
  Ok(response::deleted())
}

// --- Blog posts ---

#[instrument(name = "handler::list_blog_posts", skip(app_state, _auth))]
pub async fn list_blog_posts(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  query: web::Query<BlogListQuery>,
) -> Result<HttpResponse, AppError> {
  let page = Page {
    limit: query.limit,
    offset: query.offset,
  };
  Ok(response::ok(content::list_blog_posts(&app_state.db_pool, query.published, page).await?))
}

#[instrument(name = "handler::get_blog_post", skip(app_state, _auth))]
pub async fn get_blog_post(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  Ok(response::ok(content::get_blog_post(&app_state.db_pool, path.into_inner()).await?))
}

#[instrument(name = "handler::create_blog_post", skip_all)]
pub async fn create_blog_post(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  payload: web::Json<BlogPostInput>,
) -> Result<HttpResponse, AppError> {
  payload.validate()?;
  Ok(response::created(content::create_blog_post(&app_state.db_pool, &payload).await?))
}

#[instrument(name = "handler::update_blog_post", skip(app_state, _auth, payload))]
pub async fn update_blog_post(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
  payload: web::Json<BlogPostUpdate>,
) -> Result<HttpResponse, AppError> {
  payload.validate()?;
  Ok(response::ok(
    content::update_blog_post(&app_state.db_pool, path.into_inner(), &payload).await?,
  ))
}

#[instrument(name = "handler::delete_blog_post", skip(app_state, _auth))]
pub async fn delete_blog_post(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  content::delete_blog_post(&app_state.db_pool, path.into_inner()).await?;
  Ok(response::deleted())
}

// --- Partners of the month ---

#[instrument(name = "handler::list_partners", skip(app_state, _auth))]
pub async fn list_partners(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  query: web::Query<Page>,
) -> Result<HttpResponse, AppError> {
  Ok(response::ok(content::list_partners(&app_state.db_pool, query.into_inner()).await?))
}

#[instrument(name = "handler::get_partner", skip(app_state, _auth))]
pub async fn get_partner(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  Ok(response::ok(content::get_partner(&app_state.db_pool, path.into_inner()).await?))
}

#[instrument(name = "handler::create_partner", skip_all)]
pub async fn create_partner(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  payload: web::Json<PartnerInput>,
) -> Result<HttpResponse, AppError> {
  payload.validate()?;
  Ok(response::created(content::create_partner(&app_state.db_pool, &payload).await?))
}

#[instrument(name = "handler::update_partner", skip(app_state, _auth, payload))]
pub async fn update_partner(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
  payload: web::Json<PartnerUpdate>,
) -> Result<HttpResponse, AppError> {
  payload.validate()?;
  Ok(response::ok(
    content::update_partner(&app_state.db_pool, path.into_inner(), &payload).await?,
  ))
}

#[instrument(name = "handler::delete_partner", skip(app_state, _auth))]
pub async fn delete_partner(
  app_state: web::Data<AppState>,
  _auth: AuthenticatedAdmin,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  content::delete_partner(&app_state.db_pool, path.into_inner()).await?;
  Ok(response::deleted())
}
