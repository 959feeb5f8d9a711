// server/src/web/routes.rs

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::web::handlers::{
  auth_handlers, category_handlers, content_handlers, coupon_handlers, dashboard_handlers, order_handlers,
  product_handlers,
};

async fn health_check() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "success": true, "data": { "status": "ok" } }))
}

/// Every route lives under `/api/v1`. Handlers taking `AuthenticatedAdmin`
/// are admin-only; `/health`, `/auth/signin` and `/coupons/validate` are public.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check))
      .service(
        web::scope("/auth")
          .route("/signin", web::post().to(auth_handlers::signin))
          .route("/signout", web::post().to(auth_handlers::signout))
          .route("/me", web::get().to(auth_handlers::me)),
      )
      .service(
        web::scope("/coupons")
          .route("/validate", web::post().to(coupon_handlers::validate_coupon))
          .route("/redeem", web::post().to(coupon_handlers::redeem_coupon))
          .route("", web::get().to(coupon_handlers::list_coupons))
          .route("", web::post().to(coupon_handlers::create_coupon))
          .route("/{id}", web::get().to(coupon_handlers::get_coupon))
          .route("/{id}", web::put().to(coupon_handlers::update_coupon))
          .route("/{id}", web::delete().to(coupon_handlers::delete_coupon)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders))
          .route("/{id}", web::get().to(order_handlers::get_order))
          .route("/{id}", web::patch().to(order_handlers::patch_order))
          .route("/{id}/status", web::put().to(order_handlers::update_order_status))
          .route("/{id}/history", web::get().to(order_handlers::order_history)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products))
          .route("", web::post().to(product_handlers::create_product))
          .route("/{id}", web::get().to(product_handlers::get_product))
          .route("/{id}", web::put().to(product_handlers::update_product))
          .route("/{id}", web::delete().to(product_handlers::delete_product)),
      )
      .service(
        web::scope("/categories")
          .route("", web::get().to(category_handlers::list_categories))
          .route("", web::post().to(category_handlers::create_category))
          .route("/{id}", web::get().to(category_handlers::get_category))
          .route("/{id}", web::put().to(category_handlers::update_category))
          .route("/{id}", web::delete().to(category_handlers::delete_category)),
      )
      .service(
        web::scope("/reviews")
          .route("", web::get().to(content_handlers::list_reviews))
          .route("/{id}/approval", web::put().to(content_handlers::set_review_approval))
          .route("/{id}", web::delete().to(content_handlers::delete_review)),
      )
      .service(
        web::scope("/blog-posts")
          .route("", web::get().to(content_handlers::list_blog_posts))
          .route("", web::post().to(content_handlers::create_blog_post))
          .route("/{id}", web::get().to(content_handlers::get_blog_post))
          .route("/{id}", web::put().to(content_handlers::update_blog_post))
          .route("/{id}", web::delete().to(content_handlers::delete_blog_post)),
      )
      .service(
        web::scope("/partners")
          .route("", web::get().to(content_handlers::list_partners))
          .route("", web::post().to(content_handlers::create_partner))
          .route("/{id}", web::get().to(content_handlers::get_partner))
          .route("/{id}", web::put().to(content_handlers::update_partner))
          .route("/{id}", web::delete().to(content_handlers::delete_partner)),
      )
      .route("/dashboard/stats", web::get().to(dashboard_handlers::stats)),
  );
}
