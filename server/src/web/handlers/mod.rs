// server/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod category_handlers;
pub mod content_handlers;
pub mod coupon_handlers;
pub mod dashboard_handlers;
pub mod order_handlers;
pub mod product_handlers;
