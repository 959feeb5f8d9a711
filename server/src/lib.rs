// server/src/lib.rs

//! Backstore admin back office: actix-web routes over PostgreSQL, with the
//! coupon and order rules delegated to the `backstore` crate.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
