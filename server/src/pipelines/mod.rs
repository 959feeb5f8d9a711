// server/src/pipelines/mod.rs

//! Server-side pipelines. The order workflow lives in `backstore`; admin
//! sign-in is expressed the same way here.

pub mod contexts;
pub mod signin_pipeline;

pub use contexts::SigninCtx;
pub use signin_pipeline::build_signin_pipeline;
