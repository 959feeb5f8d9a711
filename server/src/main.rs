// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use backstore_server::config::{AppConfig, LogFormat};
use backstore_server::services::mailer;
use backstore_server::state::AppState;
use backstore_server::{db, web};

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Config errors are reported before tracing exists, so they go to stderr via anyhow.
  let app_config = Arc::new(AppConfig::from_env().context("loading configuration")?);
  init_tracing(app_config.log_format);
  tracing::info!(config = ?app_config, "Starting backstore server...");

  let db_pool = db::connect(&app_config).await.context("connecting to the database")?;
  if app_config.run_migrations {
    db::run_migrations(&db_pool).await.context("running migrations")?;
  }

  let notifier = mailer::from_config(&app_config).context("configuring the mailer")?;
  let app_state = AppState::postgres(app_config.clone(), db_pool, notifier);

  let server_address = app_config.bind_address();
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await
  .context("running the HTTP server")?;

  tracing::info!("Server stopped.");
  Ok(())
}
