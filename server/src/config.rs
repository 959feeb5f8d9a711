// server/src/config.rs

use crate::errors::{AppError, Result};
use backstore::Decimal;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

pub const DEFAULT_BREVO_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub db_max_connections: u32,
  pub run_migrations: bool,
  pub session_ttl_hours: i64,
  pub free_shipping_discount: Decimal,

  pub mail_sender: String,
  pub mail_sender_name: String,
  /// `None` selects the log-only mailer.
  pub brevo_api_key: Option<String>,
  pub brevo_api_url: String,

  pub log_format: LogFormat,
}

// Keeps secrets out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("db_max_connections", &self.db_max_connections)
      .field("run_migrations", &self.run_migrations)
      .field("session_ttl_hours", &self.session_ttl_hours)
      .field("free_shipping_discount", &self.free_shipping_discount)
      .field("mail_sender", &self.mail_sender)
      .field("mail_sender_name", &self.mail_sender_name)
      .field("brevo_api_key", &self.brevo_api_key.as_ref().map(|_| "[REDACTED]"))
      .field("brevo_api_url", &self.brevo_api_url)
      .field("log_format", &self.log_format)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(&get, "SERVER_PORT", 8080u16)?;
    let database_url =
      get("DATABASE_URL").ok_or_else(|| AppError::Config("Missing environment variable 'DATABASE_URL'".to_string()))?;
    let db_max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", 10u32)?;
    let run_migrations = parse_or(&get, "RUN_MIGRATIONS", true)?;

    let session_ttl_hours = parse_or(&get, "SESSION_TTL_HOURS", 12i64)?;
    if session_ttl_hours <= 0 {
      return Err(AppError::Config("SESSION_TTL_HOURS must be positive".to_string()));
    }
    let free_shipping_discount = parse_or(&get, "FREE_SHIPPING_DISCOUNT", Decimal::ONE_HUNDRED)?;
    if free_shipping_discount < Decimal::ZERO {
      return Err(AppError::Config("FREE_SHIPPING_DISCOUNT cannot be negative".to_string()));
    }

    let mail_sender = get("MAIL_SENDER").unwrap_or_else(|| "noreply@example.com".to_string());
    let mail_sender_name = get("MAIL_SENDER_NAME").unwrap_or_else(|| "Backstore".to_string());
    let brevo_api_key = get("BREVO_API_KEY");
    let brevo_api_url = get("BREVO_API_URL").unwrap_or_else(|| DEFAULT_BREVO_API_URL.to_string());

    let log_format = match get("LOG_FORMAT").as_deref() {
      None | Some("pretty") | Some("text") => LogFormat::Pretty,
      Some("json") => LogFormat::Json,
      Some(other) => return Err(AppError::Config(format!("Invalid LOG_FORMAT: '{}'", other))),
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      run_migrations,
      session_ttl_hours,
      free_shipping_discount,
      mail_sender,
      mail_sender_name,
      brevo_api_key,
      brevo_api_url,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match get(name) {
    None => Ok(default),
    Some(raw) => raw
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
  }
}
