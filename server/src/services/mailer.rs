// server/src/services/mailer.rs

//! Transactional order emails: a Brevo-compatible HTTP sender and a log-only
//! fallback used when no API key is configured.

use async_trait::async_trait;
use backstore::{NoticeKind, NotifyError, OrderNotice, OrderNotifier, SentNotification};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;

/// A rendered email, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
  pub subject: String,
  pub html: String,
}

pub fn render(kind: NoticeKind, notice: &OrderNotice) -> RenderedEmail {
  match kind {
    NoticeKind::Shipment => render_shipment(notice),
    NoticeKind::Delivery => render_delivery(notice),
  }
}

fn render_shipment(notice: &OrderNotice) -> RenderedEmail {
  let mut html = String::new();
  let _ = write!(
    html,
    "<h2>Your order {} is on its way</h2><p>Hi {},</p><p>Good news: your order has shipped.</p>",
    escape_html(&notice.order_number),
    escape_html(&notice.customer_name)
  );

  html.push_str("<p>");
  if let Some(courier) = notice.courier_name.as_deref() {
    let _ = write!(html, "Courier: <strong>{}</strong><br>", escape_html(courier));
  }
  if let Some(tracking_id) = notice.tracking_id.as_deref() {
    let _ = write!(html, "Tracking number: <strong>{}</strong><br>", escape_html(tracking_id));
  }
  if let Some(url) = notice.tracking_url.as_deref() {
    let url = escape_html(url);
    let _ = write!(html, "<a href=\"{}\">Track your package</a>", url);
  }
  html.push_str("</p>");

  if let Some(address) = notice.shipping_address.as_ref() {
    let _ = write!(html, "<p>Shipping to: {}</p>", escape_html(&address.one_line()));
  }
  push_items(&mut html, notice);

  RenderedEmail {
    subject: format!("Your order {} has shipped", notice.order_number),
    html,
  }
}

fn render_delivery(notice: &OrderNotice) -> RenderedEmail {
  let mut html = String::new();
  let _ = write!(
    html,
    "<h2>Order {} delivered</h2><p>Hi {},</p><p>Your order has been delivered. We hope you enjoy it!</p>",
    escape_html(&notice.order_number),
    escape_html(&notice.customer_name)
  );
  push_items(&mut html, notice);

  RenderedEmail {
    subject: format!("Your order {} has been delivered", notice.order_number),
    html,
  }
}

fn push_items(html: &mut String, notice: &OrderNotice) {
  if !notice.items.is_empty() {
    html.push_str("<table><tr><th>Item</th><th>Qty</th><th>Price</th><th>Total</th></tr>");
    for line in &notice.items {
      let _ = write!(
        html,
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape_html(&line.product_name),
        line.quantity,
        line.unit_price.round_dp(2),
        line.total_price.round_dp(2)
      );
    }
    html.push_str("</table>");
  }
  let _ = write!(html, "<p><strong>Order total: {}</strong></p>", notice.total_amount.round_dp(2));
}

pub fn escape_html(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for ch in raw.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      other => out.push(other),
    }
  }
  out
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmail<'a> {
  sender: BrevoContact<'a>,
  to: [BrevoContact<'a>; 1],
  subject: &'a str,
  html_content: &'a str,
}

#[derive(Debug, Serialize)]
struct BrevoContact<'a> {
  email: &'a str,
  name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrevoAccepted {
  message_id: Option<String>,
}

/// Sends through Brevo's `POST /v3/smtp/email` API.
#[derive(Debug, Clone)]
pub struct BrevoMailer {
  client: reqwest::Client,
  api_url: String,
  api_key: String,
  sender_email: String,
  sender_name: String,
}

impl BrevoMailer {
  pub fn new(api_url: String, api_key: String, sender_email: String, sender_name: String) -> Result<Self, AppError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| AppError::Mail(format!("Failed to build HTTP client: {}", e)))?;
    Ok(Self {
      client,
      api_url,
      api_key,
      sender_email,
      sender_name,
    })
  }

  #[instrument(name = "mailer::brevo::send", skip(self, notice), fields(order_number = %notice.order_number, kind = ?kind), err(Display))]
  async fn send(&self, kind: NoticeKind, notice: &OrderNotice) -> Result<SentNotification, NotifyError> {
    let email = render(kind, notice);
    let body = BrevoEmail {
      sender: BrevoContact {
        email: &self.sender_email,
        name: &self.sender_name,
      },
      to: [BrevoContact {
        email: &notice.to_email,
        name: &notice.customer_name,
      }],
      subject: &email.subject,
      html_content: &email.html,
    };

    let response = self
      .client
      .post(&self.api_url)
      .header("api-key", &self.api_key)
      .header("Accept", "application/json")
      .json(&body)
      .send()
      .await
      .map_err(|e| NotifyError::Transport { source: e.into() })?;

    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      warn!(%status, "Brevo rejected the email.");
      return Err(NotifyError::Rejected(format!("HTTP {}: {}", status.as_u16(), detail)));
    }

    let accepted: BrevoAccepted = response
      .json()
      .await
      .map_err(|e| NotifyError::Transport { source: e.into() })?;
    let message_id = accepted.message_id.unwrap_or_else(|| format!("brevo-{}", Uuid::new_v4()));
    info!(%message_id, "Order email accepted by Brevo.");
    Ok(SentNotification { message_id })
  }
}

#[async_trait]
impl OrderNotifier for BrevoMailer {
  async fn send_shipment(&self, notice: &OrderNotice) -> Result<SentNotification, NotifyError> {
    self.send(NoticeKind::Shipment, notice).await
  }

  async fn send_delivery(&self, notice: &OrderNotice) -> Result<SentNotification, NotifyError> {
    self.send(NoticeKind::Delivery, notice).await
  }
}

/// Renders the email and logs it instead of sending.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl LogMailer {
  fn send(&self, kind: NoticeKind, notice: &OrderNotice) -> SentNotification {
    let email = render(kind, notice);
    let message_id = format!("log-{}", Uuid::new_v4());
    info!(
      to = %notice.to_email,
      subject = %email.subject,
      %message_id,
      "Email delivery disabled; logged order email instead."
    );
    SentNotification { message_id }
  }
}

#[async_trait]
impl OrderNotifier for LogMailer {
  async fn send_shipment(&self, notice: &OrderNotice) -> Result<SentNotification, NotifyError> {
    Ok(self.send(NoticeKind::Shipment, notice))
  }

  async fn send_delivery(&self, notice: &OrderNotice) -> Result<SentNotification, NotifyError> {
    Ok(self.send(NoticeKind::Delivery, notice))
  }
}

/// Brevo when an API key is configured, otherwise the log-only mailer.
pub fn from_config(config: &AppConfig) -> Result<std::sync::Arc<dyn OrderNotifier>, AppError> {
  match config.brevo_api_key.as_ref() {
    Some(api_key) => {
      info!(api_url = %config.brevo_api_url, "Using Brevo for order emails.");
      Ok(std::sync::Arc::new(BrevoMailer::new(
        config.brevo_api_url.clone(),
        api_key.clone(),
        config.mail_sender.clone(),
        config.mail_sender_name.clone(),
      )?))
    }
    None => {
      warn!("BREVO_API_KEY not set; order emails will only be logged.");
      Ok(std::sync::Arc::new(LogMailer))
    }
  }
}
