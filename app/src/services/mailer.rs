// app/src/services/mailer.rs

//! Outbound email through the external mail provider.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub text: String,
}

/// Provider-side identifier of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

#[derive(Debug, Error)]
pub enum MailError {
  #[error("mail request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("mail provider rejected the message with status {status}: {body}")]
  Rejected { status: u16, body: String },

  #[error("mail client setup failed: {0}")]
  Setup(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
  async fn send(&self, email: OutgoingEmail) -> Result<MessageId, MailError>;
}

/// SendGrid v3 `mail/send` client.
pub struct SendGridMailer {
  client: Client,
  api_key: String,
  endpoint: String,
}

impl SendGridMailer {
  pub fn new(api_key: String, base_url: &str) -> Result<Self, MailError> {
    if api_key.trim().is_empty() {
      return Err(MailError::Setup("mail provider API key is empty".to_string()));
    }
    let client = Client::builder().build()?;
    Ok(Self {
      client,
      api_key,
      endpoint: format!("{}/v3/mail/send", base_url.trim_end_matches('/')),
    })
  }
}

#[async_trait]
impl Mailer for SendGridMailer {
  #[instrument(name = "mailer::sendgrid_send", skip(self, email), fields(to = %email.to), err(Display))]
  async fn send(&self, email: OutgoingEmail) -> Result<MessageId, MailError> {
    let payload = json!({
      "personalizations": [{ "to": [{ "email": email.to }] }],
      "from": { "email": email.from },
      "subject": email.subject,
      "content": [{ "type": "text/plain", "value": email.text }],
    });

    let response = self
      .client
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&payload)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      error!(status = status.as_u16(), "Mail provider rejected message.");
      return Err(MailError::Rejected {
        status: status.as_u16(),
        body,
      });
    }

    let message_id = response
      .headers()
      .get("x-message-id")
      .and_then(|v| v.to_str().ok())
      .map(str::to_string)
      .unwrap_or_else(|| format!("sendgrid-{}", uuid::Uuid::new_v4().simple()));
    debug!(%message_id, "Mail provider accepted message.");
    Ok(MessageId(message_id))
  }
}

/// Logs messages instead of sending them. Selected when no provider key is configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
  async fn send(&self, email: OutgoingEmail) -> Result<MessageId, MailError> {
    let message_id = format!("log-{}", uuid::Uuid::new_v4().simple());
    info!(
      %message_id,
      to = %email.to,
      from = %email.from,
      subject = %email.subject,
      body_len = email.text.len(),
      "Email not sent (no mail provider configured)."
    );
    Ok(MessageId(message_id))
  }
}
