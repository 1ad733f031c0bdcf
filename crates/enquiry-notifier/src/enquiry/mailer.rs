use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::domain::{MessageBody, NotificationMessage};

/// Outbound email transport. Injected into the notifier so the dispatch
/// policy can be exercised without a network.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> Result<DeliveryReceipt, MailerError>;

    /// Whether the transport has the credentials it needs to send.
    fn is_configured(&self) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub provider_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("email API key is not configured")]
    NotConfigured,
    #[error("failed to reach email API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("email API rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Client for the Resend `/emails` endpoint.
pub struct ResendMailer {
    client: Client,
    api_key: Option<Secret<String>>,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

impl<'a> From<&'a NotificationMessage> for ResendEmail<'a> {
    fn from(message: &'a NotificationMessage) -> Self {
        let (html, text) = match &message.body {
            MessageBody::Html(body) => (Some(body.as_str()), None),
            MessageBody::Text(body) => (None, Some(body.as_str())),
        };
        Self {
            from: &message.from,
            to: &message.to,
            subject: &message.subject,
            html,
            text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    #[serde(default)]
    id: Option<String>,
}

impl ResendMailer {
    pub fn new(client: Client, api_key: Option<Secret<String>>, base_url: &str) -> Self {
        Self {
            client,
            api_key,
            endpoint: format!("{}/emails", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &NotificationMessage) -> Result<DeliveryReceipt, MailerError> {
        let api_key = self.api_key.as_ref().ok_or(MailerError::NotConfigured)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&ResendEmail::from(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx without a parseable id still counts as accepted.
        let provider_id = match response.json::<ResendResponse>().await {
            Ok(parsed) => parsed.id,
            Err(err) => {
                tracing::debug!(error = %err, "email API response had no readable id");
                None
            }
        };

        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            provider_id = provider_id.as_deref().unwrap_or("-"),
            "email accepted by provider"
        );

        Ok(DeliveryReceipt { provider_id })
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
