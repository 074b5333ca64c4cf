use crate::{
    abstract_trait::{EmailMessage, MailerTrait},
    errors::ServiceError,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

impl<'a> ResendEmail<'a> {
    fn new(from: &'a str, message: &'a EmailMessage) -> Self {
        Self {
            from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
            reply_to: message.reply_to.as_deref(),
        }
    }
}

/// Client for a Resend-compatible `POST /emails` endpoint.
#[derive(Clone, Debug)]
pub struct ResendMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_url: &str, api_key: &str, from: &str) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Mail(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/emails", api_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl MailerTrait for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), ServiceError> {
        let payload = ResendEmail::new(&self.from, message);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("❌ Email API request failed: {e}");
                ServiceError::Mail(format!("Email API request failed: {e}"))
            })?;

        let status = response.status();
        if status.is_success() {
            info!("✅ Email API accepted message for {}", message.to);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!("❌ Email API rejected message ({status}): {body}");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ServiceError::Mail(
                "Email API rejected the credentials".into(),
            )),
            _ => Err(ServiceError::Mail(format!("Email API returned {status}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_matches_api_shape() {
        let message = EmailMessage {
            to: "inbox@alsa.pt".into(),
            subject: "Contact Form: Stock".into(),
            html: "<p>hi</p>".into(),
            reply_to: Some("rui@example.pt".into()),
        };

        let value = serde_json::to_value(ResendEmail::new("Shop <a@b.pt>", &message)).unwrap();

        assert_eq!(
            value,
            json!({
                "from": "Shop <a@b.pt>",
                "to": ["inbox@alsa.pt"],
                "subject": "Contact Form: Stock",
                "html": "<p>hi</p>",
                "reply_to": "rui@example.pt"
            })
        );
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let mailer = ResendMailer::new("https://api.resend.com/", "key", "a@b.pt").unwrap();
        assert_eq!(mailer.endpoint, "https://api.resend.com/emails");
    }
}
