use crate::{
    abstract_trait::{ContactServiceTrait, DynMailer, EmailMessage},
    domain::{requests::ContactRequest, responses::ContactResponse},
    errors::ServiceError,
    utils::{ContactEmailTemplate, Method, ServiceTelemetry, render_contact_email},
};
use async_trait::async_trait;
use chrono::Utc;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub struct ContactService {
    /// `None` when no email API key is configured.
    mailer: Option<DynMailer>,
    inbox: String,
    telemetry: ServiceTelemetry,
}

impl ContactService {
    pub async fn new(
        mailer: Option<DynMailer>,
        inbox: String,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let telemetry = ServiceTelemetry::new("contact_service", registry).await;

        Self {
            mailer,
            inbox,
            telemetry,
        }
    }

    async fn relay(&self, mailer: &DynMailer, req: &ContactRequest) -> Result<(), ServiceError> {
        let html = render_contact_email(&ContactEmailTemplate {
            name: &req.name,
            email: &req.email,
            subject: &req.subject,
            message: &req.message,
            submitted_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        })?;

        mailer
            .send(&EmailMessage {
                to: self.inbox.clone(),
                subject: format!("Contact Form: {}", req.subject),
                html,
                reply_to: Some(req.email.trim().to_string()),
            })
            .await
    }
}

#[async_trait]
impl ContactServiceTrait for ContactService {
    async fn submit(&self, req: &ContactRequest) -> Result<ContactResponse, ServiceError> {
        info!(
            contact.name = %req.name,
            contact.email = %req.email,
            contact.subject = %req.subject,
            contact.message_len = req.message.len(),
            "✉️ Contact form submission received"
        );

        let tracing_ctx = self.telemetry.start_tracing(
            "submit_contact",
            vec![
                KeyValue::new("component", "contact"),
                KeyValue::new("contact.subject", req.subject.clone()),
            ],
        );

        let Some(mailer) = &self.mailer else {
            warn!("⚠️ Email API not configured, asking visitor to write directly");
            self.telemetry.complete_tracing_error(
                &tracing_ctx,
                Method::Post,
                "Email service not configured",
            );
            return Err(ServiceError::MailUnavailable);
        };

        match self.relay(mailer, req).await {
            Ok(()) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Post,
                    "Contact message relayed",
                );
                Ok(ContactResponse {
                    success: true,
                    message: "Your message has been sent successfully! We'll get back to you soon."
                        .to_string(),
                })
            }
            Err(err) => {
                error!("❌ Failed to relay contact message: {err}");
                self.telemetry.complete_tracing_error(
                    &tracing_ctx,
                    Method::Post,
                    "Failed to relay contact message",
                );
                Err(err)
            }
        }
    }

    fn fallback_email(&self) -> String {
        self.inbox.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingMailer;

    fn request() -> ContactRequest {
        ContactRequest {
            name: "Rui".into(),
            email: "rui@example.pt".into(),
            subject: "Stock".into(),
            message: "Is Oud Noir back?".into(),
        }
    }

    async fn service(mailer: Option<DynMailer>) -> ContactService {
        ContactService::new(
            mailer,
            "hello@alsa.pt".into(),
            Arc::new(Mutex::new(Registry::default())),
        )
        .await
    }

    #[tokio::test]
    async fn unconfigured_api_reports_unavailable() {
        let service = service(None).await;

        assert!(matches!(
            service.submit(&request()).await,
            Err(ServiceError::MailUnavailable)
        ));
        assert_eq!(service.fallback_email(), "hello@alsa.pt");
    }

    #[tokio::test]
    async fn relays_to_inbox_with_reply_to_visitor() {
        let mailer = Arc::new(RecordingMailer::default());
        let response = service(Some(mailer.clone()))
            .await
            .submit(&request())
            .await
            .unwrap();

        assert!(response.success);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "hello@alsa.pt");
        assert_eq!(sent[0].subject, "Contact Form: Stock");
        assert_eq!(sent[0].reply_to.as_deref(), Some("rui@example.pt"));
    }

    #[tokio::test]
    async fn api_failure_surfaces_as_mail_error() {
        let mailer = Arc::new(RecordingMailer::failing_from(0));
        let result = service(Some(mailer)).await.submit(&request()).await;

        assert!(matches!(result, Err(ServiceError::Mail(_))));
    }
}
