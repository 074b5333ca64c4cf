use crate::{
    abstract_trait::{EmailMessage, MailerTrait},
    config::EmailConfig,
    errors::ServiceError,
};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{error, info};

type SmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

/// One authenticated SMTP transport shared by every order email.
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, ServiceError> {
        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());

        // 465 speaks TLS from the first byte; anything else upgrades with STARTTLS.
        let builder = if config.smtp_port == 465 {
            SmtpTransport::relay(&config.smtp_server)
        } else {
            SmtpTransport::starttls_relay(&config.smtp_server)
        }
        .map_err(|e| {
            error!("❌ Failed to create SMTP relay for {}: {e}", config.smtp_server);
            ServiceError::Mail(format!("Failed to create SMTP relay: {e}"))
        })?;

        let mailer = builder.credentials(creds).port(config.smtp_port).build();

        let from = format!("{} <{}>", config.from_name, config.smtp_user)
            .parse::<Mailbox>()
            .map_err(|e| {
                error!("❌ Invalid sender address {}: {e}", config.smtp_user);
                ServiceError::Mail(format!("Invalid sender address: {e}"))
            })?;

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl MailerTrait for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), ServiceError> {
        let to: Mailbox = message.to.parse().map_err(|e| {
            error!("❌ Invalid recipient email: {}", e);
            ServiceError::Mail(format!("Invalid recipient email: {e}"))
        })?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML);

        if let Some(reply_to) = &message.reply_to {
            let reply_to: Mailbox = reply_to.parse().map_err(|e| {
                error!("❌ Invalid reply-to address: {}", e);
                ServiceError::Mail(format!("Invalid reply-to address: {e}"))
            })?;
            builder = builder.reply_to(reply_to);
        }

        let email = builder.body(message.html.clone()).map_err(|e| {
            error!("❌ Failed to build email: {}", e);
            ServiceError::Mail(format!("Failed to build email: {e}"))
        })?;

        match self.mailer.send(email).await {
            Ok(_) => {
                info!("✅ Email sent to {}", message.to);
                Ok(())
            }
            Err(e) => {
                error!("❌ Failed to send email to {}: {}", message.to, e);
                Err(ServiceError::Mail(format!("Failed to send email: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(port: u16, from_name: &str) -> EmailConfig {
        EmailConfig {
            smtp_server: "smtp.example.com".into(),
            smtp_port: port,
            smtp_user: "shop@example.com".into(),
            smtp_pass: "secret".into(),
            from_name: from_name.into(),
            notification_email: "orders@example.com".into(),
            mbway_phone: None,
        }
    }

    #[tokio::test]
    async fn builds_for_implicit_tls_and_starttls_ports() {
        assert!(SmtpMailer::new(&config(465, "Alsa Fragrance")).is_ok());
        assert!(SmtpMailer::new(&config(587, "Alsa Fragrance")).is_ok());
    }

    #[tokio::test]
    async fn sender_uses_display_name() {
        let mailer = SmtpMailer::new(&config(465, "Alsa Fragrance")).unwrap();

        assert_eq!(mailer.from.name.as_deref(), Some("Alsa Fragrance"));
        assert_eq!(mailer.from.email.to_string(), "shop@example.com");
    }
}
