use crate::errors::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type DynMailer = Arc<dyn MailerTrait + Send + Sync>;

/// A rendered HTML email. The sender address belongs to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait MailerTrait {
    async fn send(&self, message: &EmailMessage) -> Result<(), ServiceError>;
}
