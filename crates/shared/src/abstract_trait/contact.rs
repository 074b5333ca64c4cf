use crate::{
    domain::{requests::ContactRequest, responses::ContactResponse},
    errors::ServiceError,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynContactService = Arc<dyn ContactServiceTrait + Send + Sync>;

#[async_trait]
pub trait ContactServiceTrait {
    /// Fails with `ServiceError::MailUnavailable` when no email API is configured.
    async fn submit(&self, req: &ContactRequest) -> Result<ContactResponse, ServiceError>;

    /// Address shown to visitors when the form cannot be relayed.
    fn fallback_email(&self) -> String;
}
