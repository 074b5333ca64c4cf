use crate::{
    domain::{requests::CheckoutRequest, responses::CheckoutResponse},
    errors::ServiceError,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynCheckoutService = Arc<dyn CheckoutServiceTrait + Send + Sync>;

#[async_trait]
pub trait CheckoutServiceTrait {
    async fn checkout(&self, req: &CheckoutRequest) -> Result<CheckoutResponse, ServiceError>;
}
