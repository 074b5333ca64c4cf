use crate::{
    domain::responses::{ApiResponse, OrderResponse},
    errors::{RepositoryError, ServiceError},
    model::{NewOrder, Order as OrderModel},
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;
pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandRepositoryTrait {
    async fn create_order(&self, order: &NewOrder) -> Result<OrderModel, RepositoryError>;
    /// Moves a `pending_payment` order to `placed`. `NotFound` when absent,
    /// `Conflict` when the order is in any other state.
    async fn confirm_payment(&self, id: Uuid) -> Result<OrderModel, RepositoryError>;
}

#[async_trait]
pub trait OrderCommandServiceTrait {
    async fn confirm_payment(&self, id: &str) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
