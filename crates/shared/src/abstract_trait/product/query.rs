use crate::{
    domain::{requests::FindAllProducts, responses::ProductResponse},
    errors::{RepositoryError, ServiceError},
    model::{Product as ProductModel, ProductFilter},
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type DynProductQueryRepository = Arc<dyn ProductQueryRepositoryTrait + Send + Sync>;
pub type DynProductQueryService = Arc<dyn ProductQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait ProductQueryRepositoryTrait {
    /// Newest first.
    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<ProductModel>, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>, RepositoryError>;
}

#[async_trait]
pub trait ProductQueryServiceTrait {
    async fn find_all(&self, req: &FindAllProducts) -> Result<Vec<ProductResponse>, ServiceError>;
    async fn find_by_id(&self, id: &str) -> Result<ProductResponse, ServiceError>;
}
