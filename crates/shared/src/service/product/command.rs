use super::PRODUCT_NOT_FOUND;
use crate::{
    abstract_trait::{DynProductCommandRepository, ProductCommandServiceTrait},
    domain::{
        requests::{CreateProductRequest, UpdateProductRequest},
        responses::{DeleteProductResponse, ProductResponse},
    },
    errors::{RepositoryError, ServiceError},
    service::parse_id,
    utils::{Method, ServiceTelemetry, TracingContext},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

pub struct ProductCommandService {
    command: DynProductCommandRepository,
    telemetry: ServiceTelemetry,
}

impl ProductCommandService {
    pub async fn new(command: DynProductCommandRepository, registry: Arc<Mutex<Registry>>) -> Self {
        let telemetry = ServiceTelemetry::new("product_command_service", registry).await;

        Self { command, telemetry }
    }

    fn fail(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        action: &str,
        err: RepositoryError,
    ) -> ServiceError {
        match err {
            RepositoryError::NotFound => {
                self.telemetry
                    .complete_tracing_error(tracing_ctx, method, PRODUCT_NOT_FOUND);
                ServiceError::NotFound(PRODUCT_NOT_FOUND.into())
            }
            other => {
                error!("❌ Failed to {action}: {other:?}");
                self.telemetry
                    .complete_tracing_error(tracing_ctx, method, &format!("Failed to {action}"));
                ServiceError::Repo(other)
            }
        }
    }
}

#[async_trait]
impl ProductCommandServiceTrait for ProductCommandService {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        info!("🆕 Creating product: {} ({})", req.name, req.category);

        let tracing_ctx = self.telemetry.start_tracing(
            "create_product",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.name", req.name.clone()),
                KeyValue::new("product.category", req.category.clone()),
            ],
        );

        match self.command.create_product(req).await {
            Ok(product) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Post,
                    "Product created successfully",
                );
                Ok(ProductResponse::from(product))
            }
            Err(err) => Err(self.fail(&tracing_ctx, Method::Post, "create product", err)),
        }
    }

    async fn update_product(
        &self,
        id: &str,
        req: &UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        info!("🔄 Updating product {id}");

        let tracing_ctx = self.telemetry.start_tracing(
            "update_product",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", id.to_string()),
            ],
        );

        let product_id = match parse_id(id, PRODUCT_NOT_FOUND) {
            Ok(product_id) => product_id,
            Err(err) => {
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Put, "Malformed product id");
                return Err(err);
            }
        };

        match self.command.update_product(product_id, req).await {
            Ok(product) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Put,
                    "Product updated successfully",
                );
                Ok(ProductResponse::from(product))
            }
            Err(err) => Err(self.fail(&tracing_ctx, Method::Put, "update product", err)),
        }
    }

    async fn delete_product(&self, id: &str) -> Result<DeleteProductResponse, ServiceError> {
        info!("🗑️ Deleting product {id}");

        let tracing_ctx = self.telemetry.start_tracing(
            "delete_product",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", id.to_string()),
            ],
        );

        let product_id = match parse_id(id, PRODUCT_NOT_FOUND) {
            Ok(product_id) => product_id,
            Err(err) => {
                self.telemetry.complete_tracing_error(
                    &tracing_ctx,
                    Method::Delete,
                    "Malformed product id",
                );
                return Err(err);
            }
        };

        match self.command.delete_product(product_id).await {
            Ok(deleted) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Delete,
                    "Product deleted successfully",
                );
                Ok(DeleteProductResponse {
                    message: "Product deleted successfully".to_string(),
                    id: deleted.to_string(),
                })
            }
            Err(err) => Err(self.fail(&tracing_ctx, Method::Delete, "delete product", err)),
        }
    }
}
