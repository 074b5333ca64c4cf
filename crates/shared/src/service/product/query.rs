use super::PRODUCT_NOT_FOUND;
use crate::{
    abstract_trait::{DynProductQueryRepository, ProductQueryServiceTrait},
    domain::{requests::FindAllProducts, responses::ProductResponse},
    errors::ServiceError,
    service::parse_id,
    utils::{Method, ServiceTelemetry},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

pub struct ProductQueryService {
    query: DynProductQueryRepository,
    telemetry: ServiceTelemetry,
}

impl ProductQueryService {
    pub async fn new(query: DynProductQueryRepository, registry: Arc<Mutex<Registry>>) -> Self {
        let telemetry = ServiceTelemetry::new("product_query_service", registry).await;

        Self { query, telemetry }
    }
}

#[async_trait]
impl ProductQueryServiceTrait for ProductQueryService {
    async fn find_all(&self, req: &FindAllProducts) -> Result<Vec<ProductResponse>, ServiceError> {
        let filter = req.to_filter();
        info!("🔍 Listing products with filter {:?}", filter);

        let tracing_ctx = self.telemetry.start_tracing(
            "find_all_products",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("category", filter.category.clone().unwrap_or_default()),
                KeyValue::new("on_sale", filter.on_sale),
                KeyValue::new("is_new", filter.is_new),
            ],
        );

        match self.query.find_all(&filter).await {
            Ok(products) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Get,
                    "Products retrieved successfully",
                );
                Ok(products.into_iter().map(ProductResponse::from).collect())
            }
            Err(err) => {
                error!("❌ Failed to list products: {err:?}");
                self.telemetry.complete_tracing_error(
                    &tracing_ctx,
                    Method::Get,
                    "Failed to list products",
                );
                Err(ServiceError::Repo(err))
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<ProductResponse, ServiceError> {
        let tracing_ctx = self.telemetry.start_tracing(
            "find_product_by_id",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", id.to_string()),
            ],
        );

        let product_id = match parse_id(id, PRODUCT_NOT_FOUND) {
            Ok(product_id) => product_id,
            Err(err) => {
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, "Malformed product id");
                return Err(err);
            }
        };

        match self.query.find_by_id(product_id).await {
            Ok(Some(product)) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Get,
                    "Product retrieved successfully",
                );
                Ok(ProductResponse::from(product))
            }
            Ok(None) => {
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, PRODUCT_NOT_FOUND);
                Err(ServiceError::NotFound(PRODUCT_NOT_FOUND.into()))
            }
            Err(err) => {
                error!("❌ Failed to fetch product {product_id}: {err:?}");
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, "Failed to fetch product");
                Err(ServiceError::Repo(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryProductRepository, sample_product};

    async fn service(products: Arc<InMemoryProductRepository>) -> ProductQueryService {
        ProductQueryService::new(products, Arc::new(Mutex::new(Registry::default()))).await
    }

    #[tokio::test]
    async fn filters_by_category_and_sale_flag() {
        let products = Arc::new(InMemoryProductRepository::default());
        products.insert(sample_product("Oud Noir", "men"));
        let mut rose = sample_product("Rose Veil", "women");
        rose.is_sale = true;
        rose.sale_price = Some(30.0);
        products.insert(rose);

        let service = service(products).await;

        let women = service
            .find_all(&FindAllProducts {
                category: Some("women".into()),
                on_sale: Some("true".into()),
                is_new: None,
            })
            .await
            .unwrap();

        assert_eq!(women.len(), 1);
        assert_eq!(women[0].name, "Rose Veil");
        assert_eq!(women[0].price, 30.0);
    }

    #[tokio::test]
    async fn malformed_and_missing_ids_share_message() {
        let service = service(Arc::new(InMemoryProductRepository::default())).await;

        for id in ["abc".to_string(), uuid::Uuid::new_v4().to_string()] {
            assert!(matches!(
                service.find_by_id(&id).await,
                Err(ServiceError::NotFound(msg)) if msg == PRODUCT_NOT_FOUND
            ));
        }
    }
}
