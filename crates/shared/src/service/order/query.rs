use super::ORDER_NOT_FOUND;
use crate::{
    abstract_trait::{DynOrderQueryRepository, OrderQueryServiceTrait},
    domain::{
        requests::FindAllOrders,
        responses::{ApiResponse, OrderResponse},
    },
    errors::ServiceError,
    model::OrderStatus,
    service::parse_id,
    utils::{Method, ServiceTelemetry},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    telemetry: ServiceTelemetry,
}

impl OrderQueryService {
    pub async fn new(query: DynOrderQueryRepository, registry: Arc<Mutex<Registry>>) -> Self {
        let telemetry = ServiceTelemetry::new("order_query_service", registry).await;

        Self { query, telemetry }
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_all(
        &self,
        req: &FindAllOrders,
    ) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError> {
        let raw_status = req
            .status
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty());

        info!("📦 Listing orders (status: {})", raw_status.unwrap_or("any"));

        let tracing_ctx = self.telemetry.start_tracing(
            "find_all_orders",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.status", raw_status.unwrap_or("any").to_string()),
            ],
        );

        let status = match raw_status.map(str::parse::<OrderStatus>).transpose() {
            Ok(status) => status,
            Err(msg) => {
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, "Unknown order status");
                return Err(ServiceError::Validation(vec![msg]));
            }
        };

        match self.query.find_all(status).await {
            Ok(orders) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Get,
                    "Orders retrieved successfully",
                );
                Ok(ApiResponse::success(
                    "Orders retrieved successfully",
                    orders.into_iter().map(OrderResponse::from).collect(),
                ))
            }
            Err(err) => {
                error!("❌ Failed to list orders: {err:?}");
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, "Failed to list orders");
                Err(ServiceError::Repo(err))
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let tracing_ctx = self.telemetry.start_tracing(
            "find_order_by_id",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id.to_string()),
            ],
        );

        let order_id = match parse_id(id, ORDER_NOT_FOUND) {
            Ok(order_id) => order_id,
            Err(err) => {
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, "Malformed order id");
                return Err(err);
            }
        };

        match self.query.find_by_id(order_id).await {
            Ok(Some(order)) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Get,
                    "Order retrieved successfully",
                );
                Ok(ApiResponse::success(
                    "Order retrieved successfully",
                    OrderResponse::from(order),
                ))
            }
            Ok(None) => {
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, ORDER_NOT_FOUND);
                Err(ServiceError::NotFound(ORDER_NOT_FOUND.into()))
            }
            Err(err) => {
                error!("❌ Failed to fetch order {order_id}: {err:?}");
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, "Failed to fetch order");
                Err(ServiceError::Repo(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::PaymentMethod,
        testing::{InMemoryOrderRepository, sample_order},
    };

    #[tokio::test]
    async fn lists_newest_first_with_status_filter() {
        let orders = Arc::new(InMemoryOrderRepository::default());
        orders.insert(sample_order("ORD-20250101-AAAAAA", PaymentMethod::Card));
        orders.insert(sample_order("ORD-20250102-BBBBBB", PaymentMethod::MbWay));
        let service =
            OrderQueryService::new(orders, Arc::new(Mutex::new(Registry::default()))).await;

        let all = service.find_all(&FindAllOrders::default()).await.unwrap();
        let numbers: Vec<_> = all.data.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, ["ORD-20250102-BBBBBB", "ORD-20250101-AAAAAA"]);

        let pending = service
            .find_all(&FindAllOrders {
                status: Some("pending_payment".into()),
            })
            .await
            .unwrap();
        assert_eq!(pending.data.len(), 1);

        let bogus = service
            .find_all(&FindAllOrders {
                status: Some("shipped".into()),
            })
            .await;
        assert!(matches!(bogus, Err(ServiceError::Validation(_))));
    }
}
