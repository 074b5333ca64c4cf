use super::ORDER_NOT_FOUND;
use crate::{
    abstract_trait::{DynOrderCommandRepository, OrderCommandServiceTrait},
    domain::responses::{ApiResponse, OrderResponse},
    errors::{RepositoryError, ServiceError},
    service::parse_id,
    utils::{Method, ServiceTelemetry},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub struct OrderCommandService {
    command: DynOrderCommandRepository,
    telemetry: ServiceTelemetry,
}

impl OrderCommandService {
    pub async fn new(command: DynOrderCommandRepository, registry: Arc<Mutex<Registry>>) -> Self {
        let telemetry = ServiceTelemetry::new("order_command_service", registry).await;

        Self { command, telemetry }
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn confirm_payment(&self, id: &str) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("💶 Confirming payment for order {id}");

        let tracing_ctx = self.telemetry.start_tracing(
            "confirm_order_payment",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id.to_string()),
            ],
        );

        let order_id = match parse_id(id, ORDER_NOT_FOUND) {
            Ok(order_id) => order_id,
            Err(err) => {
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Put, "Malformed order id");
                return Err(err);
            }
        };

        match self.command.confirm_payment(order_id).await {
            Ok(order) => {
                info!("✅ Order {} is now placed", order.order_number);
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Put,
                    "Payment confirmed",
                );
                Ok(ApiResponse::success(
                    "Payment confirmed",
                    OrderResponse::from(order),
                ))
            }
            Err(RepositoryError::NotFound) => {
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Put, ORDER_NOT_FOUND);
                Err(ServiceError::NotFound(ORDER_NOT_FOUND.into()))
            }
            Err(RepositoryError::Conflict(msg)) => {
                warn!("⚠️ Payment confirmation rejected for {order_id}: {msg}");
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Put, &msg);
                Err(ServiceError::Repo(RepositoryError::Conflict(msg)))
            }
            Err(err) => {
                error!("❌ Failed to confirm payment for {order_id}: {err:?}");
                self.telemetry.complete_tracing_error(
                    &tracing_ctx,
                    Method::Put,
                    "Failed to confirm payment",
                );
                Err(ServiceError::Repo(err))
            }
        }
    }
}
