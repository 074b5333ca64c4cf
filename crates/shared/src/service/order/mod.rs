mod command;
mod query;

use self::command::OrderCommandService;
use self::query::OrderQueryService;
use crate::abstract_trait::{
    DynOrderCommandRepository, DynOrderCommandService, DynOrderQueryRepository,
    DynOrderQueryService,
};
use prometheus_client::registry::Registry;
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

const ORDER_NOT_FOUND: &str = "Order not found";

#[derive(Clone)]
pub struct OrderService {
    pub query: DynOrderQueryService,
    pub command: DynOrderCommandService,
}

impl fmt::Debug for OrderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderService")
            .field("query", &"Arc<dyn OrderQueryServiceTrait>")
            .field("command", &"Arc<dyn OrderCommandServiceTrait>")
            .finish()
    }
}

impl OrderService {
    pub async fn new(
        query: DynOrderQueryRepository,
        command: DynOrderCommandRepository,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let query_service =
            Arc::new(OrderQueryService::new(query, registry.clone()).await) as DynOrderQueryService;
        let command_service =
            Arc::new(OrderCommandService::new(command, registry).await) as DynOrderCommandService;

        Self {
            query: query_service,
            command: command_service,
        }
    }
}
