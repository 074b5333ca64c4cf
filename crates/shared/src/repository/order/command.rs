use super::query::ORDER_COLUMNS;
use crate::{
    abstract_trait::OrderCommandRepositoryTrait,
    config::ConnectionPool,
    errors::RepositoryError,
    model::{NewOrder, Order as OrderModel, OrderStatus},
};
use async_trait::async_trait;
use sqlx::types::Json;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct OrderCommandRepository {
    db: ConnectionPool,
}

impl OrderCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn create_order(&self, order: &NewOrder) -> Result<OrderModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query_as::<_, OrderModel>(&format!(
            r#"
            INSERT INTO orders (
                order_number, billing_info, items, subtotal, shipping, tax, grand_total,
                payment_method, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, current_timestamp, current_timestamp)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&order.order_number)
        .bind(Json(&order.billing_info))
        .bind(Json(&order.items))
        .bind(order.subtotal)
        .bind(order.shipping)
        .bind(order.tax)
        .bind(order.grand_total)
        .bind(order.payment_method.as_str())
        .bind(order.status.as_str())
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to create order {}: {:?}", order.order_number, err);
            RepositoryError::from(err)
        })?;

        info!(
            "✅ Created order {} (ID: {}, status: {})",
            result.order_number, result.id, result.status
        );
        Ok(result)
    }

    async fn confirm_payment(&self, id: Uuid) -> Result<OrderModel, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to lock order ID {}: {:?}", id, err);
            RepositoryError::from(err)
        })?
        .ok_or(RepositoryError::NotFound)?;

        if current != OrderStatus::PendingPayment.as_str() {
            warn!("⚠️ Order {} is '{}', not awaiting payment", id, current);
            return Err(RepositoryError::Conflict(format!(
                "Order is '{current}', not pending payment"
            )));
        }

        let result = sqlx::query_as::<_, OrderModel>(&format!(
            r#"
            UPDATE orders
            SET status = $2,
                updated_at = current_timestamp
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(OrderStatus::Placed.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to confirm payment for order ID {}: {:?}", id, err);
            RepositoryError::from(err)
        })?;

        tx.commit().await.map_err(RepositoryError::from)?;

        info!("💶 Payment confirmed for order {}", result.order_number);
        Ok(result)
    }
}
