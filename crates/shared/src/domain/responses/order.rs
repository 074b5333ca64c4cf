use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{BillingInfo, Order, OrderItem};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub billing_info: BillingInfo,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub shipping: f64,
    pub tax: f64,
    pub grand_total: f64,
    pub payment_method: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(value: Order) -> Self {
        OrderResponse {
            id: value.id.to_string(),
            order_number: value.order_number,
            billing_info: value.billing_info.0,
            items: value.items.0,
            subtotal: value.subtotal,
            shipping: value.shipping,
            tax: value.tax,
            grand_total: value.grand_total,
            payment_method: value.payment_method,
            status: value.status,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}
