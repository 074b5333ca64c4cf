use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub message: String,
    pub order_id: String,
    pub order_number: String,
    pub status: String,
    #[serde(rename = "isMBWayPending")]
    pub is_mbway_pending: bool,
}

/// Body of every failed checkout; details stay in the logs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutErrorResponse {
    pub success: bool,
    pub error: String,
}
