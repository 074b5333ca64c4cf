use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// Returned with 503 when no email API is configured; tells the client to
/// fall back to writing to `contactEmail` directly.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactFallbackResponse {
    pub success: bool,
    pub message: String,
    pub fallback: bool,
    pub contact_email: String,
}
