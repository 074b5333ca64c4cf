use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindAllOrders {
    /// `pending_payment` or `placed`.
    #[serde(default)]
    pub status: Option<String>,
}
