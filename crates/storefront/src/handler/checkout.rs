use crate::{middleware::validate::SimpleValidatedJson, state::AppState};
use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use shared::{
    abstract_trait::DynCheckoutService,
    domain::{
        requests::CheckoutRequest,
        responses::{CheckoutErrorResponse, CheckoutResponse},
    },
};
use std::sync::Arc;
use tracing::error;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "Checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order stored and confirmation emails sent", body = CheckoutResponse),
        (status = 400, description = "Invalid billing info or empty cart"),
        (status = 500, description = "Order could not be processed", body = CheckoutErrorResponse)
    )
)]
pub async fn checkout_handler(
    Extension(service): Extension<DynCheckoutService>,
    SimpleValidatedJson(body): SimpleValidatedJson<CheckoutRequest>,
) -> Response {
    match service.checkout(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!("❌ Checkout error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CheckoutErrorResponse {
                    success: false,
                    error: "Failed to process order".to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub fn checkout_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/checkout", post(checkout_handler))
        .layer(Extension(app_state.di_container.checkout_service.clone()))
        .with_state(app_state)
}
