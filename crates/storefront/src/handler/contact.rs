use crate::{middleware::validate::SimpleValidatedJson, state::AppState};
use axum::{
    Extension, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use shared::{
    abstract_trait::DynContactService,
    domain::{
        requests::ContactRequest,
        responses::{ContactFallbackResponse, ContactResponse},
    },
    errors::ServiceError,
};
use std::sync::Arc;
use tracing::error;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message relayed", body = ContactResponse),
        (status = 400, description = "Missing field or malformed email"),
        (status = 503, description = "Email API not configured; write to contactEmail instead", body = ContactFallbackResponse),
        (status = 500, description = "Email API failure", body = ContactResponse)
    )
)]
pub async fn contact_handler(
    Extension(service): Extension<DynContactService>,
    SimpleValidatedJson(body): SimpleValidatedJson<ContactRequest>,
) -> Response {
    match service.submit(&body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(ServiceError::MailUnavailable) => {
            let contact_email = service.fallback_email();
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ContactFallbackResponse {
                    success: false,
                    message: format!(
                        "Email service is temporarily unavailable. Please try again later or email us directly at {contact_email}."
                    ),
                    fallback: true,
                    contact_email,
                }),
            )
                .into_response()
        }
        Err(err) => {
            error!("❌ Contact form error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ContactResponse {
                    success: false,
                    message:
                        "There was an error sending your message. Please try again or email us directly."
                            .to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub fn contact_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/contact", post(contact_handler))
        .layer(Extension(app_state.di_container.contact_service.clone()))
        .with_state(app_state)
}
