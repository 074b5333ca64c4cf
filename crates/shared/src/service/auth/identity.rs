use crate::{
    abstract_trait::{DynJwtService, DynUserQueryRepository, IdentityServiceTrait},
    domain::responses::UserResponse,
    errors::ServiceError,
    model::Identity,
    utils::{Method, ServiceTelemetry},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

pub struct IdentityService {
    jwt: DynJwtService,
    user_query: DynUserQueryRepository,
    telemetry: ServiceTelemetry,
}

impl IdentityService {
    pub async fn new(
        jwt: DynJwtService,
        user_query: DynUserQueryRepository,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let telemetry = ServiceTelemetry::new("identity_service", registry).await;

        Self {
            jwt,
            user_query,
            telemetry,
        }
    }
}

#[async_trait]
impl IdentityServiceTrait for IdentityService {
    fn verify_token(&self, token: &str) -> Result<Identity, ServiceError> {
        self.jwt.verify_token(token)
    }

    async fn current_user(&self, identity: &Identity) -> Result<UserResponse, ServiceError> {
        let tracing_ctx = self.telemetry.start_tracing(
            "current_user",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("user.id", identity.user_id.to_string()),
            ],
        );

        match self.user_query.find_by_id(identity.user_id).await {
            Ok(Some(user)) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Get,
                    "Current user retrieved",
                );
                Ok(UserResponse::from(user))
            }
            Ok(None) => {
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, "User not found");
                Err(ServiceError::NotFound("User not found".into()))
            }
            Err(err) => {
                error!("❌ Failed to load user {}: {err:?}", identity.user_id);
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Get, "Failed to load user");
                Err(ServiceError::Repo(err))
            }
        }
    }
}
