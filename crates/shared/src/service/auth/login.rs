use crate::{
    abstract_trait::{DynHashing, DynJwtService, DynUserQueryRepository, LoginServiceTrait},
    domain::{
        requests::LoginRequest,
        responses::{LoginResponse, UserResponse},
    },
    errors::ServiceError,
    utils::{Method, ServiceTelemetry},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub struct LoginService {
    hash: DynHashing,
    jwt: DynJwtService,
    user_query: DynUserQueryRepository,
    telemetry: ServiceTelemetry,
}

impl LoginService {
    pub async fn new(
        hash: DynHashing,
        jwt: DynJwtService,
        user_query: DynUserQueryRepository,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let telemetry = ServiceTelemetry::new("login_service", registry).await;

        Self {
            hash,
            jwt,
            user_query,
            telemetry,
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let user = self
            .user_query
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        self.hash.compare_password(&user.password, password).await?;

        let token = self.jwt.generate_token(&user)?;

        Ok(LoginResponse {
            user: UserResponse::from(user),
            token,
        })
    }
}

#[async_trait]
impl LoginServiceTrait for LoginService {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ServiceError> {
        let email = req.normalized_email();
        info!("🔐 Login attempt for {email}");

        let tracing_ctx = self.telemetry.start_tracing(
            "login_user",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("user.email", email.clone()),
            ],
        );

        match self.authenticate(&email, &req.password).await {
            Ok(response) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Post,
                    "User logged in successfully",
                );
                Ok(response)
            }
            Err(err) => {
                warn!("⚠️ Login failed for {email}: {err}");
                self.telemetry
                    .complete_tracing_error(&tracing_ctx, Method::Post, "Login failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::HashingTrait,
        config::{Hashing, JwtConfig},
        model::UserRole,
        testing::{InMemoryUserRepository, sample_user},
    };

    async fn setup() -> (LoginService, DynJwtService) {
        let hashing = Hashing::new(4);
        let users = Arc::new(InMemoryUserRepository::default());
        let mut user = sample_user("ana@example.pt", UserRole::Client);
        user.password = hashing.hash_password("secret1").await.unwrap();
        users.insert(user);

        let jwt: DynJwtService = Arc::new(JwtConfig::new("test-secret", 60));
        let service = LoginService::new(
            Arc::new(hashing),
            jwt.clone(),
            users,
            Arc::new(Mutex::new(Registry::default())),
        )
        .await;

        (service, jwt)
    }

    #[tokio::test]
    async fn valid_credentials_yield_verifiable_token() {
        let (service, jwt) = setup().await;

        let response = service
            .login(&LoginRequest {
                email: "ANA@example.pt".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();

        let identity = jwt.verify_token(&response.token).unwrap();
        assert_eq!(identity.email, "ana@example.pt");
        assert_eq!(identity.role, UserRole::Client);
        assert_eq!(response.user.id, identity.user_id.to_string());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (service, _) = setup().await;

        for (email, password) in [("ana@example.pt", "nope"), ("ghost@example.pt", "secret1")] {
            let result = service
                .login(&LoginRequest {
                    email: email.into(),
                    password: password.into(),
                })
                .await;
            assert!(matches!(result, Err(ServiceError::InvalidCredentials)));
        }
    }
}
