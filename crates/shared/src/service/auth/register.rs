use crate::{
    abstract_trait::{
        DynHashing, DynUserCommandRepository, DynUserQueryRepository, RegisterServiceTrait,
    },
    domain::{
        requests::{RegisterRequest, normalize_email},
        responses::UserResponse,
    },
    errors::{RepositoryError, ServiceError},
    model::{Identity, NewUser, UserRole},
    utils::{Method, ServiceTelemetry},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const USER_EXISTS: &str = "User already exists";

pub struct RegisterService {
    hash: DynHashing,
    user_query: DynUserQueryRepository,
    user_command: DynUserCommandRepository,
    telemetry: ServiceTelemetry,
}

impl RegisterService {
    pub async fn new(
        hash: DynHashing,
        user_query: DynUserQueryRepository,
        user_command: DynUserCommandRepository,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let telemetry = ServiceTelemetry::new("register_service", registry).await;

        Self {
            hash,
            user_query,
            user_command,
            telemetry,
        }
    }

    /// The token's role claim is not enough: the caller must still be an admin in the store.
    async fn requester_is_admin(&self, requester: Option<&Identity>) -> Result<bool, ServiceError> {
        let Some(identity) = requester.filter(|identity| identity.is_admin()) else {
            return Ok(false);
        };

        let stored = self.user_query.find_by_id(identity.user_id).await?;
        Ok(stored.is_some_and(|user| user.role() == UserRole::Admin))
    }

    async fn create(
        &self,
        email: String,
        password: &str,
        name: Option<String>,
        role: UserRole,
    ) -> Result<UserResponse, ServiceError> {
        if self.user_query.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Repo(RepositoryError::AlreadyExists(
                USER_EXISTS.into(),
            )));
        }

        let password_hash = self.hash.hash_password(password).await?;

        let user = self
            .user_command
            .create_user(&NewUser {
                email,
                password_hash,
                name: name
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty()),
                role,
            })
            .await?;

        Ok(UserResponse::from(user))
    }
}

#[async_trait]
impl RegisterServiceTrait for RegisterService {
    async fn register(
        &self,
        req: &RegisterRequest,
        requester: Option<&Identity>,
    ) -> Result<UserResponse, ServiceError> {
        let email = req.normalized_email();
        let role = req.role.unwrap_or(UserRole::Client);

        info!("📝 Registering user {email} with role {role}");

        let tracing_ctx = self.telemetry.start_tracing(
            "register_user",
            vec![
                KeyValue::new("component", "auth"),
                KeyValue::new("user.email", email.clone()),
                KeyValue::new("user.role", role.as_str()),
            ],
        );

        if role == UserRole::Admin {
            match self.requester_is_admin(requester).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("⚠️ Refused admin self-registration for {email}");
                    self.telemetry.complete_tracing_error(
                        &tracing_ctx,
                        Method::Post,
                        "Admin role requires an admin token",
                    );
                    return Err(ServiceError::Forbidden(
                        "Only administrators can create admin accounts".into(),
                    ));
                }
                Err(err) => {
                    self.telemetry.complete_tracing_error(
                        &tracing_ctx,
                        Method::Post,
                        "Failed to verify requester",
                    );
                    return Err(err);
                }
            }
        }

        match self.create(email, &req.password, req.name.clone(), role).await {
            Ok(user) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Post,
                    "User registered successfully",
                );
                Ok(user)
            }
            Err(err) => {
                error!("❌ Registration failed: {err}");
                self.telemetry.complete_tracing_error(
                    &tracing_ctx,
                    Method::Post,
                    "Registration failed",
                );
                Err(err)
            }
        }
    }

    async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<(), ServiceError> {
        let email = normalize_email(email);

        if self.user_query.find_by_email(&email).await?.is_some() {
            info!("👤 Admin account {email} already present");
            return Ok(());
        }

        match self.create(email.clone(), password, name, UserRole::Admin).await {
            Ok(user) => {
                info!("✅ Bootstrapped admin account {} ({})", user.email, user.id);
                Ok(())
            }
            Err(ServiceError::Repo(RepositoryError::AlreadyExists(_))) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Hashing,
        domain::requests::RegisterRequest,
        testing::{InMemoryUserRepository, sample_user},
    };

    async fn service(users: Arc<InMemoryUserRepository>) -> RegisterService {
        RegisterService::new(
            Arc::new(Hashing::new(4)),
            users.clone(),
            users,
            Arc::new(Mutex::new(Registry::default())),
        )
        .await
    }

    fn request(email: &str, role: Option<UserRole>) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: "secret1".into(),
            name: Some("  Ana  ".into()),
            role,
        }
    }

    #[tokio::test]
    async fn registers_client_with_normalised_email() {
        let users = Arc::new(InMemoryUserRepository::default());
        let user = service(users.clone())
            .await
            .register(&request(" Ana@Example.PT ", None), None)
            .await
            .unwrap();

        assert_eq!(user.email, "ana@example.pt");
        assert_eq!(user.role, "client");
        assert_eq!(user.name.as_deref(), Some("Ana"));
        assert_ne!(users.all()[0].password, "secret1");
    }

    #[tokio::test]
    async fn duplicate_email_differing_in_case_is_rejected() {
        let users = Arc::new(InMemoryUserRepository::default());
        let service = service(users).await;

        service
            .register(&request("ana@example.pt", None), None)
            .await
            .unwrap();
        let second = service.register(&request("ANA@example.pt", None), None).await;

        assert!(matches!(
            second,
            Err(ServiceError::Repo(RepositoryError::AlreadyExists(msg))) if msg == USER_EXISTS
        ));
    }

    #[tokio::test]
    async fn admin_role_needs_stored_admin_requester() {
        let users = Arc::new(InMemoryUserRepository::default());
        let admin = users.insert(sample_user("boss@alsa.pt", UserRole::Admin));
        let client = users.insert(sample_user("client@alsa.pt", UserRole::Client));
        let service = service(users).await;

        let anonymous = service
            .register(&request("x@alsa.pt", Some(UserRole::Admin)), None)
            .await;
        assert!(matches!(anonymous, Err(ServiceError::Forbidden(_))));

        let forged = Identity {
            user_id: client.id,
            email: client.email.clone(),
            role: UserRole::Admin,
        };
        let by_client = service
            .register(&request("y@alsa.pt", Some(UserRole::Admin)), Some(&forged))
            .await;
        assert!(matches!(by_client, Err(ServiceError::Forbidden(_))));

        let real = Identity {
            user_id: admin.id,
            email: admin.email.clone(),
            role: UserRole::Admin,
        };
        let created = service
            .register(&request("z@alsa.pt", Some(UserRole::Admin)), Some(&real))
            .await
            .unwrap();
        assert_eq!(created.role, "admin");
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let users = Arc::new(InMemoryUserRepository::default());
        let service = service(users.clone()).await;

        service
            .ensure_admin("Owner@Alsa.pt", "changeme", Some("Owner".into()))
            .await
            .unwrap();
        service
            .ensure_admin("owner@alsa.pt", "other", None)
            .await
            .unwrap();

        let all = users.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].role(), UserRole::Admin);
    }
}
