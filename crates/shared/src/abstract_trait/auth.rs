use crate::{
    domain::{
        requests::{LoginRequest, RegisterRequest},
        responses::{LoginResponse, UserResponse},
    },
    errors::ServiceError,
    model::Identity,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynRegisterService = Arc<dyn RegisterServiceTrait + Send + Sync>;
pub type DynLoginService = Arc<dyn LoginServiceTrait + Send + Sync>;
pub type DynIdentityService = Arc<dyn IdentityServiceTrait + Send + Sync>;

#[async_trait]
pub trait RegisterServiceTrait {
    /// `requester` is the verified caller, if any; only admins may create admins.
    async fn register(
        &self,
        req: &RegisterRequest,
        requester: Option<&Identity>,
    ) -> Result<UserResponse, ServiceError>;

    /// Creates the admin account when no user holds `email` yet.
    async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait LoginServiceTrait {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ServiceError>;
}

#[async_trait]
pub trait IdentityServiceTrait {
    fn verify_token(&self, token: &str) -> Result<Identity, ServiceError>;
    async fn current_user(&self, identity: &Identity) -> Result<UserResponse, ServiceError>;
}
