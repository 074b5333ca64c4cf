mod identity;
mod login;
mod register;

use self::identity::IdentityService;
use self::login::LoginService;
use self::register::RegisterService;
use crate::abstract_trait::{
    DynHashing, DynIdentityService, DynJwtService, DynLoginService, DynRegisterService,
    DynUserCommandRepository, DynUserQueryRepository,
};
use prometheus_client::registry::Registry;
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AuthService {
    pub register: DynRegisterService,
    pub login: DynLoginService,
    pub identity: DynIdentityService,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("register", &"Arc<dyn RegisterServiceTrait>")
            .field("login", &"Arc<dyn LoginServiceTrait>")
            .field("identity", &"Arc<dyn IdentityServiceTrait>")
            .finish()
    }
}

#[derive(Clone)]
pub struct AuthServiceDeps {
    pub hash: DynHashing,
    pub jwt: DynJwtService,
    pub user_query: DynUserQueryRepository,
    pub user_command: DynUserCommandRepository,
    pub registry: Arc<Mutex<Registry>>,
}

impl AuthService {
    pub async fn new(deps: AuthServiceDeps) -> Self {
        let AuthServiceDeps {
            hash,
            jwt,
            user_query,
            user_command,
            registry,
        } = deps;

        let register = Arc::new(
            RegisterService::new(
                hash.clone(),
                user_query.clone(),
                user_command,
                registry.clone(),
            )
            .await,
        ) as DynRegisterService;

        let login = Arc::new(
            LoginService::new(hash, jwt.clone(), user_query.clone(), registry.clone()).await,
        ) as DynLoginService;

        let identity =
            Arc::new(IdentityService::new(jwt, user_query, registry).await) as DynIdentityService;

        Self {
            register,
            login,
            identity,
        }
    }
}
