use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynHashing, DynJwtService},
    config::{Config, ConnectionPool, Hashing, JwtConfig},
    di::{DependenciesInject, DependenciesInjectDeps},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
}

impl AppState {
    pub async fn new(pool: ConnectionPool, config: &Config) -> Result<Self> {
        let registry = Arc::new(Mutex::new(Registry::default()));
        let hash = Arc::new(Hashing::new(config.bcrypt_cost)) as DynHashing;
        let jwt_config =
            Arc::new(JwtConfig::new(&config.jwt_secret, config.jwt_ttl_minutes)) as DynJwtService;

        let di_container = DependenciesInject::new(DependenciesInjectDeps {
            pool,
            hash,
            jwt_config,
            email_config: config.email_config.clone(),
            contact_config: config.contact.clone(),
            registry: registry.clone(),
        })
        .await
        .context("Failed to initialize dependency injection container")?;

        info!("🧩 Storefront services wired");

        Ok(Self {
            di_container,
            registry,
        })
    }

    pub fn from_parts(di_container: DependenciesInject, registry: Arc<Mutex<Registry>>) -> Self {
        Self {
            di_container,
            registry,
        }
    }
}
