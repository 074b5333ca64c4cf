use crate::{
    abstract_trait::{
        DynCheckoutService, DynContactService, DynHashing, DynJwtService, DynMailer,
    },
    config::{ConnectionPool, ContactConfig, EmailConfig},
    repository::{OrderRepository, ProductRepository, UserRepository},
    service::{
        AuthService, AuthServiceDeps, CheckoutService, ContactService, OrderService,
        ProductService, ResendMailer, SmtpMailer,
    },
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub struct DependenciesInject {
    pub auth_service: AuthService,
    pub product_service: ProductService,
    pub order_service: OrderService,
    pub checkout_service: DynCheckoutService,
    pub contact_service: DynContactService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("auth_service", &"<AuthService>")
            .field("product_service", &"<ProductService>")
            .field("order_service", &"<OrderService>")
            .field("checkout_service", &"<CheckoutService>")
            .field("contact_service", &"<ContactService>")
            .finish()
    }
}

#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub pool: ConnectionPool,
    pub hash: DynHashing,
    pub jwt_config: DynJwtService,
    pub email_config: EmailConfig,
    pub contact_config: ContactConfig,
    pub registry: Arc<Mutex<Registry>>,
}

/// Already-built repositories and transports; the seam used by tests.
#[derive(Clone)]
pub struct ServiceParts {
    pub product_repository: ProductRepository,
    pub user_repository: UserRepository,
    pub order_repository: OrderRepository,
    pub hash: DynHashing,
    pub jwt_config: DynJwtService,
    pub order_mailer: DynMailer,
    pub contact_mailer: Option<DynMailer>,
    pub notification_email: String,
    pub mbway_phone: Option<String>,
    pub contact_inbox: String,
    pub registry: Arc<Mutex<Registry>>,
}

impl DependenciesInject {
    pub async fn new(deps: DependenciesInjectDeps) -> Result<Self> {
        let DependenciesInjectDeps {
            pool,
            hash,
            jwt_config,
            email_config,
            contact_config,
            registry,
        } = deps;

        let order_mailer = Arc::new(
            SmtpMailer::new(&email_config).context("Failed to initialize SMTP mailer")?,
        ) as DynMailer;

        let contact_mailer = match &contact_config.api_key {
            Some(api_key) => {
                info!("📮 Contact form relays through {}", contact_config.api_url);
                let mailer = ResendMailer::new(&contact_config.api_url, api_key, &contact_config.from)
                    .context("Failed to initialize email API client")?;
                Some(Arc::new(mailer) as DynMailer)
            }
            None => {
                warn!("⚠️ RESEND_API_KEY not set, contact form will answer with a fallback address");
                None
            }
        };

        let parts = ServiceParts {
            product_repository: ProductRepository::new(pool.clone()),
            user_repository: UserRepository::new(pool.clone()),
            order_repository: OrderRepository::new(pool),
            hash,
            jwt_config,
            order_mailer,
            contact_mailer,
            notification_email: email_config.notification_email,
            mbway_phone: email_config.mbway_phone,
            contact_inbox: contact_config.inbox,
            registry,
        };

        Ok(Self::from_parts(parts).await)
    }

    pub async fn from_parts(parts: ServiceParts) -> Self {
        let ServiceParts {
            product_repository,
            user_repository,
            order_repository,
            hash,
            jwt_config,
            order_mailer,
            contact_mailer,
            notification_email,
            mbway_phone,
            contact_inbox,
            registry,
        } = parts;

        let auth_service = AuthService::new(AuthServiceDeps {
            hash,
            jwt: jwt_config,
            user_query: user_repository.query,
            user_command: user_repository.command,
            registry: registry.clone(),
        })
        .await;

        let product_service = ProductService::new(
            product_repository.query,
            product_repository.command,
            registry.clone(),
        )
        .await;

        let order_service = OrderService::new(
            order_repository.query,
            order_repository.command.clone(),
            registry.clone(),
        )
        .await;

        let checkout_service = Arc::new(
            CheckoutService::new(
                order_repository.command,
                order_mailer,
                notification_email,
                mbway_phone,
                registry.clone(),
            )
            .await,
        ) as DynCheckoutService;

        let contact_service =
            Arc::new(ContactService::new(contact_mailer, contact_inbox, registry).await)
                as DynContactService;

        Self {
            auth_service,
            product_service,
            order_service,
            checkout_service,
            contact_service,
        }
    }
}
