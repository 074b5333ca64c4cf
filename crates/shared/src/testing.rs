//! In-memory repositories and a recording mailer, so services and routers
//! can be exercised without Postgres or a mail server.

use crate::{
    abstract_trait::{
        DynJwtService, DynMailer, EmailMessage, HashingTrait, MailerTrait,
        OrderCommandRepositoryTrait,
        OrderQueryRepositoryTrait, ProductCommandRepositoryTrait, ProductQueryRepositoryTrait,
        UserCommandRepositoryTrait, UserQueryRepositoryTrait,
    },
    config::{Hashing, JwtConfig},
    di::{DependenciesInject, ServiceParts},
    domain::requests::{CreateProductRequest, UpdateProductRequest},
    errors::{RepositoryError, ServiceError},
    model::{
        BillingInfo, NewOrder, NewUser, Order, OrderItem, OrderStatus, PaymentMethod, Product,
        ProductFilter, User, UserRole,
    },
    repository::{OrderRepository, ProductRepository, UserRepository},
};
use async_trait::async_trait;
use chrono::Utc;
use prometheus_client::registry::Registry;
use sqlx::types::Json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Mutex<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn insert(&self, product: Product) -> Product {
        lock(&self.products).push(product.clone());
        product
    }

    pub fn all(&self) -> Vec<Product> {
        lock(&self.products).clone()
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for InMemoryProductRepository {
    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        Ok(lock(&self.products)
            .iter()
            .rev()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, RepositoryError> {
        Ok(lock(&self.products).iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for InMemoryProductRepository {
    async fn create_product(&self, req: &CreateProductRequest) -> Result<Product, RepositoryError> {
        Ok(self.insert(req.into_product(Uuid::new_v4())))
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: &UpdateProductRequest,
    ) -> Result<Product, RepositoryError> {
        let mut products = lock(&self.products);
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;

        patch.apply_to(product);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> Result<Uuid, RepositoryError> {
        let mut products = lock(&self.products);
        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;

        Ok(products.remove(index).id)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn insert(&self, user: User) -> User {
        lock(&self.users).push(user.clone());
        user
    }

    pub fn all(&self) -> Vec<User> {
        lock(&self.users).clone()
    }
}

#[async_trait]
impl UserQueryRepositoryTrait for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users).iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users).iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl UserCommandRepositoryTrait for InMemoryUserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut users = lock(&self.users);
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::AlreadyExists("User already exists".into()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            password: user.password_hash.clone(),
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());

        Ok(created)
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn insert(&self, order: Order) -> Order {
        lock(&self.orders).push(order.clone());
        order
    }

    pub fn all(&self) -> Vec<Order> {
        lock(&self.orders).clone()
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for InMemoryOrderRepository {
    async fn find_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        Ok(lock(&self.orders)
            .iter()
            .rev()
            .filter(|order| status.is_none_or(|s| order.status() == Some(s)))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        Ok(lock(&self.orders).iter().find(|o| o.id == id).cloned())
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for InMemoryOrderRepository {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut orders = lock(&self.orders);
        if orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(RepositoryError::AlreadyExists("orders_order_number_key".into()));
        }

        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            order_number: order.order_number.clone(),
            billing_info: Json(order.billing_info.clone()),
            items: Json(order.items.clone()),
            subtotal: order.subtotal,
            shipping: order.shipping,
            tax: order.tax,
            grand_total: order.grand_total,
            payment_method: order.payment_method.as_str().to_string(),
            status: order.status.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        orders.push(created.clone());

        Ok(created)
    }

    async fn confirm_payment(&self, id: Uuid) -> Result<Order, RepositoryError> {
        let mut orders = lock(&self.orders);
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if order.status() != Some(OrderStatus::PendingPayment) {
            return Err(RepositoryError::Conflict(format!(
                "Order is '{}', not pending payment",
                order.status
            )));
        }

        order.status = OrderStatus::Placed.as_str().to_string();
        order.updated_at = Utc::now();

        Ok(order.clone())
    }
}

/// Records every message; from the `fail_from`-th send on, every send fails.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    attempts: Mutex<usize>,
    fail_from: Option<usize>,
}

impl RecordingMailer {
    pub fn failing_from(attempt: usize) -> Self {
        Self {
            fail_from: Some(attempt),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl MailerTrait for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), ServiceError> {
        let attempt = {
            let mut attempts = lock(&self.attempts);
            let current = *attempts;
            *attempts += 1;
            current
        };

        if self.fail_from.is_some_and(|from| attempt >= from) {
            return Err(ServiceError::Mail("mail server rejected the message".into()));
        }

        lock(&self.sent).push(message.clone());
        Ok(())
    }
}

pub fn sample_user(email: &str, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password: "not-a-hash".to_string(),
        name: None,
        role: role.as_str().to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_product(name: &str, category: &str) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category: category.to_string(),
        price: 50.0,
        original_price: None,
        sale_price: None,
        sale_percent: None,
        rating: 4.0,
        reviews: 3,
        image: format!("/images/{}.jpg", name.to_lowercase().replace(' ', "-")),
        images: vec![],
        description: format!("{name} eau de parfum"),
        notes_top: vec!["bergamot".to_string()],
        notes_middle: vec!["rose".to_string()],
        notes_base: vec!["musk".to_string()],
        size: vec!["50ml".to_string(), "100ml".to_string()],
        in_stock: true,
        is_new: false,
        is_sale: false,
        badge: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_order(order_number: &str, payment_method: PaymentMethod) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4(),
        order_number: order_number.to_string(),
        billing_info: Json(BillingInfo {
            full_name: "Ana Silva".to_string(),
            email: "ana@example.pt".to_string(),
            phone: "+351900000000".to_string(),
            address: "Rua Augusta 1".to_string(),
            city: "Lisboa".to_string(),
            postal_code: "1100-048".to_string(),
            country: "Portugal".to_string(),
            additional_notes: None,
        }),
        items: Json(vec![OrderItem {
            product_id: "p1".to_string(),
            name: "Oud Noir".to_string(),
            price: 45.0,
            image: None,
            quantity: 1,
            size: "50ml".to_string(),
        }]),
        subtotal: 45.0,
        shipping: 0.0,
        tax: 0.0,
        grand_total: 45.0,
        payment_method: payment_method.as_str().to_string(),
        status: payment_method.initial_status().as_str().to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// A fully wired service graph over in-memory stores.
pub struct TestContext {
    pub deps: DependenciesInject,
    pub products: Arc<InMemoryProductRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub orders: Arc<InMemoryOrderRepository>,
    pub order_mailer: Arc<RecordingMailer>,
    pub contact_mailer: Option<Arc<RecordingMailer>>,
    pub jwt: DynJwtService,
    pub registry: Arc<tokio::sync::Mutex<Registry>>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::build(Some(Arc::new(RecordingMailer::default())), RecordingMailer::default()).await
    }

    pub async fn without_contact_api() -> Self {
        Self::build(None, RecordingMailer::default()).await
    }

    pub async fn with_order_mailer(order_mailer: RecordingMailer) -> Self {
        Self::build(Some(Arc::new(RecordingMailer::default())), order_mailer).await
    }

    async fn build(contact_mailer: Option<Arc<RecordingMailer>>, order_mailer: RecordingMailer) -> Self {
        let products = Arc::new(InMemoryProductRepository::default());
        let users = Arc::new(InMemoryUserRepository::default());
        let orders = Arc::new(InMemoryOrderRepository::default());
        let order_mailer = Arc::new(order_mailer);
        let jwt: DynJwtService = Arc::new(JwtConfig::new(TEST_JWT_SECRET, 60));
        let registry = Arc::new(tokio::sync::Mutex::new(Registry::default()));

        let deps = DependenciesInject::from_parts(ServiceParts {
            product_repository: ProductRepository {
                query: products.clone(),
                command: products.clone(),
            },
            user_repository: UserRepository {
                query: users.clone(),
                command: users.clone(),
            },
            order_repository: OrderRepository {
                query: orders.clone(),
                command: orders.clone(),
            },
            hash: Arc::new(Hashing::new(4)),
            jwt_config: jwt.clone(),
            order_mailer: order_mailer.clone(),
            contact_mailer: contact_mailer.clone().map(|m| m as DynMailer),
            notification_email: "orders@alsa.pt".to_string(),
            mbway_phone: Some("+351 912 345 678".to_string()),
            contact_inbox: "hello@alsa.pt".to_string(),
            registry: registry.clone(),
        })
        .await;

        Self {
            deps,
            products,
            users,
            orders,
            order_mailer,
            contact_mailer,
            jwt,
            registry,
        }
    }

    /// Stores a user with a real bcrypt hash of `password`.
    pub async fn seed_user(&self, email: &str, password: &str, role: UserRole) -> User {
        let mut user = sample_user(email, role);
        user.password = Hashing::new(4)
            .hash_password(password)
            .await
            .unwrap_or_default();
        self.users.insert(user)
    }

    /// Seeds a user of `role` and returns a bearer token for it.
    pub async fn token_for(&self, role: UserRole) -> String {
        let user = self.users.insert(sample_user(
            &format!("{}-{}@alsa.pt", role.as_str(), Uuid::new_v4().simple()),
            role,
        ));

        self.jwt.generate_token(&user).unwrap_or_default()
    }
}
