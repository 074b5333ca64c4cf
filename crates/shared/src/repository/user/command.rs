use crate::{
    abstract_trait::UserCommandRepositoryTrait,
    config::ConnectionPool,
    errors::RepositoryError,
    model::{NewUser, User as UserModel},
};
use async_trait::async_trait;
use tracing::{error, info};

pub struct UserCommandRepository {
    db: ConnectionPool,
}

impl UserCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserCommandRepositoryTrait for UserCommandRepository {
    async fn create_user(&self, req: &NewUser) -> Result<UserModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let user = sqlx::query_as::<_, UserModel>(
            r#"
            INSERT INTO users (email, password, name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            RETURNING id, email, password, name, role, created_at, updated_at
            "#,
        )
        .bind(&req.email)
        .bind(&req.password_hash)
        .bind(&req.name)
        .bind(req.role.as_str())
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| match RepositoryError::from(err) {
            RepositoryError::AlreadyExists(_) => {
                RepositoryError::AlreadyExists("User already exists".into())
            }
            other => {
                error!("❌ Failed to create user {}: {:?}", req.email, other);
                other
            }
        })?;

        info!("✅ Created user ID {} with role {}", user.id, user.role);
        Ok(user)
    }
}
