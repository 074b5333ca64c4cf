use crate::{
    abstract_trait::ProductQueryRepositoryTrait,
    config::ConnectionPool,
    errors::RepositoryError,
    model::{Product as ProductModel, ProductFilter},
};
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use tracing::{error, info};
use uuid::Uuid;

pub(super) const PRODUCT_COLUMNS: &str = "id, name, category, price, original_price, sale_price, \
    sale_percent, rating, reviews, image, images, description, notes_top, notes_middle, \
    notes_base, size, in_stock, is_new, is_sale, badge, created_at, updated_at";

pub struct ProductQueryRepository {
    db: ConnectionPool,
}

impl ProductQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for ProductQueryRepository {
    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<ProductModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

        if let Some(category) = &filter.category {
            builder.push(" AND category = ").push_bind(category);
        }
        if filter.on_sale {
            builder.push(" AND is_sale = TRUE");
        }
        if filter.is_new {
            builder.push(" AND is_new = TRUE");
        }
        builder.push(" ORDER BY created_at DESC");

        let products = builder
            .build_query_as::<ProductModel>()
            .fetch_all(&mut *conn)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch products with {:?}: {:?}", filter, err);
                RepositoryError::from(err)
            })?;

        info!("✅ Found {} products", products.len());
        Ok(products)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let product = sqlx::query_as::<_, ProductModel>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch product ID {}: {:?}", id, err);
            RepositoryError::from(err)
        })?;

        Ok(product)
    }
}
