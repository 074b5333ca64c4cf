use super::query::PRODUCT_COLUMNS;
use crate::{
    abstract_trait::ProductCommandRepositoryTrait,
    config::ConnectionPool,
    domain::requests::{CreateProductRequest, UpdateProductRequest},
    errors::RepositoryError,
    model::Product as ProductModel,
};
use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

pub struct ProductCommandRepository {
    db: ConnectionPool,
}

impl ProductCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for ProductCommandRepository {
    async fn create_product(
        &self,
        product: &CreateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;
        let record = product.into_product(Uuid::new_v4());

        let result = sqlx::query_as::<_, ProductModel>(&format!(
            r#"
            INSERT INTO products (
                id, name, category, price, original_price, sale_price, sale_percent,
                rating, reviews, image, images, description, notes_top, notes_middle,
                notes_base, size, in_stock, is_new, is_sale, badge, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, current_timestamp, current_timestamp
            )
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.category)
        .bind(record.price)
        .bind(record.original_price)
        .bind(record.sale_price)
        .bind(record.sale_percent)
        .bind(record.rating)
        .bind(record.reviews)
        .bind(&record.image)
        .bind(&record.images)
        .bind(&record.description)
        .bind(&record.notes_top)
        .bind(&record.notes_middle)
        .bind(&record.notes_base)
        .bind(&record.size)
        .bind(record.in_stock)
        .bind(record.is_new)
        .bind(record.is_sale)
        .bind(&record.badge)
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to create product {}: {:?}", product.name, err);
            RepositoryError::from(err)
        })?;

        info!("✅ Created product ID {} ({})", result.id, result.name);
        Ok(result)
    }

    async fn update_product(
        &self,
        id: Uuid,
        patch: &UpdateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let mut product = sqlx::query_as::<_, ProductModel>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to lock product ID {}: {:?}", id, err);
            RepositoryError::from(err)
        })?
        .ok_or(RepositoryError::NotFound)?;

        patch.apply_to(&mut product);

        let result = sqlx::query_as::<_, ProductModel>(&format!(
            r#"
            UPDATE products
            SET name = $2,
                category = $3,
                price = $4,
                original_price = $5,
                sale_price = $6,
                sale_percent = $7,
                rating = $8,
                reviews = $9,
                image = $10,
                images = $11,
                description = $12,
                notes_top = $13,
                notes_middle = $14,
                notes_base = $15,
                size = $16,
                in_stock = $17,
                is_new = $18,
                is_sale = $19,
                badge = $20,
                updated_at = current_timestamp
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.sale_price)
        .bind(product.sale_percent)
        .bind(product.rating)
        .bind(product.reviews)
        .bind(&product.image)
        .bind(&product.images)
        .bind(&product.description)
        .bind(&product.notes_top)
        .bind(&product.notes_middle)
        .bind(&product.notes_base)
        .bind(&product.size)
        .bind(product.in_stock)
        .bind(product.is_new)
        .bind(product.is_sale)
        .bind(&product.badge)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to update product ID {}: {:?}", id, err);
            RepositoryError::from(err)
        })?;

        tx.commit().await.map_err(RepositoryError::from)?;

        info!("🔄 Updated product ID {}", result.id);
        Ok(result)
    }

    async fn delete_product(&self, id: Uuid) -> Result<Uuid, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let deleted = sqlx::query_scalar::<_, Uuid>("DELETE FROM products WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|err| {
                error!("❌ Failed to delete product ID {}: {:?}", id, err);
                RepositoryError::from(err)
            })?
            .ok_or(RepositoryError::NotFound)?;

        info!("🗑️ Deleted product ID {}", deleted);
        Ok(deleted)
    }
}
