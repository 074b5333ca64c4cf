use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotesResponse {
    pub top: Vec<String>,
    pub middle: Vec<String>,
    pub base: Vec<String>,
}

/// Storefront view of a product. `price` is already the effective price.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub original_price: f64,
    pub sale_price: Option<f64>,
    pub sale_percent: Option<f64>,
    pub rating: f64,
    pub reviews: i32,
    pub image: String,
    pub images: Vec<String>,
    pub description: String,
    pub notes: NotesResponse,
    pub size: Vec<String>,
    pub in_stock: bool,
    pub is_new: bool,
    pub is_sale: bool,
    pub badge: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(value: Product) -> Self {
        let price = value.effective_price();
        let original_price = value.original_price_or_list();

        ProductResponse {
            id: value.id.to_string(),
            name: value.name,
            category: value.category,
            price,
            original_price,
            sale_price: value.sale_price,
            sale_percent: value.sale_percent,
            rating: value.rating,
            reviews: value.reviews,
            image: value.image,
            images: value.images,
            description: value.description,
            notes: NotesResponse {
                top: value.notes_top,
                middle: value.notes_middle,
                base: value.notes_base,
            },
            size: value.size,
            in_stock: value.in_stock,
            is_new: value.is_new,
            is_sale: value.is_sale,
            badge: value.badge,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteProductResponse {
    pub message: String,
    pub id: String,
}
