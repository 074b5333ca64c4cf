use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub original_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub sale_percent: Option<f64>,
    pub rating: f64,
    pub reviews: i32,
    pub image: String,
    pub images: Vec<String>,
    pub description: String,
    pub notes_top: Vec<String>,
    pub notes_middle: Vec<String>,
    pub notes_base: Vec<String>,
    pub size: Vec<String>,
    pub in_stock: bool,
    pub is_new: bool,
    pub is_sale: bool,
    pub badge: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price a customer pays: the sale price while a sale is running, the list price otherwise.
    pub fn effective_price(&self) -> f64 {
        match self.sale_price {
            Some(sale) if self.is_sale && sale > 0.0 => sale,
            _ => self.price,
        }
    }

    pub fn original_price_or_list(&self) -> f64 {
        match self.original_price {
            Some(original) if original > 0.0 => original,
            _ => self.price,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub on_sale: bool,
    pub is_new: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }

        (!self.on_sale || product.is_sale) && (!self.is_new || product.is_new)
    }
}
