use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::coerce;
use crate::model::{Product, ProductFilter};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FindAllProducts {
    /// Exact category match.
    #[serde(default)]
    pub category: Option<String>,

    /// Only `true` filters; any other value is ignored.
    #[serde(default)]
    pub on_sale: Option<String>,

    /// Only `true` filters; any other value is ignored.
    #[serde(default)]
    pub is_new: Option<String>,
}

impl FindAllProducts {
    pub fn to_filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.clone().filter(|c| !c.is_empty()),
            on_sale: self.on_sale.as_deref() == Some("true"),
            is_new: self.is_new.as_deref() == Some("true"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NotesRequest {
    #[serde(default)]
    pub top: Option<Vec<String>>,
    #[serde(default)]
    pub middle: Option<Vec<String>>,
    #[serde(default)]
    pub base: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,

    #[serde(deserialize_with = "coerce::number")]
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    #[schema(example = 89.9)]
    pub price: f64,

    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub original_price: Option<f64>,

    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub sale_price: Option<f64>,

    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub sale_percent: Option<f64>,

    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub rating: Option<f64>,

    #[serde(default, deserialize_with = "coerce::optional_count")]
    pub reviews: Option<i32>,

    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,

    #[serde(default)]
    pub images: Option<Vec<String>>,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    pub notes: Option<NotesRequest>,

    #[serde(default)]
    pub size: Option<Vec<String>>,

    #[serde(default)]
    pub in_stock: Option<bool>,

    #[serde(default)]
    pub is_new: Option<bool>,

    #[serde(default)]
    pub is_sale: Option<bool>,

    #[serde(default, deserialize_with = "coerce::optional_string")]
    pub badge: Option<String>,
}

impl CreateProductRequest {
    /// Builds the record to insert, applying catalog defaults.
    pub fn into_product(&self, id: uuid::Uuid) -> Product {
        let now = Utc::now();
        let notes = self.notes.clone().unwrap_or_default();

        Product {
            id,
            name: self.name.clone(),
            category: self.category.clone(),
            price: self.price,
            original_price: self.original_price,
            sale_price: self.sale_price,
            sale_percent: self.sale_percent,
            rating: self.rating.unwrap_or(0.0),
            reviews: self.reviews.unwrap_or(0),
            image: self.image.clone(),
            images: self.images.clone().unwrap_or_default(),
            description: self.description.clone(),
            notes_top: notes.top.unwrap_or_default(),
            notes_middle: notes.middle.unwrap_or_default(),
            notes_base: notes.base.unwrap_or_default(),
            size: self.size.clone().unwrap_or_default(),
            in_stock: self.in_stock.unwrap_or(true),
            is_new: self.is_new.unwrap_or(false),
            is_sale: self.is_sale.unwrap_or(false),
            badge: self.badge.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NotesPatch {
    #[serde(default, deserialize_with = "coerce::nullable_list")]
    pub top: Option<Vec<String>>,
    #[serde(default, deserialize_with = "coerce::nullable_list")]
    pub middle: Option<Vec<String>>,
    #[serde(default, deserialize_with = "coerce::nullable_list")]
    pub base: Option<Vec<String>>,
}

/// Partial update: absent fields are left alone, nullable fields sent as
/// `null` or `""` are cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Category must not be empty"))]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "coerce::optional_number")]
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,

    #[serde(default, deserialize_with = "coerce::nullable_number")]
    #[schema(value_type = Option<f64>)]
    pub original_price: Option<Option<f64>>,

    #[serde(default, deserialize_with = "coerce::nullable_number")]
    #[schema(value_type = Option<f64>)]
    pub sale_price: Option<Option<f64>>,

    #[serde(default, deserialize_with = "coerce::nullable_number")]
    #[schema(value_type = Option<f64>)]
    pub sale_percent: Option<Option<f64>>,

    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub rating: Option<f64>,

    #[serde(default, deserialize_with = "coerce::optional_count")]
    pub reviews: Option<i32>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "coerce::nullable_list")]
    pub images: Option<Vec<String>>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub notes: Option<NotesPatch>,

    #[serde(default, deserialize_with = "coerce::nullable_list")]
    pub size: Option<Vec<String>>,

    #[serde(default)]
    pub in_stock: Option<bool>,

    #[serde(default)]
    pub is_new: Option<bool>,

    #[serde(default)]
    pub is_sale: Option<bool>,

    #[serde(default, deserialize_with = "coerce::nullable_string")]
    #[schema(value_type = Option<String>)]
    pub badge: Option<Option<String>>,
}

impl UpdateProductRequest {
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(original_price) = self.original_price {
            product.original_price = original_price;
        }
        if let Some(sale_price) = self.sale_price {
            product.sale_price = sale_price;
        }
        if let Some(sale_percent) = self.sale_percent {
            product.sale_percent = sale_percent;
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
        if let Some(reviews) = self.reviews {
            product.reviews = reviews;
        }
        if let Some(image) = &self.image {
            product.image = image.clone();
        }
        if let Some(images) = &self.images {
            product.images = images.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(notes) = &self.notes {
            if let Some(top) = &notes.top {
                product.notes_top = top.clone();
            }
            if let Some(middle) = &notes.middle {
                product.notes_middle = middle.clone();
            }
            if let Some(base) = &notes.base {
                product.notes_base = base.clone();
            }
        }
        if let Some(size) = &self.size {
            product.size = size.clone();
        }
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
        if let Some(is_new) = self.is_new {
            product.is_new = is_new;
        }
        if let Some(is_sale) = self.is_sale {
            product.is_sale = is_sale;
        }
        if let Some(badge) = &self.badge {
            product.badge = badge.clone();
        }

        product.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn create_request() -> CreateProductRequest {
        serde_json::from_value(json!({
            "name": "Rose Musk",
            "category": "women",
            "price": "120",
            "salePrice": "",
            "image": "/rose.jpg",
            "description": "Powdery rose",
            "notes": { "top": ["rose"] },
            "badge": ""
        }))
        .unwrap()
    }

    #[test]
    fn create_applies_catalog_defaults() {
        let product = create_request().into_product(Uuid::new_v4());

        assert_eq!(product.price, 120.0);
        assert_eq!(product.sale_price, None);
        assert_eq!(product.rating, 0.0);
        assert_eq!(product.reviews, 0);
        assert!(product.in_stock);
        assert!(!product.is_new);
        assert!(!product.is_sale);
        assert_eq!(product.notes_top, vec!["rose".to_string()]);
        assert!(product.notes_base.is_empty());
        assert!(product.images.is_empty());
        assert_eq!(product.badge, None);
    }

    #[test]
    fn update_touches_only_present_fields() {
        let mut product = create_request().into_product(Uuid::new_v4());
        let patch: UpdateProductRequest = serde_json::from_value(json!({ "price": 99.5 })).unwrap();

        patch.apply_to(&mut product);

        assert_eq!(product.price, 99.5);
        assert_eq!(product.description, "Powdery rose");
        assert_eq!(product.notes_top, vec!["rose".to_string()]);
    }

    #[test]
    fn update_clears_nullable_fields() {
        let mut product = create_request().into_product(Uuid::new_v4());
        product.original_price = Some(150.0);
        product.badge = Some("Hot".into());
        product.size = vec!["50ml".into()];

        let patch: UpdateProductRequest = serde_json::from_value(json!({
            "originalPrice": null,
            "badge": "",
            "size": null,
            "notes": { "middle": ["iris"] }
        }))
        .unwrap();
        patch.apply_to(&mut product);

        assert_eq!(product.original_price, None);
        assert_eq!(product.badge, None);
        assert!(product.size.is_empty());
        assert_eq!(product.notes_top, vec!["rose".to_string()]);
        assert_eq!(product.notes_middle, vec!["iris".to_string()]);
    }

    #[test]
    fn only_literal_true_enables_flags() {
        let query = FindAllProducts {
            category: Some("men".into()),
            on_sale: Some("yes".into()),
            is_new: Some("true".into()),
        };
        let filter = query.to_filter();

        assert_eq!(filter.category.as_deref(), Some("men"));
        assert!(!filter.on_sale);
        assert!(filter.is_new);
    }
}
