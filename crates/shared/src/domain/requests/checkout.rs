use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::model::{BillingInfo, OrderItem};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfoRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,

    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,

    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,

    #[serde(default)]
    pub additional_notes: Option<String>,
}

impl From<&BillingInfoRequest> for BillingInfo {
    fn from(req: &BillingInfoRequest) -> Self {
        BillingInfo {
            full_name: req.full_name.clone(),
            email: req.email.trim().to_string(),
            phone: req.phone.clone(),
            address: req.address.clone(),
            city: req.city.clone(),
            postal_code: req.postal_code.clone(),
            country: req.country.clone(),
            additional_notes: req
                .additional_notes
                .clone()
                .filter(|notes| !notes.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CartProductRequest {
    #[validate(length(min = 1, message = "Product id is required"))]
    pub id: String,

    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CartItemRequest {
    #[validate(nested)]
    pub product: CartProductRequest,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,

    pub size: String,
}

impl From<&CartItemRequest> for OrderItem {
    fn from(item: &CartItemRequest) -> Self {
        OrderItem {
            product_id: item.product.id.clone(),
            name: item.product.name.clone(),
            price: item.product.price,
            image: item.product.image.clone(),
            quantity: item.quantity,
            size: item.size.clone(),
        }
    }
}

/// Checkout payload. Client-side `shipping`, `tax`, `grandTotal` and
/// `totalPrice` are accepted but never trusted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(nested)]
    pub billing_info: BillingInfoRequest,

    #[validate(length(min = 1, message = "Cart must contain at least one item"), nested)]
    pub cart_items: Vec<CartItemRequest>,

    /// Used verbatim when it is a JSON number.
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub subtotal: Option<Value>,

    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub shipping: Option<Value>,

    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub tax: Option<Value>,

    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub grand_total: Option<Value>,

    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub total_price: Option<Value>,

    #[serde(default)]
    #[schema(example = "MBWay")]
    pub payment_method: Option<String>,
}

impl CheckoutRequest {
    pub fn computed_subtotal(&self) -> f64 {
        self.cart_items
            .iter()
            .map(|item| item.product.price * f64::from(item.quantity))
            .sum()
    }

    pub fn effective_subtotal(&self) -> f64 {
        self.subtotal
            .as_ref()
            .and_then(Value::as_f64)
            .unwrap_or_else(|| self.computed_subtotal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(subtotal: Value) -> CheckoutRequest {
        serde_json::from_value(json!({
            "billingInfo": {
                "fullName": "Ana Silva",
                "email": "ana@example.pt",
                "phone": "+351900000000",
                "address": "Rua Augusta 1",
                "city": "Lisboa",
                "postalCode": "1100-048",
                "country": "Portugal"
            },
            "cartItems": [
                { "product": { "id": "p1", "name": "Oud", "price": 40.0 }, "quantity": 2, "size": "50ml" },
                { "product": { "id": "p2", "name": "Rose", "price": 15.5 }, "quantity": 1, "size": "30ml" }
            ],
            "subtotal": subtotal,
            "shipping": 7.5,
            "tax": 3.2
        }))
        .unwrap()
    }

    #[test]
    fn numeric_client_subtotal_wins() {
        assert_eq!(payload(json!(90.0)).effective_subtotal(), 90.0);
    }

    #[test]
    fn non_numeric_subtotal_is_recomputed() {
        assert_eq!(payload(json!("90")).effective_subtotal(), 95.5);
        assert_eq!(payload(Value::Null).effective_subtotal(), 95.5);
    }

    #[test]
    fn empty_cart_and_zero_quantity_fail_validation() {
        let mut req = payload(Value::Null);
        req.cart_items[0].quantity = 0;
        assert!(req.validate().is_err());

        req.cart_items.clear();
        assert!(req.validate().is_err());
    }
}
