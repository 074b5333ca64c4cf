mod auth;
mod checkout;
pub mod coerce;
mod contact;
mod order;
mod product;

pub use self::auth::{LoginRequest, RegisterRequest, normalize_email};
pub use self::checkout::{BillingInfoRequest, CartItemRequest, CartProductRequest, CheckoutRequest};
pub use self::contact::ContactRequest;
pub use self::order::FindAllOrders;
pub use self::product::{
    CreateProductRequest, FindAllProducts, NotesPatch, NotesRequest, UpdateProductRequest,
};
