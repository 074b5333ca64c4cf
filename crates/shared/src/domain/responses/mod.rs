mod api;
mod auth;
mod checkout;
mod contact;
mod order;
mod product;

pub use self::api::ApiResponse;
pub use self::auth::{LoginResponse, UserEnvelope, UserResponse};
pub use self::checkout::{CheckoutErrorResponse, CheckoutResponse};
pub use self::contact::{ContactFallbackResponse, ContactResponse};
pub use self::order::OrderResponse;
pub use self::product::{DeleteProductResponse, NotesResponse, ProductResponse};
