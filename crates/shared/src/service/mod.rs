mod auth;
mod checkout;
mod contact;
mod email;
mod order;
mod product;

pub use self::auth::{AuthService, AuthServiceDeps};
pub use self::checkout::CheckoutService;
pub use self::contact::ContactService;
pub use self::email::{ResendMailer, SmtpMailer};
pub use self::order::OrderService;
pub use self::product::ProductService;

use crate::errors::ServiceError;
use uuid::Uuid;

/// Malformed ids are reported the same way as missing records.
pub(crate) fn parse_id(id: &str, not_found: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(id.trim()).map_err(|_| ServiceError::NotFound(not_found.to_string()))
}
