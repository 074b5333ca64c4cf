mod order;
mod product;
mod user;

pub use self::order::{
    BillingInfo, NewOrder, Order, OrderItem, OrderStatus, PaymentMethod,
};
pub use self::product::{Product, ProductFilter};
pub use self::user::{Identity, NewUser, User, UserRole};
