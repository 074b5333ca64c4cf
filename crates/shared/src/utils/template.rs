use askama::{Error, Template};
use chrono::Utc;
use tracing::{error, info};

use crate::model::{Order, PaymentMethod};

pub fn format_euro(amount: f64) -> String {
    format!("€{amount:.2}")
}

#[derive(Debug, Clone)]
pub struct OrderEmailLine {
    pub name: String,
    pub size: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Display-ready data shared by the customer and admin order emails.
#[derive(Debug, Clone)]
pub struct OrderEmail {
    pub order_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub notes: String,
    pub lines: Vec<OrderEmailLine>,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub grand_total: String,
    pub payment_method: String,
    pub is_mbway_pending: bool,
    pub mbway_phone: String,
    pub received_at: String,
}

impl OrderEmail {
    pub fn new(order: &Order, payment_method: PaymentMethod, mbway_phone: Option<&str>) -> Self {
        let billing = &order.billing_info.0;

        let lines = order
            .items
            .0
            .iter()
            .map(|item| OrderEmailLine {
                name: item.name.clone(),
                size: item.size.clone(),
                quantity: item.quantity,
                unit_price: format_euro(item.price),
                line_total: format_euro(item.line_total()),
            })
            .collect();

        Self {
            order_number: order.order_number.clone(),
            full_name: billing.full_name.clone(),
            email: billing.email.clone(),
            phone: billing.phone.clone(),
            address: billing.address.clone(),
            city: billing.city.clone(),
            postal_code: billing.postal_code.clone(),
            country: billing.country.clone(),
            notes: billing.additional_notes.clone().unwrap_or_default(),
            lines,
            subtotal: format_euro(order.subtotal),
            shipping: format_euro(order.shipping),
            tax: format_euro(order.tax),
            grand_total: format_euro(order.grand_total),
            payment_method: payment_method.as_str().to_string(),
            is_mbway_pending: payment_method == PaymentMethod::MbWay,
            mbway_phone: mbway_phone.unwrap_or_default().to_string(),
            received_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "order_customer.html")]
struct CustomerOrderTemplate<'a> {
    order: &'a OrderEmail,
}

#[derive(Template)]
#[template(path = "order_admin.html")]
struct AdminOrderTemplate<'a> {
    order: &'a OrderEmail,
}

#[derive(Template, Debug)]
#[template(path = "contact.html")]
pub struct ContactEmailTemplate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
    pub submitted_at: String,
}

fn render_logged<T: Template>(kind: &str, template: &T) -> Result<String, Error> {
    info!("📧 Rendering {kind} email template");

    match template.render() {
        Ok(result) => {
            info!("✅ Successfully rendered {kind} email template.");
            Ok(result)
        }
        Err(e) => {
            error!("❌ Failed to render {kind} email template: {}", e);
            Err(e)
        }
    }
}

pub fn render_customer_order_email(order: &OrderEmail) -> Result<String, Error> {
    render_logged("customer order", &CustomerOrderTemplate { order })
}

pub fn render_admin_order_email(order: &OrderEmail) -> Result<String, Error> {
    render_logged("admin order", &AdminOrderTemplate { order })
}

pub fn render_contact_email(template: &ContactEmailTemplate<'_>) -> Result<String, Error> {
    render_logged("contact", template)
}
