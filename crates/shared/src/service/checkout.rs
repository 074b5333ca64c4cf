use crate::{
    abstract_trait::{
        CheckoutServiceTrait, DynMailer, DynOrderCommandRepository, EmailMessage,
    },
    domain::{requests::CheckoutRequest, responses::CheckoutResponse},
    errors::ServiceError,
    model::{BillingInfo, NewOrder, Order, OrderItem, PaymentMethod},
    utils::{
        Method, OrderEmail, ServiceTelemetry, format_euro, generate_order_number,
        render_admin_order_email, render_customer_order_email,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Persists the order, then mails the customer and the shop, in that order.
pub struct CheckoutService {
    orders: DynOrderCommandRepository,
    mailer: DynMailer,
    notification_email: String,
    mbway_phone: Option<String>,
    telemetry: ServiceTelemetry,
}

impl CheckoutService {
    pub async fn new(
        orders: DynOrderCommandRepository,
        mailer: DynMailer,
        notification_email: String,
        mbway_phone: Option<String>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let telemetry = ServiceTelemetry::new("checkout_service", registry).await;

        Self {
            orders,
            mailer,
            notification_email,
            mbway_phone,
            telemetry,
        }
    }

    fn new_order(
        req: &CheckoutRequest,
        payment_method: PaymentMethod,
    ) -> Result<NewOrder, ServiceError> {
        let subtotal = req.effective_subtotal();
        let order_number = generate_order_number(Utc::now())
            .map_err(|e| ServiceError::Internal(format!("order number generation failed: {e}")))?;

        Ok(NewOrder {
            order_number,
            billing_info: BillingInfo::from(&req.billing_info),
            items: req.cart_items.iter().map(OrderItem::from).collect(),
            subtotal,
            shipping: 0.0,
            tax: 0.0,
            grand_total: subtotal,
            payment_method,
            status: payment_method.initial_status(),
        })
    }

    fn customer_subject(order: &Order, payment_method: PaymentMethod) -> String {
        match payment_method {
            PaymentMethod::MbWay => format!(
                "Order Received - Payment Pending (Order {})",
                order.order_number
            ),
            PaymentMethod::Card => {
                "Order Confirmation - Your order will be delivered in 5-7 days".to_string()
            }
        }
    }

    async fn notify(&self, order: &Order, payment_method: PaymentMethod) -> Result<(), ServiceError> {
        let data = OrderEmail::new(order, payment_method, self.mbway_phone.as_deref());
        let customer_html = render_customer_order_email(&data)?;
        let admin_html = render_admin_order_email(&data)?;

        let billing = &order.billing_info.0;

        self.mailer
            .send(&EmailMessage {
                to: billing.email.clone(),
                subject: Self::customer_subject(order, payment_method),
                html: customer_html,
                reply_to: None,
            })
            .await?;

        self.mailer
            .send(&EmailMessage {
                to: self.notification_email.clone(),
                subject: format!(
                    "New Order from {} - {}",
                    billing.full_name,
                    format_euro(order.grand_total)
                ),
                html: admin_html,
                reply_to: Some(billing.email.clone()),
            })
            .await
    }

    async fn process(&self, req: &CheckoutRequest) -> Result<CheckoutResponse, ServiceError> {
        let payment_method = PaymentMethod::from_client(req.payment_method.as_deref());
        let new_order = Self::new_order(req, payment_method)?;
        let order = self.orders.create_order(&new_order).await?;

        info!(
            "🧾 Order {} stored ({} items, {}, {})",
            order.order_number,
            order.items.0.len(),
            format_euro(order.grand_total),
            order.status
        );

        self.notify(&order, payment_method).await?;

        let is_mbway_pending = payment_method == PaymentMethod::MbWay;

        Ok(CheckoutResponse {
            success: true,
            message: if is_mbway_pending {
                "Order received, pending payment confirmation".to_string()
            } else {
                "Order placed successfully".to_string()
            },
            order_id: order.id.to_string(),
            order_number: order.order_number,
            status: order.status,
            is_mbway_pending,
        })
    }
}

#[async_trait]
impl CheckoutServiceTrait for CheckoutService {
    async fn checkout(&self, req: &CheckoutRequest) -> Result<CheckoutResponse, ServiceError> {
        info!(
            "🛒 Checkout for {} with {} cart items",
            req.billing_info.email,
            req.cart_items.len()
        );

        let tracing_ctx = self.telemetry.start_tracing(
            "checkout",
            vec![
                KeyValue::new("component", "checkout"),
                KeyValue::new("checkout.items", req.cart_items.len() as i64),
                KeyValue::new(
                    "checkout.payment_method",
                    PaymentMethod::from_client(req.payment_method.as_deref()).as_str(),
                ),
            ],
        );

        match self.process(req).await {
            Ok(response) => {
                self.telemetry.complete_tracing_success(
                    &tracing_ctx,
                    Method::Post,
                    "Order processed successfully",
                );
                Ok(response)
            }
            Err(err) => {
                error!("❌ Checkout failed: {err}");
                self.telemetry.complete_tracing_error(
                    &tracing_ctx,
                    Method::Post,
                    "Failed to process order",
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::OrderStatus,
        testing::{InMemoryOrderRepository, RecordingMailer},
    };
    use serde_json::json;

    fn request(payment_method: Option<&str>) -> CheckoutRequest {
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
                { "product": { "id": "p1", "name": "Oud Noir", "price": 45.0 }, "quantity": 2, "size": "50ml" }
            ],
            "shipping": 9.99,
            "tax": 4.2,
            "grandTotal": 104.19,
            "paymentMethod": payment_method
        }))
        .unwrap()
    }

    async fn service(
        orders: Arc<InMemoryOrderRepository>,
        mailer: Arc<RecordingMailer>,
    ) -> CheckoutService {
        CheckoutService::new(
            orders,
            mailer,
            "orders@alsa.pt".into(),
            Some("+351 912 345 678".into()),
            Arc::new(Mutex::new(Registry::default())),
        )
        .await
    }

    #[tokio::test]
    async fn card_checkout_ignores_client_charges_and_mails_customer_first() {
        let orders = Arc::new(InMemoryOrderRepository::default());
        let mailer = Arc::new(RecordingMailer::default());

        let response = service(orders.clone(), mailer.clone())
            .await
            .checkout(&request(Some("Card")))
            .await
            .unwrap();

        assert!(response.success);
        assert!(!response.is_mbway_pending);
        assert_eq!(response.message, "Order placed successfully");
        assert_eq!(response.status, "placed");

        let stored = orders.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].subtotal, 90.0);
        assert_eq!(stored[0].shipping, 0.0);
        assert_eq!(stored[0].tax, 0.0);
        assert_eq!(stored[0].grand_total, 90.0);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "ana@example.pt");
        assert_eq!(
            sent[0].subject,
            "Order Confirmation - Your order will be delivered in 5-7 days"
        );
        assert_eq!(sent[1].to, "orders@alsa.pt");
        assert_eq!(sent[1].subject, "New Order from Ana Silva - €90.00");
        assert_eq!(sent[1].reply_to.as_deref(), Some("ana@example.pt"));
    }

    #[test]
    fn new_order_gets_dated_number_and_zero_charges() {
        let order = CheckoutService::new_order(&request(Some("MBWay")), PaymentMethod::MbWay).unwrap();

        let today = Utc::now().format("%Y%m%d").to_string();
        let suffix = order
            .order_number
            .strip_prefix(&format!("ORD-{today}-"))
            .unwrap();
        assert_eq!(suffix.len(), 6);
        assert_eq!(order.subtotal, 90.0);
        assert_eq!(order.grand_total, 90.0);
        assert_eq!(order.shipping, 0.0);
        assert_eq!(order.tax, 0.0);
        assert_eq!(order.status, OrderStatus::PendingPayment);
    }

    #[tokio::test]
    async fn stored_order_number_is_echoed_to_client() {
        let orders = Arc::new(InMemoryOrderRepository::default());
        let mailer = Arc::new(RecordingMailer::default());

        let response = service(orders.clone(), mailer)
            .await
            .checkout(&request(None))
            .await
            .unwrap();

        let stored = orders.all();
        assert_eq!(stored[0].order_number, response.order_number);
        assert_eq!(stored[0].id.to_string(), response.order_id);
        assert!(response.order_number.starts_with("ORD-"));
    }

    #[tokio::test]
    async fn mbway_checkout_stays_pending() {
        let orders = Arc::new(InMemoryOrderRepository::default());
        let mailer = Arc::new(RecordingMailer::default());

        let response = service(orders.clone(), mailer.clone())
            .await
            .checkout(&request(Some("MBWay")))
            .await
            .unwrap();

        assert!(response.is_mbway_pending);
        assert_eq!(response.message, "Order received, pending payment confirmation");
        assert_eq!(orders.all()[0].status(), Some(OrderStatus::PendingPayment));

        let sent = mailer.sent();
        assert_eq!(
            sent[0].subject,
            format!("Order Received - Payment Pending (Order {})", response.order_number)
        );
        assert!(sent[0].html.contains("+351 912 345 678"));
    }

    #[tokio::test]
    async fn failed_admin_mail_fails_checkout_but_keeps_order() {
        let orders = Arc::new(InMemoryOrderRepository::default());
        let mailer = Arc::new(RecordingMailer::failing_from(1));

        let result = service(orders.clone(), mailer.clone())
            .await
            .checkout(&request(None))
            .await;

        assert!(matches!(result, Err(ServiceError::Mail(_))));
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(orders.all().len(), 1);
    }
}
