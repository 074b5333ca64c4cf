use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{Value, json};
use shared::{
    model::{PaymentMethod, UserRole},
    testing::{RecordingMailer, TestContext, sample_order, sample_product},
};
use storefront::{handler::AppRouter, state::AppState};
use tower::ServiceExt;
use uuid::Uuid;

fn app(ctx: &TestContext) -> Router {
    AppRouter::build(AppState::from_parts(ctx.deps.clone(), ctx.registry.clone()))
}

fn request(method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

fn checkout_payload(payment_method: Option<&str>) -> Value {
    json!({
        "billingInfo": {
            "fullName": "Ana Silva",
            "email": "ana@example.pt",
            "phone": "+351900000000",
            "address": "Rua Augusta 1",
            "city": "Lisboa",
            "postalCode": "1100-048",
            "country": "Portugal",
            "additionalNotes": "Ring twice"
        },
        "cartItems": [
            { "product": { "id": "p1", "name": "Oud Noir", "price": 45.0 }, "quantity": 2, "size": "50ml" },
            { "product": { "id": "p2", "name": "Rose Veil", "price": 30.0 }, "quantity": 1, "size": "30ml" }
        ],
        "shipping": 5.99,
        "tax": 27.6,
        "grandTotal": 153.59,
        "paymentMethod": payment_method
    })
}

mod auth_endpoints {
    use super::*;

    #[tokio::test]
    async fn register_defaults_to_client_and_rejects_case_folded_duplicate() {
        let ctx = TestContext::new().await;

        let (status, body) = send(
            app(&ctx),
            request(
                "POST",
                "/api/auth/register",
                Some(json!({ "email": "  Ana@Example.PT", "password": "secret1", "name": "Ana" })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["email"], "ana@example.pt");
        assert_eq!(body["user"]["role"], "client");
        assert!(body["user"].get("password").is_none());

        let (status, body) = send(
            app(&ctx),
            request(
                "POST",
                "/api/auth/register",
                Some(json!({ "email": "ana@example.pt", "password": "another1" })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "User already exists");
    }

    #[rstest]
    #[case(json!({ "email": "not-an-email", "password": "secret1" }))]
    #[case(json!({ "email": "ana@example.pt", "password": "123" }))]
    #[case(json!({ "password": "secret1" }))]
    #[tokio::test]
    async fn register_rejects_invalid_input(#[case] payload: Value) {
        let ctx = TestContext::new().await;

        let (status, _) = send(
            app(&ctx),
            request("POST", "/api/auth/register", Some(payload), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_signup_needs_admin_token() {
        let ctx = TestContext::new().await;
        let payload = json!({ "email": "boss@alsa.pt", "password": "secret1", "role": "admin" });

        let (status, _) = send(
            app(&ctx),
            request("POST", "/api/auth/register", Some(payload.clone()), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let client = ctx.token_for(UserRole::Client).await;
        let (status, _) = send(
            app(&ctx),
            request("POST", "/api/auth/register", Some(payload.clone()), Some(&client)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = ctx.token_for(UserRole::Admin).await;
        let (status, body) = send(
            app(&ctx),
            request("POST", "/api/auth/register", Some(payload), Some(&admin)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn login_issues_verifiable_token_and_cookie() {
        let ctx = TestContext::new().await;
        ctx.seed_user("ana@example.pt", "secret1", UserRole::Client)
            .await;

        let response = app(&ctx)
            .oneshot(request(
                "POST",
                "/api/auth/login",
                Some(json!({ "email": "ANA@example.pt", "password": "secret1" })),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let identity = ctx.jwt.verify_token(body["token"].as_str().unwrap()).unwrap();
        assert_eq!(identity.email, "ana@example.pt");
        assert_eq!(body["user"]["id"], identity.user_id.to_string());
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let ctx = TestContext::new().await;
        ctx.seed_user("ana@example.pt", "secret1", UserRole::Client)
            .await;

        let (status, body) = send(
            app(&ctx),
            request(
                "POST",
                "/api/auth/login",
                Some(json!({ "email": "ana@example.pt", "password": "wrong-one" })),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn me_needs_token_and_reads_from_cookie() {
        let ctx = TestContext::new().await;

        let (status, _) = send(app(&ctx), request("GET", "/api/auth/me", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            app(&ctx),
            request("GET", "/api/auth/me", None, Some("garbage")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = ctx.token_for(UserRole::Client).await;
        let req = Request::builder()
            .uri("/api/auth/me")
            .header(header::COOKIE, format!("token={token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(&ctx), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "client");
    }
}

mod product_endpoints {
    use super::*;

    #[tokio::test]
    async fn list_filters_by_category_and_exposes_effective_price() {
        let ctx = TestContext::new().await;
        ctx.products.insert(sample_product("Oud Noir", "men"));
        let mut rose = sample_product("Rose Veil", "women");
        rose.is_sale = true;
        rose.sale_price = Some(35.0);
        ctx.products.insert(rose);

        let (status, body) = send(
            app(&ctx),
            request("GET", "/api/products?category=women", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Rose Veil");
        assert_eq!(items[0]["price"], json!(35.0));
        assert_eq!(items[0]["originalPrice"], json!(50.0));

        let (_, body) = send(
            app(&ctx),
            request("GET", "/api/products?onSale=yes", None, None),
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mutations_require_admin() {
        let ctx = TestContext::new().await;
        let payload = json!({
            "name": "Amber Night",
            "category": "unisex",
            "price": "89.90",
            "image": "/amber.jpg",
            "description": "Warm amber"
        });

        let (status, _) = send(
            app(&ctx),
            request("POST", "/api/products", Some(payload.clone()), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let client = ctx.token_for(UserRole::Client).await;
        let (status, _) = send(
            app(&ctx),
            request("POST", "/api/products", Some(payload.clone()), Some(&client)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = ctx.token_for(UserRole::Admin).await;
        let (status, body) = send(
            app(&ctx),
            request("POST", "/api/products", Some(payload), Some(&admin)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["price"], json!(89.9));
        assert_eq!(body["inStock"], json!(true));
        assert_eq!(body["rating"], json!(0.0));
        assert_eq!(ctx.products.all().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_missing_required_fields() {
        let ctx = TestContext::new().await;
        let admin = ctx.token_for(UserRole::Admin).await;

        let (status, _) = send(
            app(&ctx),
            request(
                "POST",
                "/api/products",
                Some(json!({ "name": "", "category": "men", "price": 10, "image": "/x.jpg", "description": "x" })),
                Some(&admin),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(json!("NaN"))]
    #[case(json!("inf"))]
    #[case(json!("-Infinity"))]
    #[tokio::test]
    async fn non_finite_price_is_rejected(#[case] price: Value) {
        let ctx = TestContext::new().await;
        let admin = ctx.token_for(UserRole::Admin).await;

        let (status, _) = send(
            app(&ctx),
            request(
                "POST",
                "/api/products",
                Some(json!({ "name": "Amber Night", "category": "unisex", "price": price, "image": "/amber.jpg", "description": "Warm amber" })),
                Some(&admin),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(ctx.products.all().is_empty());
    }

    #[tokio::test]
    async fn updating_price_leaves_description_untouched() {
        let ctx = TestContext::new().await;
        let product = ctx.products.insert(sample_product("Oud Noir", "men"));
        let admin = ctx.token_for(UserRole::Admin).await;

        let (status, body) = send(
            app(&ctx),
            request(
                "PUT",
                &format!("/api/products/{}", product.id),
                Some(json!({ "price": 72.5, "badge": "" })),
                Some(&admin),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"], json!(72.5));
        assert_eq!(body["description"], product.description);
        assert_eq!(body["badge"], Value::Null);
    }

    #[rstest]
    #[case("DELETE")]
    #[case("PUT")]
    #[tokio::test]
    async fn missing_product_is_not_found(#[case] method: &str) {
        let ctx = TestContext::new().await;
        let admin = ctx.token_for(UserRole::Admin).await;
        let body = (method == "PUT").then(|| json!({ "price": 1 }));

        for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
            let (status, json) = send(
                app(&ctx),
                request(method, &format!("/api/products/{id}"), body.clone(), Some(&admin)),
            )
            .await;

            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(json["message"], "Product not found");
        }
    }

    #[tokio::test]
    async fn delete_returns_id_and_removes_record() {
        let ctx = TestContext::new().await;
        let product = ctx.products.insert(sample_product("Oud Noir", "men"));
        let admin = ctx.token_for(UserRole::Admin).await;

        let (status, body) = send(
            app(&ctx),
            request("DELETE", &format!("/api/products/{}", product.id), None, Some(&admin)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], product.id.to_string());
        assert!(ctx.products.all().is_empty());

        let (status, _) = send(
            app(&ctx),
            request("GET", &format!("/api/products/{}", product.id), None, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod checkout_endpoint {
    use super::*;

    #[rstest]
    #[case(Some("MBWay"), "pending_payment", true)]
    #[case(Some("Card"), "placed", false)]
    #[case(None, "placed", false)]
    #[tokio::test]
    async fn payment_method_decides_status(
        #[case] payment_method: Option<&str>,
        #[case] expected_status: &str,
        #[case] mbway_pending: bool,
    ) {
        let ctx = TestContext::new().await;

        let (status, body) = send(
            app(&ctx),
            request("POST", "/api/checkout", Some(checkout_payload(payment_method)), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["status"], expected_status);
        assert_eq!(body["isMBWayPending"], json!(mbway_pending));
        assert!(body["orderNumber"].as_str().unwrap().starts_with("ORD-"));
    }

    #[tokio::test]
    async fn sends_two_emails_customer_first_with_zero_charges() {
        let ctx = TestContext::new().await;

        let (status, _) = send(
            app(&ctx),
            request("POST", "/api/checkout", Some(checkout_payload(Some("Card"))), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let orders = ctx.orders.all();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].subtotal, 120.0);
        assert_eq!(orders[0].shipping, 0.0);
        assert_eq!(orders[0].tax, 0.0);
        assert_eq!(orders[0].grand_total, 120.0);

        let sent = ctx.order_mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "ana@example.pt");
        assert_eq!(sent[1].to, "orders@alsa.pt");
        assert_eq!(sent[1].subject, "New Order from Ana Silva - €120.00");
    }

    #[rstest]
    #[case(json!([]))]
    #[case(json!([{ "product": { "id": "p1", "name": "Oud", "price": 10.0 }, "quantity": 0, "size": "50ml" }]))]
    #[tokio::test]
    async fn empty_cart_or_zero_quantity_is_rejected(#[case] cart_items: Value) {
        let ctx = TestContext::new().await;
        let mut payload = checkout_payload(None);
        payload["cartItems"] = cart_items;

        let (status, _) = send(app(&ctx), request("POST", "/api/checkout", Some(payload), None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(ctx.orders.all().is_empty());
        assert!(ctx.order_mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn mail_failure_reports_generic_error() {
        let ctx = TestContext::with_order_mailer(RecordingMailer::failing_from(0)).await;

        let (status, body) = send(
            app(&ctx),
            request("POST", "/api/checkout", Some(checkout_payload(None)), None),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "error": "Failed to process order" }));
    }
}

mod contact_endpoint {
    use super::*;

    fn payload() -> Value {
        json!({
            "name": "Rui",
            "email": "rui@example.pt",
            "subject": "Stock",
            "message": "Is Oud Noir back?"
        })
    }

    #[tokio::test]
    async fn missing_api_key_answers_503_with_fallback() {
        let ctx = TestContext::without_contact_api().await;

        let (status, body) = send(app(&ctx), request("POST", "/api/contact", Some(payload()), None)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["fallback"], json!(true));
        assert_eq!(body["contactEmail"], "hello@alsa.pt");
    }

    #[tokio::test]
    async fn relays_message_when_configured() {
        let ctx = TestContext::new().await;

        let (status, body) = send(app(&ctx), request("POST", "/api/contact", Some(payload()), None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));

        let sent = ctx.contact_mailer.as_ref().unwrap().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Contact Form: Stock");
    }

    #[rstest]
    #[case("email", json!("not-an-email"))]
    #[case("message", json!(""))]
    #[tokio::test]
    async fn invalid_fields_are_rejected(#[case] field: &str, #[case] value: Value) {
        let ctx = TestContext::new().await;
        let mut body = payload();
        body[field] = value;

        let (status, _) = send(app(&ctx), request("POST", "/api/contact", Some(body), None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod order_endpoints {
    use super::*;

    #[tokio::test]
    async fn listing_requires_admin() {
        let ctx = TestContext::new().await;

        let (status, _) = send(app(&ctx), request("GET", "/api/orders", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let client = ctx.token_for(UserRole::Client).await;
        let (status, _) = send(app(&ctx), request("GET", "/api/orders", None, Some(&client))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        ctx.orders
            .insert(sample_order("ORD-20250101-AAAAAA", PaymentMethod::MbWay));
        let admin = ctx.token_for(UserRole::Admin).await;
        let (status, body) = send(
            app(&ctx),
            request("GET", "/api/orders?status=pending_payment", None, Some(&admin)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"][0]["orderNumber"], "ORD-20250101-AAAAAA");
    }

    #[tokio::test]
    async fn confirm_payment_moves_pending_to_placed_and_then_conflicts() {
        let ctx = TestContext::new().await;
        let order = ctx
            .orders
            .insert(sample_order("ORD-20250101-AAAAAA", PaymentMethod::MbWay));
        let admin = ctx.token_for(UserRole::Admin).await;
        let uri = format!("/api/orders/{}/confirm-payment", order.id);

        let (status, body) = send(app(&ctx), request("PUT", &uri, None, Some(&admin))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "placed");

        let (status, _) = send(app(&ctx), request("PUT", &uri, None, Some(&admin))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let ctx = TestContext::new().await;
        let admin = ctx.token_for(UserRole::Admin).await;

        let (status, body) = send(
            app(&ctx),
            request("GET", &format!("/api/orders/{}", Uuid::new_v4()), None, Some(&admin)),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Order not found");
    }
}

#[tokio::test]
async fn metrics_expose_service_counters() {
    let ctx = TestContext::new().await;

    send(app(&ctx), request("GET", "/api/products", None, None)).await;

    let response = app(&ctx)
        .oneshot(request("GET", "/metrics", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("product_query_service_request_counter"));
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let ctx = TestContext::new().await;

    let (status, body) = send(app(&ctx), request("GET", "/api-docs/openapi.json", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/checkout"].is_object());
    assert!(body["paths"]["/api/orders/{id}/confirm-payment"].is_object());
}
