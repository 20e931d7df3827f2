//! Router-level tests: auth layers, webhook, confirmation page

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::*;
use ecocart_server::api::create_router;
use ecocart_server::auth::user_auth::create_token;
use ecocart_server::services::cart;
use ecocart_server::store::{CartStore, MemoryStore, OrderStore};
use ecocart_server::stripe::signature_header;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

async fn app_with(payments: FakePayments) -> TestApp {
    let store = store_with(&[product("p1", "Olive Oil", 2500)]).await;
    let state = app_state(
        store.clone(),
        Arc::new(payments),
        Arc::new(FakeCompletion::failing("not configured")),
    );
    TestApp {
        router: create_router(state),
        store,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn bearer(user_id: &str) -> String {
    let token = create_token(user_id, None, JWT_SECRET, chrono::Duration::hours(1)).unwrap();
    format!("Bearer {token}")
}

fn webhook_request(payload: &Value, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::post("/stripe/webhook").header(header::CONTENT_TYPE, "application/json");
    if let Some(sig) = signature {
        builder = builder.header("stripe-signature", sig);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

fn signed(payload: &Value) -> Request<Body> {
    let body = payload.to_string();
    let sig = signature_header(body.as_bytes(), WEBHOOK_SECRET, chrono::Utc::now().timestamp());
    webhook_request(payload, Some(sig))
}

fn completed_event(session_id: &str, payment_status: &str, metadata: Value) -> Value {
    json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "payment_status": payment_status,
                "amount_total": 5000,
                "metadata": metadata
            }
        }
    })
}

/// Cart for user_1 holding two bottles of olive oil
async fn filled_cart(store: &MemoryStore) -> String {
    cart::add_item(store, "user_1", "p1", 2).await.unwrap();
    store.find_cart_by_owner("user_1").await.unwrap().unwrap().id
}

#[tokio::test]
async fn test_health() {
    let app = app_with(FakePayments::default()).await;
    let (status, body) = send(&app.router, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_webhook_rejects_missing_and_bad_signatures() {
    let app = app_with(FakePayments::default()).await;
    let event = completed_event("cs_1", "paid", json!({ "userId": "user_1", "cartId": "c" }));

    let (status, body) = send(&app.router, webhook_request(&event, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5004);

    let forged = signature_header(b"something else", WEBHOOK_SECRET, chrono::Utc::now().timestamp());
    let (status, _) = send(&app.router, webhook_request(&event, Some(forged))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let stale = signature_header(
        event.to_string().as_bytes(),
        WEBHOOK_SECRET,
        chrono::Utc::now().timestamp() - 3600,
    );
    let (status, _) = send(&app.router, webhook_request(&event, Some(stale))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.store.order_count_for_session("cs_1"), 0);
}

#[tokio::test]
async fn test_webhook_ignores_unhandled_events() {
    let app = app_with(FakePayments::default()).await;
    let event = json!({ "id": "evt_2", "type": "invoice.paid", "data": { "object": {} } });
    let (status, _) = send(&app.router, signed(&event)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_paid_session_creates_order() {
    let app = app_with(FakePayments::default()).await;
    let cart_id = filled_cart(&app.store).await;
    let event = completed_event("cs_1", "paid", json!({ "userId": "user_1", "cartId": cart_id }));

    let (status, _) = send(&app.router, signed(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.order_count_for_session("cs_1"), 1);
    assert!(app.store.list_lines(&cart_id).await.unwrap().is_empty());

    // Redelivery
    let (status, _) = send(&app.router, signed(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.order_count_for_session("cs_1"), 1);
}

#[tokio::test]
async fn test_webhook_unpaid_session_waits() {
    let app = app_with(FakePayments::default()).await;
    let cart_id = filled_cart(&app.store).await;
    let event = completed_event("cs_1", "unpaid", json!({ "userId": "user_1", "cartId": cart_id }));

    let (status, _) = send(&app.router, signed(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.order_count_for_session("cs_1"), 0);
    assert_eq!(app.store.list_lines(&cart_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_webhook_missing_cart_is_not_found() {
    let app = app_with(FakePayments::default()).await;
    let event = completed_event("cs_1", "paid", json!({ "userId": "user_1", "cartId": "gone" }));
    let (status, _) = send(&app.router, signed(&event)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_webhook_missing_metadata_is_bad_request() {
    let app = app_with(FakePayments::default()).await;
    let event = completed_event("cs_1", "paid", json!({ "userId": "user_1" }));
    let (status, body) = send(&app.router, signed(&event)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5003);
}

#[tokio::test]
async fn test_webhook_malformed_payload_is_bad_request() {
    let app = app_with(FakePayments::default()).await;
    let body = "{not json";
    let sig = signature_header(body.as_bytes(), WEBHOOK_SECRET, chrono::Utc::now().timestamp());
    let request = Request::post("/stripe/webhook")
        .header("stripe-signature", sig)
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5);
}

#[tokio::test]
async fn test_webhook_free_session_creates_order() {
    // 100% discount: Stripe reports no_payment_required instead of paid
    let app = app_with(FakePayments::default()).await;
    let cart_id = filled_cart(&app.store).await;
    let event = completed_event(
        "cs_free",
        "no_payment_required",
        json!({ "userId": "user_1", "cartId": cart_id }),
    );

    let (status, _) = send(&app.router, signed(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.order_count_for_session("cs_free"), 1);
    assert!(app.store.list_lines(&cart_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_store_failure_is_retried() {
    let inner = store_with(&[product("p1", "Olive Oil", 2500)]).await;
    let cart_id = filled_cart(&inner).await;
    let router = create_router(app_state(
        Arc::new(ClearFailsOnce::new(inner.clone())),
        Arc::new(FakePayments::default()),
        Arc::new(FakeCompletion::failing("unused")),
    ));
    let event = completed_event("cs_1", "paid", json!({ "userId": "user_1", "cartId": cart_id }));

    // Order committed but the clear failed: ask Stripe to redeliver
    let (status, body) = send(&router, signed(&event)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 9002);
    assert_eq!(inner.order_count_for_session("cs_1"), 1);
    assert_eq!(inner.list_lines(&cart_id).await.unwrap().len(), 1);

    let (status, _) = send(&router, signed(&event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inner.order_count_for_session("cs_1"), 1);
    assert!(inner.list_lines(&cart_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_confirm_without_session_id() {
    let app = app_with(FakePayments::default()).await;
    let (status, body) = send(
        &app.router,
        Request::get("/api/checkout/confirm").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "invalid_session" }));
}

#[tokio::test]
async fn test_confirm_fulfils_paid_session_once() {
    let store = store_with(&[product("p1", "Olive Oil", 2500)]).await;
    let cart_id = filled_cart(&store).await;
    let payments = FakePayments::default().with_session(paid_session("cs_9", "user_1", &cart_id, 5000));
    let router = create_router(app_state(
        store.clone(),
        Arc::new(payments),
        Arc::new(FakeCompletion::failing("unused")),
    ));

    for _ in 0..2 {
        let (status, body) = send(
            &router,
            Request::get("/api/checkout/confirm?session_id=cs_9")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "success", "session_id": "cs_9" }));
    }

    assert_eq!(store.order_count_for_session("cs_9"), 1);
    assert!(store.list_lines(&cart_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_confirm_hides_provider_errors() {
    let app = app_with(FakePayments::default()).await;
    let (status, body) = send(
        &app.router,
        Request::get("/api/checkout/confirm?session_id=cs_unknown")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_cart_requires_token() {
    let app = app_with(FakePayments::default()).await;

    let (status, _) = send(&app.router, Request::get("/api/cart").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        Request::get("/api/cart")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_add_and_read_with_token() {
    let app = app_with(FakePayments::default()).await;

    let (status, item) = send(
        &app.router,
        Request::post("/api/cart/items")
            .header(header::AUTHORIZATION, bearer("user_1"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "productId": "p1" }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["quantity"], 1);

    let (status, view) = send(
        &app.router,
        Request::get("/api/cart")
            .header(header::AUTHORIZATION, bearer("user_1"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["ownerId"], "user_1");
    assert_eq!(view["items"][0]["product"]["name"], "Olive Oil");
}

#[tokio::test]
async fn test_cart_quantity_over_limit_is_rejected() {
    let app = app_with(FakePayments::default()).await;
    cart::add_item(app.store.as_ref(), "user_1", "p1", 999).await.unwrap();

    let (status, body) = send(
        &app.router,
        Request::post("/api/cart/items")
            .header(header::AUTHORIZATION, bearer("user_1"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "productId": "p1", "quantity": 1 }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3004);
}

#[tokio::test]
async fn test_removing_foreign_item_is_forbidden() {
    let app = app_with(FakePayments::default()).await;
    let item = cart::add_item(app.store.as_ref(), "user_1", "p1", 1).await.unwrap();

    let (status, _) = send(
        &app.router,
        Request::delete(format!("/api/cart/items/{}", item.id))
            .header(header::AUTHORIZATION, bearer("user_2"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.store.find_item(&item.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_checkout_returns_session_url() {
    let app = app_with(FakePayments::default()).await;
    filled_cart(&app.store).await;

    let (status, body) = send(
        &app.router,
        Request::post("/api/checkout")
            .header(header::AUTHORIZATION, bearer("user_1"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://checkout.stripe.test/c/cs_test_1");
}

#[tokio::test]
async fn test_admin_metrics_requires_admin() {
    let app = app_with(FakePayments::default()).await;

    let (status, _) = send(
        &app.router,
        Request::get("/api/admin/metrics")
            .header(header::AUTHORIZATION, bearer("user_1"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app.router,
        Request::get("/api/admin/metrics")
            .header(header::AUTHORIZATION, bearer(ADMIN_ID))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["salesCount"], 0);
    assert_eq!(body["weeklySales"].as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn test_admin_illegal_transition_is_conflict() {
    let app = app_with(FakePayments::default()).await;
    let cart_id = filled_cart(&app.store).await;
    let event = completed_event("cs_1", "paid", json!({ "userId": "user_1", "cartId": cart_id }));
    send(&app.router, signed(&event)).await;
    let order_id = app.store.find_order_by_session("cs_1").await.unwrap().unwrap().id;

    let patch = |status: &str| {
        Request::patch(format!("/api/admin/orders/{order_id}/status"))
            .header(header::AUTHORIZATION, bearer(ADMIN_ID))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "status": status }).to_string()))
            .unwrap()
    };

    let (status, body) = send(&app.router, patch("PENDING")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4002);

    let (status, _) = send(&app.router, patch("SHIPPED")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_sync_requires_email() {
    let app = app_with(FakePayments::default()).await;

    let (status, body) = send(
        &app.router,
        Request::post("/api/users/sync")
            .header(header::AUTHORIZATION, bearer("user_1"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "firstName": "Ada" }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8002);

    let (status, body) = send(
        &app.router,
        Request::post("/api/users/sync")
            .header(header::AUTHORIZATION, bearer("user_1"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "email": " ada@example.com " }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_planner_failure_uses_fixed_message() {
    let app = app_with(FakePayments::default()).await;

    let (status, body) = send(
        &app.router,
        Request::post("/api/planner")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "budget": 40, "days": 3, "people": 2 }).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["message"],
        "Failed to generate plan. Please check your API key and try again."
    );
}
