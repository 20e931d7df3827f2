//! Shared test fixtures: fake payment gateway, fake completion client,
//! catalog helpers and app state wiring.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ecocart_server::config::Config;
use ecocart_server::llm::{CompletionClient, CompletionError, CompletionRequest};
use ecocart_server::state::AppState;
use ecocart_server::store::{
    CartStore, CatalogStore, MemoryStore, OrderStore, Store, StoreError, StoreResult, UserStore,
};
use ecocart_server::stripe::{CheckoutRequest, CheckoutSession, PaymentError, PaymentGateway};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::{
    Cart, CartItem, CartLine, Category, NewOrder, Order, OrderDetail, OrderStatus, Product, User,
    UserProfile,
};

pub const WEBHOOK_SECRET: &str = "whsec_test123secret456";
pub const JWT_SECRET: &str = "test-jwt-secret";
pub const ADMIN_ID: &str = "user_admin";

/// Payment gateway that records checkout requests and serves canned sessions
#[derive(Default)]
pub struct FakePayments {
    pub sessions: Mutex<HashMap<String, CheckoutSession>>,
    pub created: Mutex<Vec<CheckoutRequest>>,
    pub fail_create: bool,
}

impl FakePayments {
    pub fn with_session(self, session: CheckoutSession) -> Self {
        self.sessions.lock().insert(session.id.clone(), session);
        self
    }
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<String, PaymentError> {
        if self.fail_create {
            return Err(PaymentError::Rejected("card declined".into()));
        }
        let mut created = self.created.lock();
        created.push(request.clone());
        Ok(format!("https://checkout.stripe.test/c/cs_test_{}", created.len()))
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError> {
        self.sessions
            .lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| PaymentError::Rejected(format!("No such checkout.session: {session_id}")))
    }
}

/// Completion client returning a fixed reply and counting calls
pub struct FakeCompletion {
    pub reply: Result<Value, String>,
    pub calls: AtomicUsize,
}

impl FakeCompletion {
    pub fn replying(reply: Value) -> Self {
        Self {
            reply: Ok(reply),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete_json(&self, _request: CompletionRequest<'_>) -> Result<Value, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(CompletionError::Api)
    }
}

pub fn product(id: &str, name: &str, cents: i64) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        description: None,
        price: Decimal::new(cents, 2),
        image: format!("https://img.test/{id}.png"),
        stock: 50,
        category_id: None,
        calories: None,
        protein: None,
        carbs: None,
        fat: None,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    }
}

/// Memory store with the given products
pub async fn store_with(products: &[Product]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for p in products {
        store.insert_product(p).await.unwrap();
    }
    store
}

pub fn paid_session(id: &str, user_id: &str, cart_id: &str, amount_total: i64) -> CheckoutSession {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "payment_status": "paid",
        "amount_total": amount_total,
        "metadata": { "userId": user_id, "cartId": cart_id }
    }))
    .unwrap()
}

pub fn test_config() -> Config {
    Config {
        environment: "test".into(),
        database_url: None,
        http_port: 0,
        app_url: "https://shop.test".into(),
        currency: "usd".into(),
        stripe_secret_key: "sk_test".into(),
        stripe_webhook_secret: WEBHOOK_SECRET.into(),
        auth_jwt_secret: JWT_SECRET.into(),
        admin_user_ids: vec![ADMIN_ID.into()],
        openai_api_key: None,
        openai_base_url: "http://127.0.0.1:9".into(),
        openai_model: "gpt-4o".into(),
        seed_dir: None,
    }
}

pub fn app_state(
    store: Arc<dyn Store>,
    payments: Arc<FakePayments>,
    completions: Arc<FakeCompletion>,
) -> AppState {
    AppState::with_services(&test_config(), store, payments, completions)
}

/// Fails the first cart clear, like a crash between order insert and clear
pub struct ClearFailsOnce {
    pub inner: Arc<MemoryStore>,
    failed: AtomicBool,
}

impl ClearFailsOnce {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            failed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl CatalogStore for ClearFailsOnce {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.inner.list_products().await
    }
    async fn newest_products(&self, limit: i64) -> StoreResult<Vec<Product>> {
        self.inner.newest_products(limit).await
    }
    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        self.inner.find_product(id).await
    }
    async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        self.inner.find_product_by_name(name).await
    }
    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        self.inner.insert_product(product).await
    }
    async fn list_categories(&self, limit: Option<i64>) -> StoreResult<Vec<Category>> {
        self.inner.list_categories(limit).await
    }
    async fn find_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        self.inner.find_category_by_slug(slug).await
    }
    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        self.inner.insert_category(category).await
    }
}

#[async_trait]
impl CartStore for ClearFailsOnce {
    async fn find_cart(&self, cart_id: &str) -> StoreResult<Option<Cart>> {
        self.inner.find_cart(cart_id).await
    }
    async fn find_cart_by_owner(&self, owner_id: &str) -> StoreResult<Option<Cart>> {
        self.inner.find_cart_by_owner(owner_id).await
    }
    async fn get_or_create_cart(&self, owner_id: &str, now: i64) -> StoreResult<Cart> {
        self.inner.get_or_create_cart(owner_id, now).await
    }
    async fn upsert_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i32,
        now: i64,
    ) -> StoreResult<CartItem> {
        self.inner.upsert_item(cart_id, product_id, quantity, now).await
    }
    async fn find_item(&self, item_id: &str) -> StoreResult<Option<CartItem>> {
        self.inner.find_item(item_id).await
    }
    async fn delete_item(&self, item_id: &str) -> StoreResult<bool> {
        self.inner.delete_item(item_id).await
    }
    async fn list_lines(&self, cart_id: &str) -> StoreResult<Vec<CartLine>> {
        self.inner.list_lines(cart_id).await
    }
    async fn clear_cart(&self, cart_id: &str) -> StoreResult<u64> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".into()));
        }
        self.inner.clear_cart(cart_id).await
    }
}

#[async_trait]
impl OrderStore for ClearFailsOnce {
    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order> {
        self.inner.insert_order(order).await
    }
    async fn find_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        self.inner.find_order(order_id).await
    }
    async fn find_order_by_session(&self, session_id: &str) -> StoreResult<Option<Order>> {
        self.inner.find_order_by_session(session_id).await
    }
    async fn list_orders_for_owner(&self, owner_id: &str) -> StoreResult<Vec<OrderDetail>> {
        self.inner.list_orders_for_owner(owner_id).await
    }
    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<()> {
        self.inner.update_order_status(order_id, status).await
    }
    async fn order_totals(&self) -> StoreResult<(Decimal, i64)> {
        self.inner.order_totals().await
    }
    async fn orders_since(&self, since: i64) -> StoreResult<Vec<Order>> {
        self.inner.orders_since(since).await
    }
}

#[async_trait]
impl UserStore for ClearFailsOnce {
    async fn upsert_user(&self, id: &str, profile: &UserProfile, now: i64) -> StoreResult<User> {
        self.inner.upsert_user(id, profile, now).await
    }
    async fn count_users(&self) -> StoreResult<i64> {
        self.inner.count_users().await
    }
}
