//! API routes for ecocart-server

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod planner;
pub mod stripe_webhook;
pub mod users;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::{Router, middleware};
use http::{HeaderName, HeaderValue, StatusCode};
use shared::error::AppError;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{admin_guard, user_auth_middleware};
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Completion calls dominate; planner requests can take a while
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Public storefront reads
    let public = Router::new()
        .route("/api/catalog/featured", get(catalog::featured))
        .route("/api/catalog/categories", get(catalog::categories))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/{id}", get(catalog::get_product))
        .route("/api/checkout/confirm", get(checkout::confirm))
        .route("/api/planner", post(planner::generate));

    // Signed-in users
    let user = Router::new()
        .route("/api/cart", get(cart::get_cart))
        .route("/api/cart/items", post(cart::add_item))
        .route("/api/cart/items/batch", post(cart::add_items))
        .route("/api/cart/items/{id}", delete(cart::remove_item))
        .route("/api/checkout", post(checkout::create))
        .route("/api/orders", get(orders::list_orders))
        .route("/api/users/sync", post(users::sync))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    // Admin dashboard (guard runs after user auth)
    let admin = Router::new()
        .route("/api/admin/metrics", get(admin::metrics))
        .route("/api/admin/orders/{id}/status", patch(admin::update_order_status))
        .layer(middleware::from_fn_with_state(state.clone(), admin_guard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    // Stripe webhook (signature-verified, raw body)
    let webhook = Router::new().route("/stripe/webhook", post(stripe_webhook::handle_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(user)
        .merge(admin)
        .merge(webhook)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            UuidRequestId,
        ))
        .with_state(state)
}
