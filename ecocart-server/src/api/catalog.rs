//! Catalog endpoints (public)

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Category, Product};

use crate::services::catalog;
use crate::state::AppState;

use super::ApiResult;

/// GET /api/catalog/featured - 首页推荐商品
pub async fn featured(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(catalog::featured_products(state.store.as_ref(), catalog::FEATURED_LIMIT).await)
}

/// GET /api/catalog/categories - 分类列表
pub async fn categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(catalog::categories(state.store.as_ref(), catalog::CATEGORY_LIMIT).await)
}

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(catalog::list_products(state.store.as_ref()).await)
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    Ok(Json(catalog::product(state.store.as_ref(), &id).await?))
}
