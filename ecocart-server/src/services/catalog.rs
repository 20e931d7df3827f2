//! Catalog reads
//!
//! List reads degrade to an empty list when storage fails, so browsing pages
//! still render; single-product lookups surface errors.

use shared::error::ErrorCode;
use shared::models::{Category, Product};

use crate::error::{ShopError, ShopResult};
use crate::store::CatalogStore;

pub const FEATURED_LIMIT: i64 = 4;
pub const CATEGORY_LIMIT: i64 = 6;

/// Newest products first
pub async fn featured_products<S>(store: &S, limit: i64) -> Vec<Product>
where
    S: CatalogStore + ?Sized,
{
    store.newest_products(limit).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load featured products");
        Vec::new()
    })
}

pub async fn categories<S>(store: &S, limit: i64) -> Vec<Category>
where
    S: CatalogStore + ?Sized,
{
    store.list_categories(Some(limit)).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories");
        Vec::new()
    })
}

pub async fn list_products<S>(store: &S) -> Vec<Product>
where
    S: CatalogStore + ?Sized,
{
    store.list_products().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load products");
        Vec::new()
    })
}

pub async fn product<S>(store: &S, id: &str) -> ShopResult<Product>
where
    S: CatalogStore + ?Sized,
{
    store
        .find_product(id)
        .await?
        .ok_or(ShopError::NotFound(ErrorCode::ProductNotFound))
}
