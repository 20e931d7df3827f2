//! Catalog seeding from JSON files
//!
//! `categories.json`: `[{name, slug, image?}]`
//! `products.json`: `[{name, description?, price, image?, stock?, category? (slug), ...nutrition}]`
//!
//! Existing rows are skipped (categories by slug, products by name), so
//! re-running is safe.

use std::path::Path;

use shared::models::{Category, CategoryCreate, Product, ProductCreate};
use shared::util::now_millis;

use crate::BoxError;
use crate::store::CatalogStore;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub categories_skipped: usize,
    pub products_created: usize,
    pub products_skipped: usize,
}

pub async fn seed_from_dir<S>(store: &S, dir: &Path) -> Result<SeedReport, BoxError>
where
    S: CatalogStore + ?Sized,
{
    let categories: Vec<CategoryCreate> =
        serde_json::from_str(&tokio::fs::read_to_string(dir.join("categories.json")).await?)?;
    let products: Vec<ProductCreate> =
        serde_json::from_str(&tokio::fs::read_to_string(dir.join("products.json")).await?)?;

    seed(store, categories, products).await
}

pub async fn seed<S>(
    store: &S,
    categories: Vec<CategoryCreate>,
    products: Vec<ProductCreate>,
) -> Result<SeedReport, BoxError>
where
    S: CatalogStore + ?Sized,
{
    let mut report = SeedReport::default();
    let now = now_millis();

    for data in categories {
        if store.find_category_by_slug(&data.slug).await?.is_some() {
            tracing::info!(slug = %data.slug, "Category exists, skipping");
            report.categories_skipped += 1;
            continue;
        }
        let category = Category {
            id: uuid::Uuid::new_v4().to_string(),
            name: data.name,
            slug: data.slug,
            image: data.image,
            created_at: now,
        };
        store.insert_category(&category).await?;
        tracing::info!(slug = %category.slug, "Category created");
        report.categories_created += 1;
    }

    for (i, data) in products.into_iter().enumerate() {
        if store.find_product_by_name(&data.name).await?.is_some() {
            tracing::info!(name = %data.name, "Product exists, skipping");
            report.products_skipped += 1;
            continue;
        }

        let category_id = match data.category.as_deref() {
            Some(slug) => match store.find_category_by_slug(slug).await? {
                Some(c) => Some(c.id),
                None => {
                    tracing::warn!(name = %data.name, slug = %slug, "Unknown category slug");
                    None
                }
            },
            None => None,
        };

        // Offset by index so "newest first" follows file order in reverse
        let product = Product::from_create(
            uuid::Uuid::new_v4().to_string(),
            category_id,
            data,
            now + i as i64,
        );
        store.insert_product(&product).await?;
        tracing::info!(name = %product.name, "Product created");
        report.products_created += 1;
    }

    Ok(report)
}
