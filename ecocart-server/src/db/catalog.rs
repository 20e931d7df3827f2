//! Products and categories

use shared::models::{Category, Product};
use sqlx::PgPool;

const PRODUCT_COLUMNS: &str = "id, name, description, price, image, stock, category_id, \
     calories, protein, carbs, fat, created_at, updated_at";

pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn newest_products(pool: &PgPool, limit: i64) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_product(pool: &PgPool, id: &str) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_product_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = $1 LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// Batch load products by ID
pub async fn products_by_ids(pool: &PgPool, ids: &[String]) -> Result<Vec<Product>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn insert_product(pool: &PgPool, p: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (id, name, description, price, image, stock, category_id,
                               calories, protein, carbs, fat, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(&p.id)
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.price)
    .bind(&p.image)
    .bind(p.stock)
    .bind(&p.category_id)
    .bind(p.calories)
    .bind(p.protein)
    .bind(p.carbs)
    .bind(p.fat)
    .bind(p.created_at)
    .bind(p.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_categories(
    pool: &PgPool,
    limit: Option<i64>,
) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, slug, image, created_at FROM categories ORDER BY name LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_category_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, slug, image, created_at FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn insert_category(pool: &PgPool, c: &Category) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO categories (id, name, slug, image, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&c.id)
    .bind(&c.name)
    .bind(&c.slug)
    .bind(&c.image)
    .bind(c.created_at)
    .execute(pool)
    .await?;
    Ok(())
}
