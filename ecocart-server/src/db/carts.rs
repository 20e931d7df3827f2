//! Carts and cart items

use shared::models::{Cart, CartItem};
use sqlx::PgPool;

pub async fn find_by_id(pool: &PgPool, cart_id: &str) -> Result<Option<Cart>, sqlx::Error> {
    sqlx::query_as("SELECT id, owner_id, created_at, updated_at FROM carts WHERE id = $1")
        .bind(cart_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_owner(pool: &PgPool, owner_id: &str) -> Result<Option<Cart>, sqlx::Error> {
    sqlx::query_as("SELECT id, owner_id, created_at, updated_at FROM carts WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

/// Create the owner's cart if missing, then return it.
///
/// `ON CONFLICT DO NOTHING` keeps concurrent first adds from failing on the
/// unique owner key.
pub async fn get_or_create(
    pool: &PgPool,
    id: &str,
    owner_id: &str,
    now: i64,
) -> Result<Cart, sqlx::Error> {
    sqlx::query(
        "INSERT INTO carts (id, owner_id, created_at, updated_at) VALUES ($1, $2, $3, $3)
         ON CONFLICT (owner_id) DO NOTHING",
    )
    .bind(id)
    .bind(owner_id)
    .bind(now)
    .execute(pool)
    .await?;

    sqlx::query_as("SELECT id, owner_id, created_at, updated_at FROM carts WHERE owner_id = $1")
        .bind(owner_id)
        .fetch_one(pool)
        .await
}

/// Insert a line or accumulate quantity on the existing (cart, product) line
pub async fn upsert_item(
    pool: &PgPool,
    id: &str,
    cart_id: &str,
    product_id: &str,
    quantity: i32,
    now: i64,
) -> Result<CartItem, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let item: CartItem = sqlx::query_as(
        "INSERT INTO cart_items (id, cart_id, product_id, quantity)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (cart_id, product_id)
         DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
         RETURNING id, cart_id, product_id, quantity",
    )
    .bind(id)
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE carts SET updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(cart_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(item)
}

pub async fn find_item(pool: &PgPool, item_id: &str) -> Result<Option<CartItem>, sqlx::Error> {
    sqlx::query_as("SELECT id, cart_id, product_id, quantity FROM cart_items WHERE id = $1")
        .bind(item_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_item(pool: &PgPool, item_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Items of a cart sorted by product ID
pub async fn list_items(pool: &PgPool, cart_id: &str) -> Result<Vec<CartItem>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, cart_id, product_id, quantity FROM cart_items
         WHERE cart_id = $1 ORDER BY product_id",
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await
}

pub async fn clear(pool: &PgPool, cart_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
        .bind(cart_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
