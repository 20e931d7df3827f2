//! Orders and order items

use rust_decimal::Decimal;
use shared::models::{NewOrder, OrderItem};
use sqlx::PgPool;

/// Raw order row (status as TEXT)
#[derive(sqlx::FromRow)]
pub struct OrderRow {
    pub id: String,
    pub owner_id: String,
    pub total_amount: Decimal,
    pub stripe_session_id: String,
    pub status: String,
    pub created_at: i64,
}

const ORDER_COLUMNS: &str = "id, owner_id, total_amount, stripe_session_id, status, created_at";

/// Insert order and its items in one transaction.
///
/// A second insert for the same session fails on `orders_stripe_session_id_key`.
pub async fn create(pool: &PgPool, order: &NewOrder) -> Result<OrderRow, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row: OrderRow = sqlx::query_as(&format!(
        "INSERT INTO orders (id, owner_id, total_amount, stripe_session_id, status, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(&order.id)
    .bind(&order.owner_id)
    .bind(order.total_amount)
    .bind(&order.stripe_session_id)
    .bind(order.status.as_db())
    .bind(order.created_at)
    .fetch_one(&mut *tx)
    .await?;

    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, quantity, price)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&order.id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(row)
}

pub async fn find_by_id(pool: &PgPool, order_id: &str) -> Result<Option<OrderRow>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_session(
    pool: &PgPool,
    session_id: &str,
) -> Result<Option<OrderRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE stripe_session_id = $1"
    ))
    .bind(session_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_owner(pool: &PgPool, owner_id: &str) -> Result<Vec<OrderRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE owner_id = $1 ORDER BY created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

/// Batch load items for a set of orders
pub async fn items_for_orders(
    pool: &PgPool,
    order_ids: &[String],
) -> Result<Vec<OrderItem>, sqlx::Error> {
    if order_ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as(
        "SELECT id, order_id, product_id, quantity, price FROM order_items
         WHERE order_id = ANY($1) ORDER BY product_id",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await
}

pub async fn update_status(pool: &PgPool, order_id: &str, status: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(order_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// (revenue, order count)
pub async fn totals(pool: &PgPool) -> Result<(Decimal, i64), sqlx::Error> {
    let row: (Option<Decimal>, i64) =
        sqlx::query_as("SELECT SUM(total_amount), COUNT(*) FROM orders")
            .fetch_one(pool)
            .await?;
    Ok((row.0.unwrap_or(Decimal::ZERO), row.1))
}

pub async fn created_since(pool: &PgPool, since: i64) -> Result<Vec<OrderRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE created_at >= $1 ORDER BY created_at"
    ))
    .bind(since)
    .fetch_all(pool)
    .await
}
