//! PostgreSQL store adapter over the `db` query modules

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    Cart, CartItem, CartLine, Category, NewOrder, Order, OrderDetail, OrderLine, OrderStatus,
    Product, User, UserProfile,
};
use sqlx::PgPool;

use super::{CartStore, CatalogStore, OrderStore, StoreError, StoreResult, UserStore};
use crate::db;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn product_map(&self, ids: Vec<String>) -> StoreResult<HashMap<String, Product>> {
        let products = db::catalog::products_by_ids(&self.pool, &ids).await?;
        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}

fn to_order(row: db::orders::OrderRow) -> StoreResult<Order> {
    let status = OrderStatus::from_db(&row.status)
        .ok_or_else(|| StoreError::Backend(format!("unknown order status {}", row.status)))?;
    Ok(Order {
        id: row.id,
        owner_id: row.owner_id,
        total_amount: row.total_amount,
        stripe_session_id: row.stripe_session_id,
        status,
        created_at: row.created_at,
    })
}

fn take_product(products: &HashMap<String, Product>, id: &str) -> StoreResult<Product> {
    products
        .get(id)
        .cloned()
        .ok_or_else(|| StoreError::Backend(format!("dangling product reference {id}")))
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(db::catalog::list_products(&self.pool).await?)
    }

    async fn newest_products(&self, limit: i64) -> StoreResult<Vec<Product>> {
        Ok(db::catalog::newest_products(&self.pool, limit).await?)
    }

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(db::catalog::find_product(&self.pool, id).await?)
    }

    async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        Ok(db::catalog::find_product_by_name(&self.pool, name).await?)
    }

    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        Ok(db::catalog::insert_product(&self.pool, product).await?)
    }

    async fn list_categories(&self, limit: Option<i64>) -> StoreResult<Vec<Category>> {
        Ok(db::catalog::list_categories(&self.pool, limit).await?)
    }

    async fn find_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        Ok(db::catalog::find_category_by_slug(&self.pool, slug).await?)
    }

    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        Ok(db::catalog::insert_category(&self.pool, category).await?)
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn find_cart(&self, cart_id: &str) -> StoreResult<Option<Cart>> {
        Ok(db::carts::find_by_id(&self.pool, cart_id).await?)
    }

    async fn find_cart_by_owner(&self, owner_id: &str) -> StoreResult<Option<Cart>> {
        Ok(db::carts::find_by_owner(&self.pool, owner_id).await?)
    }

    async fn get_or_create_cart(&self, owner_id: &str, now: i64) -> StoreResult<Cart> {
        let id = uuid::Uuid::new_v4().to_string();
        Ok(db::carts::get_or_create(&self.pool, &id, owner_id, now).await?)
    }

    async fn upsert_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i32,
        now: i64,
    ) -> StoreResult<CartItem> {
        let id = uuid::Uuid::new_v4().to_string();
        Ok(db::carts::upsert_item(&self.pool, &id, cart_id, product_id, quantity, now).await?)
    }

    async fn find_item(&self, item_id: &str) -> StoreResult<Option<CartItem>> {
        Ok(db::carts::find_item(&self.pool, item_id).await?)
    }

    async fn delete_item(&self, item_id: &str) -> StoreResult<bool> {
        Ok(db::carts::delete_item(&self.pool, item_id).await?)
    }

    async fn list_lines(&self, cart_id: &str) -> StoreResult<Vec<CartLine>> {
        let items = db::carts::list_items(&self.pool, cart_id).await?;
        let products = self
            .product_map(items.iter().map(|i| i.product_id.clone()).collect())
            .await?;

        items
            .into_iter()
            .map(|item| {
                let product = take_product(&products, &item.product_id)?;
                Ok(CartLine { item, product })
            })
            .collect()
    }

    async fn clear_cart(&self, cart_id: &str) -> StoreResult<u64> {
        Ok(db::carts::clear(&self.pool, cart_id).await?)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order> {
        to_order(db::orders::create(&self.pool, order).await?)
    }

    async fn find_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        db::orders::find_by_id(&self.pool, order_id)
            .await?
            .map(to_order)
            .transpose()
    }

    async fn find_order_by_session(&self, session_id: &str) -> StoreResult<Option<Order>> {
        db::orders::find_by_session(&self.pool, session_id)
            .await?
            .map(to_order)
            .transpose()
    }

    async fn list_orders_for_owner(&self, owner_id: &str) -> StoreResult<Vec<OrderDetail>> {
        let orders = db::orders::list_by_owner(&self.pool, owner_id).await?;
        let order_ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();

        let items = db::orders::items_for_orders(&self.pool, &order_ids).await?;
        let products = self
            .product_map(items.iter().map(|i| i.product_id.clone()).collect())
            .await?;

        let mut lines_by_order: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for item in items {
            let product = take_product(&products, &item.product_id)?;
            lines_by_order
                .entry(item.order_id.clone())
                .or_default()
                .push(OrderLine { item, product });
        }

        orders
            .into_iter()
            .map(|row| {
                let items = lines_by_order.remove(&row.id).unwrap_or_default();
                Ok(OrderDetail {
                    order: to_order(row)?,
                    items,
                })
            })
            .collect()
    }

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<()> {
        Ok(db::orders::update_status(&self.pool, order_id, status.as_db()).await?)
    }

    async fn order_totals(&self) -> StoreResult<(Decimal, i64)> {
        Ok(db::orders::totals(&self.pool).await?)
    }

    async fn orders_since(&self, since: i64) -> StoreResult<Vec<Order>> {
        db::orders::created_since(&self.pool, since)
            .await?
            .into_iter()
            .map(to_order)
            .collect()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn upsert_user(&self, id: &str, profile: &UserProfile, now: i64) -> StoreResult<User> {
        Ok(db::users::upsert(&self.pool, id, profile, now).await?)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(db::users::count(&self.pool).await?)
    }
}
