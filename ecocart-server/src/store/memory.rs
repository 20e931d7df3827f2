//! In-memory store
//!
//! Single `parking_lot::Mutex` over all tables. Unique keys (cart owner,
//! cart line per product, order session) are checked under the lock, so the
//! same conflicts the Postgres constraints raise surface here too.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::models::{
    Cart, CartItem, CartLine, Category, NewOrder, Order, OrderDetail, OrderItem, OrderLine,
    OrderStatus, Product, User, UserProfile, MAX_LINE_QUANTITY,
};

use super::{CartStore, CatalogStore, OrderStore, StoreError, StoreResult, UserStore};

/// 与 Postgres 约束同名
const QUANTITY_CHECK: &str = "cart_items_quantity_check";

#[derive(Default)]
struct Inner {
    products: Vec<Product>,
    categories: Vec<Category>,
    carts: HashMap<String, Cart>,
    cart_items: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    users: HashMap<String, User>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某个支付会话对应的订单数（测试用）
    pub fn order_count_for_session(&self, session_id: &str) -> usize {
        self.inner
            .lock()
            .orders
            .iter()
            .filter(|o| o.stripe_session_id == session_id)
            .count()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn product_by_id(products: &[Product], id: &str) -> StoreResult<Product> {
    products
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or_else(|| StoreError::Backend(format!("dangling product reference {id}")))
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let mut products = self.inner.lock().products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn newest_products(&self, limit: i64) -> StoreResult<Vec<Product>> {
        let mut products = self.inner.lock().products.clone();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products.truncate(limit.max(0) as usize);
        Ok(products)
    }

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.inner.lock().products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        Ok(self
            .inner
            .lock()
            .products
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn insert_product(&self, product: &Product) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        if inner.products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::Duplicate("products_pkey".into()));
        }
        inner.products.push(product.clone());
        Ok(())
    }

    async fn list_categories(&self, limit: Option<i64>) -> StoreResult<Vec<Category>> {
        let mut categories = self.inner.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(limit) = limit {
            categories.truncate(limit.max(0) as usize);
        }
        Ok(categories)
    }

    async fn find_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        Ok(self
            .inner
            .lock()
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        if inner.categories.iter().any(|c| c.slug == category.slug) {
            return Err(StoreError::Duplicate("categories_slug_key".into()));
        }
        inner.categories.push(category.clone());
        Ok(())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find_cart(&self, cart_id: &str) -> StoreResult<Option<Cart>> {
        Ok(self.inner.lock().carts.get(cart_id).cloned())
    }

    async fn find_cart_by_owner(&self, owner_id: &str) -> StoreResult<Option<Cart>> {
        Ok(self
            .inner
            .lock()
            .carts
            .values()
            .find(|c| c.owner_id == owner_id)
            .cloned())
    }

    async fn get_or_create_cart(&self, owner_id: &str, now: i64) -> StoreResult<Cart> {
        let mut inner = self.inner.lock();
        if let Some(cart) = inner.carts.values().find(|c| c.owner_id == owner_id) {
            return Ok(cart.clone());
        }
        let cart = Cart {
            id: new_id(),
            owner_id: owner_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.carts.insert(cart.id.clone(), cart.clone());
        Ok(cart)
    }

    async fn upsert_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i32,
        now: i64,
    ) -> StoreResult<CartItem> {
        let mut inner = self.inner.lock();
        if !inner.products.iter().any(|p| p.id == product_id) {
            return Err(StoreError::Backend(format!(
                "cart_items references unknown product {product_id}"
            )));
        }
        let Some(cart) = inner.carts.get_mut(cart_id) else {
            return Err(StoreError::Backend(format!(
                "cart_items references unknown cart {cart_id}"
            )));
        };
        cart.updated_at = now;

        if let Some(item) = inner
            .cart_items
            .iter_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            let total = item
                .quantity
                .checked_add(quantity)
                .filter(|q| *q <= MAX_LINE_QUANTITY)
                .ok_or_else(|| StoreError::Constraint(QUANTITY_CHECK.to_string()))?;
            item.quantity = total;
            return Ok(item.clone());
        }

        if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
            return Err(StoreError::Constraint(QUANTITY_CHECK.to_string()));
        }
        let item = CartItem {
            id: new_id(),
            cart_id: cart_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
        };
        inner.cart_items.push(item.clone());
        Ok(item)
    }

    async fn find_item(&self, item_id: &str) -> StoreResult<Option<CartItem>> {
        Ok(self
            .inner
            .lock()
            .cart_items
            .iter()
            .find(|i| i.id == item_id)
            .cloned())
    }

    async fn delete_item(&self, item_id: &str) -> StoreResult<bool> {
        let mut inner = self.inner.lock();
        let before = inner.cart_items.len();
        inner.cart_items.retain(|i| i.id != item_id);
        Ok(inner.cart_items.len() != before)
    }

    async fn list_lines(&self, cart_id: &str) -> StoreResult<Vec<CartLine>> {
        let inner = self.inner.lock();
        let mut items: Vec<&CartItem> = inner
            .cart_items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .collect();
        items.sort_by(|a, b| a.product_id.cmp(&b.product_id));

        items
            .into_iter()
            .map(|item| {
                Ok(CartLine {
                    item: item.clone(),
                    product: product_by_id(&inner.products, &item.product_id)?,
                })
            })
            .collect()
    }

    async fn clear_cart(&self, cart_id: &str) -> StoreResult<u64> {
        let mut inner = self.inner.lock();
        let before = inner.cart_items.len();
        inner.cart_items.retain(|i| i.cart_id != cart_id);
        Ok((before - inner.cart_items.len()) as u64)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order> {
        let mut inner = self.inner.lock();
        if inner
            .orders
            .iter()
            .any(|o| o.stripe_session_id == order.stripe_session_id)
        {
            return Err(StoreError::Duplicate("orders_stripe_session_id_key".into()));
        }

        let row = Order {
            id: order.id.clone(),
            owner_id: order.owner_id.clone(),
            total_amount: order.total_amount,
            stripe_session_id: order.stripe_session_id.clone(),
            status: order.status,
            created_at: order.created_at,
        };
        inner.orders.push(row.clone());
        for item in &order.items {
            inner.order_items.push(OrderItem {
                id: new_id(),
                order_id: order.id.clone(),
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                price: item.price,
            });
        }
        Ok(row)
    }

    async fn find_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        Ok(self
            .inner
            .lock()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned())
    }

    async fn find_order_by_session(&self, session_id: &str) -> StoreResult<Option<Order>> {
        Ok(self
            .inner
            .lock()
            .orders
            .iter()
            .find(|o| o.stripe_session_id == session_id)
            .cloned())
    }

    async fn list_orders_for_owner(&self, owner_id: &str) -> StoreResult<Vec<OrderDetail>> {
        let inner = self.inner.lock();
        let mut orders: Vec<&Order> = inner
            .orders
            .iter()
            .filter(|o| o.owner_id == owner_id)
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        orders
            .into_iter()
            .map(|order| {
                let items = inner
                    .order_items
                    .iter()
                    .filter(|i| i.order_id == order.id)
                    .map(|item| {
                        Ok(OrderLine {
                            item: item.clone(),
                            product: product_by_id(&inner.products, &item.product_id)?,
                        })
                    })
                    .collect::<StoreResult<Vec<_>>>()?;
                Ok(OrderDetail {
                    order: order.clone(),
                    items,
                })
            })
            .collect()
    }

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        if let Some(order) = inner.orders.iter_mut().find(|o| o.id == order_id) {
            order.status = status;
        }
        Ok(())
    }

    async fn order_totals(&self) -> StoreResult<(Decimal, i64)> {
        let inner = self.inner.lock();
        let revenue = inner.orders.iter().map(|o| o.total_amount).sum();
        Ok((revenue, inner.orders.len() as i64))
    }

    async fn orders_since(&self, since: i64) -> StoreResult<Vec<Order>> {
        Ok(self
            .inner
            .lock()
            .orders
            .iter()
            .filter(|o| o.created_at >= since)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn upsert_user(&self, id: &str, profile: &UserProfile, now: i64) -> StoreResult<User> {
        let mut inner = self.inner.lock();
        let user = inner.users.entry(id.to_string()).or_insert_with(|| User {
            id: id.to_string(),
            email: profile.email.clone(),
            first_name: None,
            last_name: None,
            username: None,
            created_at: now,
            updated_at: now,
        });
        user.email = profile.email.clone();
        user.first_name = profile.first_name.clone();
        user.last_name = profile.last_name.clone();
        user.username = profile.username.clone();
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn count_users(&self) -> StoreResult<i64> {
        Ok(self.inner.lock().users.len() as i64)
    }
}
