//! Storage ports
//!
//! Each aggregate gets its own trait so services can ask for exactly what
//! they touch (`S: CartStore + OrderStore + ?Sized`). [`Store`] bundles all of
//! them for `AppState`, which holds an `Arc<dyn Store>`.
//!
//! Two adapters:
//! - [`postgres::PgStore`]: production, backed by the `db` query modules
//! - [`memory::MemoryStore`]: development without a database, and tests

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    Cart, CartItem, CartLine, Category, NewOrder, Order, OrderDetail, OrderStatus, Product, User,
    UserProfile,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by storage adapters
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique key already exists (the conflicting constraint or key)
    #[error("duplicate key: {0}")]
    Duplicate(String),
    /// A check constraint refused the write (the constraint name)
    #[error("constraint violated: {0}")]
    Constraint(String),
    /// Anything else the backend reports
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                StoreError::Constraint(db.constraint().unwrap_or("check").to_string())
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Products and categories
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All products ordered by name
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// Newest products first
    async fn newest_products(&self, limit: i64) -> StoreResult<Vec<Product>>;

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>>;

    async fn find_product_by_name(&self, name: &str) -> StoreResult<Option<Product>>;

    async fn insert_product(&self, product: &Product) -> StoreResult<()>;

    /// Categories ordered by name
    async fn list_categories(&self, limit: Option<i64>) -> StoreResult<Vec<Category>>;

    async fn find_category_by_slug(&self, slug: &str) -> StoreResult<Option<Category>>;

    async fn insert_category(&self, category: &Category) -> StoreResult<()>;
}

/// Carts and cart items
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_cart(&self, cart_id: &str) -> StoreResult<Option<Cart>>;

    async fn find_cart_by_owner(&self, owner_id: &str) -> StoreResult<Option<Cart>>;

    /// Return the owner's cart, creating it on first use
    async fn get_or_create_cart(&self, owner_id: &str, now: i64) -> StoreResult<Cart>;

    /// Insert a line or add `quantity` to the existing (cart, product) line.
    ///
    /// Fails with [`StoreError::Constraint`] when the resulting quantity would
    /// exceed [`MAX_LINE_QUANTITY`](shared::models::MAX_LINE_QUANTITY); the
    /// line is left unchanged.
    async fn upsert_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i32,
        now: i64,
    ) -> StoreResult<CartItem>;

    async fn find_item(&self, item_id: &str) -> StoreResult<Option<CartItem>>;

    /// Returns whether a row was deleted
    async fn delete_item(&self, item_id: &str) -> StoreResult<bool>;

    /// Cart lines with products, sorted by product ID
    async fn list_lines(&self, cart_id: &str) -> StoreResult<Vec<CartLine>>;

    /// Delete every item of the cart; the cart row stays. Returns rows removed.
    async fn clear_cart(&self, cart_id: &str) -> StoreResult<u64>;
}

/// Orders and order items
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert order and items atomically.
    ///
    /// Fails with [`StoreError::Duplicate`] when an order already exists for
    /// `order.stripe_session_id`.
    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order>;

    async fn find_order(&self, order_id: &str) -> StoreResult<Option<Order>>;

    async fn find_order_by_session(&self, session_id: &str) -> StoreResult<Option<Order>>;

    /// Owner's orders, newest first, with lines
    async fn list_orders_for_owner(&self, owner_id: &str) -> StoreResult<Vec<OrderDetail>>;

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<()>;

    /// Sum of order totals and order count
    async fn order_totals(&self) -> StoreResult<(Decimal, i64)>;

    /// Orders created at or after `since` (epoch millis)
    async fn orders_since(&self, since: i64) -> StoreResult<Vec<Order>>;
}

/// Local user mirror
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn upsert_user(&self, id: &str, profile: &UserProfile, now: i64) -> StoreResult<User>;

    async fn count_users(&self) -> StoreResult<i64>;
}

/// Every port in one object
pub trait Store: CatalogStore + CartStore + OrderStore + UserStore {}

impl<T> Store for T where T: CatalogStore + CartStore + OrderStore + UserStore {}
