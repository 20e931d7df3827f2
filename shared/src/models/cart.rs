//! Cart Model
//!
//! One cart per user, created lazily and never deleted (only emptied).

use serde::{Deserialize, Serialize};

use super::product::Product;

/// 单个购物车条目的数量上限
///
/// Enforced on every add and by the `cart_items_quantity_check` constraint.
pub const MAX_LINE_QUANTITY: i32 = 999;

/// Cart entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    /// Identity-provider subject of the owner (unique)
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Cart line item; unique per (cart, product)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i32,
}

/// Cart item joined with its product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: Product,
}

/// Cart with its lines, sorted by product ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    #[serde(flatten)]
    pub cart: Cart,
    pub items: Vec<CartLine>,
}

/// Add-to-cart request entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}
