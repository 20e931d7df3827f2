//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in major currency units
    pub price: Decimal,
    pub image: String,
    pub stock: i32,
    /// Category reference (String ID)
    pub category_id: Option<String>,
    /// Nutrition facts per serving (all optional)
    pub calories: Option<i32>,
    pub protein: Option<Decimal>,
    pub carbs: Option<Decimal>,
    pub fat: Option<Decimal>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload (seed files)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub stock: i32,
    /// Category slug, resolved to an ID at insert time
    pub category: Option<String>,
    pub calories: Option<i32>,
    pub protein: Option<Decimal>,
    pub carbs: Option<Decimal>,
    pub fat: Option<Decimal>,
}

impl Product {
    /// Build a product row from a create payload
    pub fn from_create(
        id: String,
        category_id: Option<String>,
        data: ProductCreate,
        now: i64,
    ) -> Self {
        Self {
            id,
            name: data.name,
            description: data.description,
            price: data.price,
            image: data.image,
            stock: data.stock,
            category_id,
            calories: data.calories,
            protein: data.protein,
            carbs: data.carbs,
            fat: data.fat,
            created_at: now,
            updated_at: now,
        }
    }
}
