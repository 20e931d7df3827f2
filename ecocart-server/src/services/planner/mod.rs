//! AI budget meal planner
//!
//! Sends the constraints and the full catalog to the completion API, then
//! resolves the returned shopping list against real products.

pub mod matcher;

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shared::models::Product;
use validator::Validate;

use crate::error::{ShopError, ShopResult};
use crate::llm::{CompletionClient, CompletionRequest};
use crate::store::CatalogStore;

const SYSTEM_PROMPT: &str = "You are a helpful meal planning assistant.";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlanRequest {
    /// Total budget in major currency units
    #[validate(range(min = 1.0, message = "budget must be at least 1"))]
    pub budget: f64,
    #[validate(range(min = 1, max = 30, message = "days must be between 1 and 30"))]
    pub days: i32,
    #[validate(range(min = 1, message = "people must be at least 1"))]
    pub people: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub day: i32,
    pub meal_type: String,
    pub name: String,
    pub ingredients: Vec<String>,
}

/// Raw model output
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanDraft {
    meals: Vec<Meal>,
    shopping_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub meals: Vec<Meal>,
    /// Matched catalog products, deduplicated
    pub products: Vec<Product>,
    /// One unit of each matched product
    pub total_cost: Decimal,
    /// May be negative
    pub remaining_budget: Decimal,
}

fn plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "meals": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "day": { "type": "integer" },
                        "mealType": { "type": "string" },
                        "name": { "type": "string" },
                        "ingredients": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["day", "mealType", "name", "ingredients"],
                    "additionalProperties": false
                }
            },
            "shoppingList": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["meals", "shoppingList"],
        "additionalProperties": false
    })
}

fn user_prompt(request: &PlanRequest, catalog: &[Product]) -> String {
    let product_lines = catalog
        .iter()
        .map(|p| format!("- {} (${})", p.name, p.price))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create a meal plan for {people} people for {days} days with a total budget of ${budget}.\n\
         Only use products from this list for the shopping list:\n\
         {product_lines}\n\n\
         Return the meals and a shopping list using the exact product names above, \
         keeping the total cost within the budget.",
        people = request.people,
        days = request.days,
        budget = request.budget,
    )
}

/// Validate, ask the model, resolve the shopping list.
///
/// Validation happens before any catalog read or completion call. Nothing is
/// persisted.
pub async fn generate_plan<S>(
    store: &S,
    client: &dyn CompletionClient,
    request: &PlanRequest,
) -> ShopResult<MealPlan>
where
    S: CatalogStore + ?Sized,
{
    if !request.budget.is_finite() {
        return Err(ShopError::invalid("budget must be a finite number"));
    }
    request.validate()?;
    let budget = Decimal::from_f64(request.budget)
        .ok_or_else(|| ShopError::invalid("budget out of range"))?;

    let catalog = store.list_products().await?;

    let schema = plan_schema();
    let prompt = user_prompt(request, &catalog);
    let raw = client
        .complete_json(CompletionRequest {
            system: SYSTEM_PROMPT,
            user: &prompt,
            schema_name: "meal_plan",
            schema: &schema,
        })
        .await?;
    let draft: PlanDraft =
        serde_json::from_value(raw).map_err(|e| ShopError::PlanGeneration(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut products = Vec::new();
    for entry in &draft.shopping_list {
        match matcher::resolve(entry, &catalog) {
            Some(p) if seen.insert(p.id.clone()) => products.push(p.clone()),
            Some(_) => {}
            None => tracing::debug!(entry = %entry, "Shopping list entry has no catalog match"),
        }
    }

    let total_cost: Decimal = products.iter().map(|p| p.price).sum();
    tracing::info!(
        meals = draft.meals.len(),
        requested = draft.shopping_list.len(),
        matched = products.len(),
        total_cost = %total_cost,
        "Meal plan generated"
    );

    Ok(MealPlan {
        meals: draft.meals,
        products,
        total_cost,
        remaining_budget: budget - total_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation_bounds() {
        let ok = PlanRequest { budget: 50.0, days: 30, people: 1 };
        assert!(ok.validate().is_ok());

        let too_many_days = PlanRequest { budget: 50.0, days: 31, people: 1 };
        assert!(too_many_days.validate().is_err());

        let no_budget = PlanRequest { budget: 0.0, days: 3, people: 1 };
        assert!(no_budget.validate().is_err());

        let nobody = PlanRequest { budget: 50.0, days: 3, people: 0 };
        assert!(nobody.validate().is_err());
    }

    #[test]
    fn test_prompt_lists_products_with_prices() {
        let product = Product {
            id: "p1".into(),
            name: "Oat Milk".into(),
            description: None,
            price: Decimal::new(350, 2),
            image: String::new(),
            stock: 1,
            category_id: None,
            calories: None,
            protein: None,
            carbs: None,
            fat: None,
            created_at: 0,
            updated_at: 0,
        };
        let prompt = user_prompt(&PlanRequest { budget: 40.0, days: 2, people: 3 }, &[product]);
        assert!(prompt.contains("- Oat Milk ($3.50)"));
        assert!(prompt.contains("3 people for 2 days"));
    }
}
