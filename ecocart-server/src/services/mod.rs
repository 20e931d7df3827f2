//! Storefront services
//!
//! Functions are generic over the storage ports they need, so they accept
//! both `&dyn Store` (from `AppState`) and concrete stores in tests.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod fulfillment;
pub mod orders;
pub mod planner;
pub mod users;
