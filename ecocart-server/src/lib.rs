//! ecocart-server: storefront backend
//!
//! - Catalog browsing and per-user carts
//! - Stripe hosted checkout with exactly-once order fulfillment
//!   (webhook and confirmation page race on the same session)
//! - Order history and an admin financial dashboard
//! - AI budget meal planner matched against live inventory

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod stripe;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
