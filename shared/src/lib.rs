//! Shared types for the EcoCart storefront
//!
//! Domain models, the unified error system and small helpers used by the
//! storefront server and its API consumers.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
