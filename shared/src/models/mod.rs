//! Data models
//!
//! Shared between the storefront server and its API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are opaque strings; timestamps are Unix epoch milliseconds.

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use cart::*;
pub use category::*;
pub use order::*;
pub use product::*;
pub use user::*;
