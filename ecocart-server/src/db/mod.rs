//! Database access layer (PostgreSQL)

pub mod carts;
pub mod catalog;
pub mod orders;
pub mod users;
