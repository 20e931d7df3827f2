//! Authentication middleware for storefront users and admins

pub mod user_auth;

pub use user_auth::{UserIdentity, admin_guard, user_auth_middleware};
