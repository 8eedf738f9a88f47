// File: ./src/client/mod.rs
pub mod auth;
pub mod core;
pub mod middleware;

pub use crate::client::auth::UnauthorizedHook;
pub use crate::client::core::ApiClient;
