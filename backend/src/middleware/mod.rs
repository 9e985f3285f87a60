//! Request middleware

pub mod auth;

pub use auth::{api_key_middleware, API_KEY_HEADER};
