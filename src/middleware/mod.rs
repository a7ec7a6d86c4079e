pub mod auth;

pub use auth::{identify, identity_middleware, Identity, Principal};
