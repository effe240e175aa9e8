//! Session domain module.
//!
//! This module contains the caller's session identity and the machinery
//! to obtain it: decoding the stored access token and reading the token
//! from a key-value store.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`)
//! - `identity`: Access-token identity decoding (`resolve_user_id`)
//! - `token_store`: Key-value storage trait for the access token

mod identity;
mod model;
mod token_store;

// Re-export public API
pub use identity::resolve_user_id;
pub use model::Session;
pub use token_store::{ACCESS_TOKEN_KEY, TokenStore};
