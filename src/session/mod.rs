//! Session token storage
//!
//! The labeling service authorizes requests with an ID token obtained at
//! login. Components receive a [`SessionStore`] at construction and read the
//! token through it; only account flows write or clear it.

pub mod store;

pub use store::{FileSessionStore, MemorySessionStore};

use crate::error::Result;

/// Holder of the bearer token used to authorize service calls
pub trait SessionStore: Send + Sync {
    /// Current token, if logged in
    fn get_token(&self) -> Option<String>;

    /// Replace the stored token
    fn set_token(&self, token: &str) -> Result<()>;

    /// Forget the stored token
    fn clear_token(&self) -> Result<()>;
}
