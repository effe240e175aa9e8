//! Access-token storage trait.
//!
//! Defines the interface for the scoped key-value store holding the
//! caller's access token. Implementations live in the infrastructure
//! layer (in-memory for tests, file-backed for real use).

/// The key under which the access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Scoped key-value store for credentials.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Stored tokens are never logged or exposed in error messages
/// - Backing files have appropriate permissions where applicable
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Reads a value by key.
    ///
    /// # Returns
    ///
    /// `Some(value)` if the key is present, `None` otherwise. Storage
    /// failures also surface as `None`; a missing token and an unreadable
    /// token mean the same thing to the caller (no session).
    async fn get(&self, key: &str) -> Option<String>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> crate::error::Result<()>;

    /// Removes a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> crate::error::Result<()>;
}
