//! Session domain model.

use serde::{Deserialize, Serialize};

/// The caller's authenticated identity for the lifetime of a login.
///
/// A session is created at login (or restored from a stored token), read
/// by every request the client makes, and destroyed at logout or token
/// expiry. The token is opaque to the rest of the client beyond the
/// subject identifier decoded out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The caller's user id, decoded from the access token.
    pub user_id: String,
    /// The raw bearer token sent with every request.
    pub token: String,
}

impl Session {
    /// Creates a session from an already-resolved identity.
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }

    /// Resolves a session directly from a raw access token.
    ///
    /// # Errors
    ///
    /// Returns an identity error if the token cannot be decoded.
    pub fn from_token(token: impl Into<String>) -> crate::error::Result<Self> {
        let token = token.into();
        let user_id = super::identity::resolve_user_id(&token)?;
        Ok(Self { user_id, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = Session::new("42", "opaque-token");
        assert_eq!(session.user_id, "42");
        assert_eq!(session.token, "opaque-token");
    }
}
