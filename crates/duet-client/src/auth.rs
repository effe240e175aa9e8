//! Session resolution and login flow.
//!
//! The session is an explicitly passed object, not ambient state: callers
//! resolve it once (from the token store or by logging in) and hand it to
//! every component that needs it.

use duet_core::error::{DuetError, Result};
use duet_core::session::{ACCESS_TOKEN_KEY, Session, TokenStore};

use crate::api::AuthApi;

/// Login credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Resolves the caller's session from the stored access token.
///
/// # Errors
///
/// Returns an identity error when no token is stored or the stored token
/// cannot be decoded. Callers should treat this as "not logged in" and
/// block entry to conversation views.
pub async fn resolve_session(store: &dyn TokenStore) -> Result<Session> {
    let token = store
        .get(ACCESS_TOKEN_KEY)
        .await
        .ok_or_else(|| DuetError::identity("no access token stored"))?;
    Session::from_token(token)
}

/// Logs in against the backend and persists the received token.
///
/// The token is stored before the session is returned, so a later
/// `resolve_session` sees the same identity.
pub async fn login(
    api: &dyn AuthApi,
    store: &dyn TokenStore,
    credentials: &Credentials,
) -> Result<Session> {
    let token = api.login(&credentials.email, &credentials.password).await?;
    let session = Session::from_token(token.clone())?;
    store.set(ACCESS_TOKEN_KEY, &token).await?;
    tracing::info!("[Auth] Logged in as user {}", session.user_id);
    Ok(session)
}

/// Removes the stored token, ending the session.
pub async fn logout(store: &dyn TokenStore) -> Result<()> {
    store.remove(ACCESS_TOKEN_KEY).await?;
    tracing::info!("[Auth] Logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn token_for(user_id: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let payload =
            URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":{{"id":"{}"}}}}"#, user_id).as_bytes());
        format!("{}.{}.sig", header, payload)
    }

    #[tokio::test]
    async fn test_resolve_session_from_stored_token() {
        let store = MemoryTokenStore::new();
        store.set(ACCESS_TOKEN_KEY, &token_for("u42")).await.unwrap();

        let session = resolve_session(&store).await.unwrap();
        assert_eq!(session.user_id, "u42");
    }

    #[tokio::test]
    async fn test_resolve_session_without_token_is_identity_error() {
        let store = MemoryTokenStore::new();
        let err = resolve_session(&store).await.unwrap_err();
        assert!(err.is_identity());
    }

    #[tokio::test]
    async fn test_resolve_session_with_garbage_token_is_identity_error() {
        let store = MemoryTokenStore::new();
        store.set(ACCESS_TOKEN_KEY, "garbage").await.unwrap();
        let err = resolve_session(&store).await.unwrap_err();
        assert!(err.is_identity());
    }

    struct MockAuthApi {
        token: String,
    }

    #[async_trait::async_trait]
    impl AuthApi for MockAuthApi {
        async fn login(&self, _email: &str, _password: &str) -> Result<String> {
            Ok(self.token.clone())
        }
    }

    #[tokio::test]
    async fn test_login_stores_token_and_resolves_identity() {
        let store = MemoryTokenStore::new();
        let api = MockAuthApi {
            token: token_for("u8"),
        };
        let credentials = Credentials::new("sam@example.com", "hunter2");

        let session = login(&api, &store, &credentials).await.unwrap();
        assert_eq!(session.user_id, "u8");

        // A later resolution sees the same identity.
        let resolved = resolve_session(&store).await.unwrap();
        assert_eq!(resolved, session);
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let store = MemoryTokenStore::new();
        store.set(ACCESS_TOKEN_KEY, &token_for("u1")).await.unwrap();

        logout(&store).await.unwrap();
        assert!(resolve_session(&store).await.is_err());
    }
}
