//! Access-token identity decoding.
//!
//! The backend issues JWT-shaped access tokens. The client never verifies
//! the signature (that is the server's job); it only needs the subject
//! identifier embedded in the payload segment so it can tell its own
//! messages apart from the peer's.

use crate::error::{DuetError, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

/// Claim layouts observed across token issuers.
///
/// The subject may be an object carrying an `id`, a bare string, or the
/// issuer may put the id at the top level instead. Callers must be
/// resilient to all three.
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default)]
    id: Option<serde_json::Value>,
}

/// Decodes the caller's user id out of an access token.
///
/// Pure decode, no side effects and no network.
///
/// # Errors
///
/// Returns `DuetError::Identity` when the token is empty, not structured
/// as a JWT, or its payload carries no usable subject.
pub fn resolve_user_id(token: &str) -> Result<String> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DuetError::identity("access token is empty"));
    }

    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next()) {
        (Some(_header), Some(payload)) if !payload.is_empty() => payload,
        _ => {
            return Err(DuetError::identity(
                "access token is not a three-segment JWT",
            ));
        }
    };

    // Tokens in the wild vary on padding; strip it before decoding.
    let payload = payload.trim_end_matches('=');
    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| DuetError::identity(format!("token payload is not base64url: {}", e)))?;

    let claims: Claims = serde_json::from_slice(&decoded)
        .map_err(|e| DuetError::identity(format!("token payload is not valid JSON: {}", e)))?;

    subject_id(&claims)
        .ok_or_else(|| DuetError::identity("token payload carries no subject identifier"))
}

/// Extracts the subject id, trying `sub.id`, then `sub`, then `id`.
fn subject_id(claims: &Claims) -> Option<String> {
    if let Some(sub) = &claims.sub {
        match sub {
            serde_json::Value::Object(map) => {
                if let Some(id) = map.get("id") {
                    return value_to_id(id);
                }
            }
            other => {
                if let Some(id) = value_to_id(other) {
                    return Some(id);
                }
            }
        }
    }
    claims.id.as_ref().and_then(value_to_id)
}

/// Ids appear as strings or bare integers depending on the backend build.
fn value_to_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds an unsigned JWT with the given payload JSON.
    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_object_subject() {
        let token = token_with_payload(&serde_json::json!({"sub": {"id": "user-7"}}));
        assert_eq!(resolve_user_id(&token).unwrap(), "user-7");
    }

    #[test]
    fn test_string_subject() {
        let token = token_with_payload(&serde_json::json!({"sub": "user-9"}));
        assert_eq!(resolve_user_id(&token).unwrap(), "user-9");
    }

    #[test]
    fn test_numeric_subject() {
        let token = token_with_payload(&serde_json::json!({"sub": 42}));
        assert_eq!(resolve_user_id(&token).unwrap(), "42");
    }

    #[test]
    fn test_top_level_id_fallback() {
        let token = token_with_payload(&serde_json::json!({"id": "user-3", "exp": 0}));
        assert_eq!(resolve_user_id(&token).unwrap(), "user-3");
    }

    #[test]
    fn test_object_subject_wins_over_fallback() {
        let token = token_with_payload(&serde_json::json!({"sub": {"id": "a"}, "id": "b"}));
        assert_eq!(resolve_user_id(&token).unwrap(), "a");
    }

    #[test]
    fn test_padded_payload_accepted() {
        use base64::engine::general_purpose::URL_SAFE;
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let body = URL_SAFE.encode(br#"{"sub":"padded"}"#);
        let token = format!("{}.{}.sig", header, body);
        assert_eq!(resolve_user_id(&token).unwrap(), "padded");
    }

    #[test]
    fn test_empty_token_rejected() {
        let err = resolve_user_id("   ").unwrap_err();
        assert!(err.is_identity());
    }

    #[test]
    fn test_non_jwt_rejected() {
        assert!(resolve_user_id("not-a-jwt").unwrap_err().is_identity());
    }

    #[test]
    fn test_garbage_payload_rejected() {
        assert!(resolve_user_id("aGVhZGVy.!!!.sig").unwrap_err().is_identity());
    }

    #[test]
    fn test_payload_without_subject_rejected() {
        let token = token_with_payload(&serde_json::json!({"exp": 123}));
        let err = resolve_user_id(&token).unwrap_err();
        assert!(err.is_identity());
    }
}
