//! Bearer-token authentication.
//!
//! HS256 JWTs carrying `user_id`, `tenant_id`, `role` (defaults to
//! Viewer when absent) and `exp`. Validation fails closed: a missing,
//! malformed, or expired token is 401 before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use lintel_core::errors::AuthError;
use lintel_core::model::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// Raw claims as they appear in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub exp: i64,
}

/// Verified caller identity, attached to every authenticated request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub tenant_id: String,
    pub role: Role,
}

impl AuthContext {
    /// Admin/Owner gate for mutating routes.
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.role.can_administer() {
            Ok(())
        } else {
            Err(AuthError::Forbidden { required: "Admin" })
        }
    }
}

/// Extract the Bearer token from the Authorization header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Decode and validate a token against the shared secret.
pub fn verify_token(token: &str, secret: &str, leeway_secs: u64) -> Result<AuthContext, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = leeway_secs;
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken(e.to_string()),
    })?;

    let claims = data.claims;
    Ok(AuthContext {
        user_id: claims.user_id,
        tenant_id: claims.tenant_id,
        role: claims.role.unwrap_or(Role::Viewer),
    })
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let context = verify_token(token, state.jwt_secret(), state.leeway_secs())?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use lintel_core::time::now_epoch_secs;

    const SECRET: &str = "test-secret";

    fn token(role: Option<Role>, exp: i64) -> String {
        let claims = Claims {
            user_id: "u1".to_string(),
            tenant_id: "t1".to_string(),
            role,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn extract_bearer_token_variants() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), Some("abc123"));

        let empty = HeaderMap::new();
        assert_eq!(extract_bearer_token(&empty), None);

        let mut basic = HeaderMap::new();
        basic.insert("Authorization", "Basic abc123".parse().unwrap());
        assert_eq!(extract_bearer_token(&basic), None);
    }

    #[test]
    fn valid_token_round_trips() {
        let raw = token(Some(Role::Admin), now_epoch_secs() + 600);
        let ctx = verify_token(&raw, SECRET, 0).unwrap();
        assert_eq!(ctx.user_id, "u1");
        assert_eq!(ctx.tenant_id, "t1");
        assert_eq!(ctx.role, Role::Admin);
        assert!(ctx.require_admin().is_ok());
    }

    #[test]
    fn missing_role_defaults_to_viewer() {
        let raw = token(None, now_epoch_secs() + 600);
        let ctx = verify_token(&raw, SECRET, 0).unwrap();
        assert_eq!(ctx.role, Role::Viewer);
        assert!(matches!(
            ctx.require_admin(),
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let raw = token(Some(Role::Owner), now_epoch_secs() - 600);
        assert!(matches!(
            verify_token(&raw, SECRET, 0),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let raw = token(Some(Role::Owner), now_epoch_secs() + 600);
        assert!(matches!(
            verify_token(&raw, "other-secret", 0),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            verify_token("not.a.jwt", SECRET, 0),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
