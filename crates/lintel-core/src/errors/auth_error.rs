//! Authentication and authorization errors.

use super::error_code::{self, LintelErrorCode};

/// Token validation fails closed: every variant except `Forbidden`
/// maps to 401 at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("insufficient role: {required} required")]
    Forbidden { required: &'static str },
}

impl LintelErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        error_code::AUTH_ERROR
    }
}
