//! Authentication and authorization errors

use gk_core::ErrorBody;
use thiserror::Error;

use crate::jwt::JwtError;

/// Every way a request can be refused.
///
/// All kinds are terminal for the request. The `Display` text is for logs only; clients
/// see the [`ErrorBody`] chosen by the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No credential supplied")]
    CredentialMissing,
    /// Malformed, expired, or badly signed token. Deliberately not more specific.
    #[error("Credential rejected")]
    CredentialInvalid,
    #[error("Principal not found")]
    PrincipalNotFound,
    #[error("Principal is inactive")]
    PrincipalInactive,
    #[error("Tenant is missing or inactive")]
    TenantInvalid,
    #[error("Role rank {actual} does not satisfy ceiling {required}")]
    AuthorizationDenied { required: i32, actual: i32 },
    #[error("Missing permission '{0}'")]
    PermissionDenied(String),
    #[error("Internal verification error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::AuthorizationDenied { .. } | AuthError::PermissionDenied(_) => 403,
            AuthError::Internal(_) => 500,
            _ => 401,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Internal(_))
    }

    /// Default client-facing body for authorization failures
    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            AuthError::AuthorizationDenied { .. } => "Account not authorised",
            AuthError::PermissionDenied(_) => "Permission denied",
            AuthError::Internal(_) => "Internal Server Error",
            _ => "Auth Error",
        };
        ErrorBody::new(self.status_code(), message)
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingFailed(message) => AuthError::Internal(message),
            JwtError::Expired | JwtError::BadSignature | JwtError::Malformed(_) => {
                AuthError::CredentialInvalid
            }
        }
    }
}

impl From<gk_core::GkError> for AuthError {
    fn from(err: gk_core::GkError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
