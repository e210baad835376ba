/// Unified error types for the auth core
use std::time::Duration;
use thiserror::Error;

/// Main error type for authentication operations
///
/// Domain outcomes (wrong password, locked account, bad code) are expressed as
/// typed variants so callers can branch on them; infrastructure faults carry
/// full detail for server-side logging but render as a generic message to
/// clients via [`AuthError::client_message`].
#[derive(Error, Debug)]
pub enum AuthError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Wrong password or unknown account; deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account is locked out after repeated failures
    #[error("Account locked, retry after {retry_after:?}")]
    AccountLocked { retry_after: Duration },

    /// 2FA operation attempted before a secret was provisioned
    #[error("Two-factor setup required")]
    TwoFactorSetupRequired,

    /// TOTP code did not match any accepted time step
    #[error("Invalid two-factor code")]
    InvalidTwoFactorCode,

    /// Temp token failed integrity, expiry, or clock-skew checks
    #[error("Temp token expired or invalid")]
    TempTokenInvalid,

    /// Refresh token not found, revoked, or past expiry
    #[error("Refresh token invalid or expired")]
    RefreshTokenInvalid,

    /// Access token failed signature, expiry, or claim validation
    #[error("Access token invalid or expired")]
    AccessTokenInvalid,

    /// Recovery code did not match any unused code
    #[error("Invalid recovery code")]
    RecoveryCodeInvalid,

    /// 2FA is already enabled on the account
    #[error("Two-factor authentication already enabled")]
    TwoFactorAlreadyEnabled,

    /// 2FA is not enabled on the account
    #[error("Two-factor authentication not enabled")]
    TwoFactorNotEnabled,

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict errors (e.g., duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for infrastructure faults that must not leak detail to clients
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::Database(_) | AuthError::Internal(_) | AuthError::Jwt(_)
        )
    }

    /// User-safe rendering of the error
    ///
    /// Every domain variant is safe to show; infrastructure faults collapse to
    /// a generic message.
    pub fn client_message(&self) -> String {
        if self.is_infrastructure() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Result type alias for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrastructure_errors_do_not_leak() {
        let err = AuthError::Internal("connection string was sqlite://secret".to_string());
        assert_eq!(err.client_message(), "Internal server error");

        let err = AuthError::InvalidCredentials;
        assert_eq!(err.client_message(), "Invalid credentials");
    }
}
