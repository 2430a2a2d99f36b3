use thiserror::Error;

/// Error type for token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Signing secret too short: minimum {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },

    #[error("Token lifetime pushes expiry out of range")]
    ExpiryOutOfRange,

    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token is expired")]
    TokenExpired,
}

impl TokenError {
    /// Whether the error comes from the signing key rather than a caller's token.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TokenError::SecretTooShort { .. }
                | TokenError::ExpiryOutOfRange
                | TokenError::SigningFailed(_)
        )
    }
}
