//! Authorization decisions over verified claims.
//!
//! A privileged request moves through these states:
//!
//! ```text
//! Unauthenticated -> no token          -> MissingToken  (reject)
//!                 -> bad token         -> TokenInvalid  (reject)
//!                 -> expired token     -> TokenExpired  (reject)
//!                 -> ClaimsExtracted   -> !is_admin     -> Denied (reject)
//!                                      -> is_admin      -> Authorized
//! ```
//!
//! The first three are authentication failures. `Denied` is an authorization
//! failure: the caller proved who they are but is not entitled.

use thiserror::Error;

use crate::token::Claims;
use crate::token::TokenCodec;
use crate::token::TokenError;

/// Rejections produced on the way to an authorized request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Administrator privileges required")]
    Denied,
}

impl GuardError {
    /// True when the caller's identity could not be established at all.
    pub fn is_authentication_failure(&self) -> bool {
        !matches!(self, GuardError::Denied)
    }
}

impl From<TokenError> for GuardError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::TokenExpired => GuardError::TokenExpired,
            _ => GuardError::TokenInvalid,
        }
    }
}

/// Turn an optional bearer token into verified claims.
pub fn authenticate_bearer(
    codec: &TokenCodec,
    token: Option<&str>,
) -> Result<Claims, GuardError> {
    let token = token.ok_or(GuardError::MissingToken)?;
    Ok(codec.verify(token)?)
}

/// Permit only administrators. Pure decision over already-verified claims.
pub fn require_admin(claims: &Claims) -> Result<(), GuardError> {
    if claims.is_admin {
        Ok(())
    } else {
        Err(GuardError::Denied)
    }
}

/// Run the whole privileged-request state machine.
pub fn authorize_admin(codec: &TokenCodec, token: Option<&str>) -> Result<Claims, GuardError> {
    let claims = authenticate_bearer(codec, token)?;
    require_admin(&claims)?;
    Ok(claims)
}
