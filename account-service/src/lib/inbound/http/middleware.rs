use auth::guard::authenticate_bearer;
use auth::guard::GuardError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Validates the bearer token and stores its `auth::Claims` in the request
/// extensions. Role checks happen in the service, so a valid non-admin token
/// passes here and is refused later with 403.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req)?;

    let claims = authenticate_bearer(state.authenticator.token_codec(), token.as_deref())
        .map_err(|e| {
            tracing::warn!(error = %e, "Bearer authentication failed");
            match e {
                GuardError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
                _ => ApiError::Unauthorized("Unauthenticated".to_string()),
            }
        })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// `None` when the header is absent. A present header that is not
/// `Bearer <token>` is rejected outright.
fn bearer_token(req: &Request) -> Result<Option<String>, ApiError> {
    let Some(header) = req.headers().get(http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim().to_string()))
        .ok_or_else(|| {
            ApiError::Unauthorized(
                "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
            )
        })
}
