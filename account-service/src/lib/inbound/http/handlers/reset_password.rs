use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::send_reset_email::PasswordResetData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::RawPassword;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<PasswordResetData>, ApiError> {
    let password = RawPassword::new(body.password).map_err(UserError::from)?;

    state
        .user_service
        .reset_password(&body.token, password)
        .await
        .map_err(ApiError::from)
        .map(|email| {
            ApiSuccess::new(
                StatusCode::OK,
                PasswordResetData {
                    email: email.to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    token: String,
    password: String,
}
