use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn send_reset_email(
    State(state): State<AppState>,
    Json(body): Json<SendResetEmailRequest>,
) -> Result<ApiSuccess<PasswordResetData>, ApiError> {
    state
        .user_service
        .request_password_reset(&body.email)
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
pub struct SendResetEmailRequest {
    email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordResetData {
    pub email: String,
}
