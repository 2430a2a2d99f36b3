use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::login::LoginRequestBody;
use super::login::LoginResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn admin_login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    state
        .user_service
        .admin_login(&body.email, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|ref login| ApiSuccess::new(StatusCode::OK, login.into()))
}
