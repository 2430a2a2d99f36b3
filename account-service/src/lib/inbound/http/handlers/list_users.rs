use auth::Claims;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::IdentityData;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ApiSuccess<Vec<IdentityData>>, ApiError> {
    let term = query.search.unwrap_or_default();

    state
        .user_service
        .search_users(&claims, &term)
        .await
        .map_err(ApiError::from)
        .map(|users| ApiSuccess::new(StatusCode::OK, users.iter().map(IdentityData::from).collect()))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    search: Option<String>,
}
