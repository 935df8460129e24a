use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::engine::feed::{MatchFeed, MatchFilters};
use crate::AppState;

/// GET /feed - ranked candidates, broadened when filters empty the page
pub async fn get_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(filters): Query<MatchFilters>,
) -> AppResult<Json<ApiResponse<MatchFeed>>> {
    filters
        .validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let feed = state.engine.potential_matches(user.id, &filters).await?;
    Ok(Json(ApiResponse::ok(feed)))
}

/// GET /search - literal filtered search, no broadening
pub async fn search_users(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(filters): Query<MatchFilters>,
) -> AppResult<Json<ApiResponse<MatchFeed>>> {
    filters
        .validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let feed = state.engine.search_users(user.id, &filters).await?;
    Ok(Json(ApiResponse::ok(feed)))
}
