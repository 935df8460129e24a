use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use amora_shared::errors::AppResult;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::engine::actions::ProfileCard;
use crate::AppState;

/// GET /matches - users on the other end of mutual likes
pub async fn get_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ProfileCard>>>> {
    let matches = state.engine.matched_users(user.id).await?;
    Ok(Json(ApiResponse::ok(matches)))
}

/// GET /liked-me - premium-only pending likers
pub async fn get_liked_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ProfileCard>>>> {
    let likers = state.engine.people_who_liked_me(user.id).await?;
    Ok(Json(ApiResponse::ok(likers)))
}
