use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use amora_shared::errors::AppResult;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::UserProfile;
use crate::AppState;

/// POST /boost
pub async fn boost_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = state.engine.boost_profile(user.id).await?;

    if let Some(boosted_at) = profile.boosted_at {
        publisher::publish_profile_boosted(&state.rabbitmq, user.id, boosted_at).await;
    }

    Ok(Json(ApiResponse::ok_with_message(
        profile,
        "Profile boosted successfully",
    )))
}
