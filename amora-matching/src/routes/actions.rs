use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use amora_shared::errors::AppResult;
use amora_shared::types::auth::AuthUser;
use amora_shared::types::ApiResponse;

use crate::engine::actions::ActionOutcome;
use crate::events::publisher;
use crate::models::InteractionAction;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub target_id: Uuid,
}

/// POST /like
pub async fn like_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ActionRequest>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let outcome = state
        .engine
        .record_action(user.id, req.target_id, InteractionAction::Like)
        .await?;

    if !outcome.duplicate {
        publisher::publish_like_sent(&state.rabbitmq, user.id, req.target_id).await;
        if outcome.matched {
            publisher::publish_match_created(
                &state.rabbitmq,
                user.id,
                req.target_id,
                outcome.interaction_id,
            )
            .await;
        }
    }

    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /pass
pub async fn pass_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ActionRequest>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let outcome = state
        .engine
        .record_action(user.id, req.target_id, InteractionAction::Pass)
        .await?;

    Ok(Json(ApiResponse::ok(outcome)))
}
