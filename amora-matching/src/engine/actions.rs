use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::{PushEvent, PushKind};

use crate::models::InteractionAction;
use crate::store::UserWithProfile;

use super::MatchEngine;

/// Daily LIKE ceiling for non-premium accounts.
pub const DAILY_LIKE_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    #[serde(rename = "match")]
    pub matched: bool,
    #[serde(skip)]
    pub duplicate: bool,
    #[serde(skip)]
    pub interaction_id: Uuid,
}

/// Compact profile summary used by the likers and matches lists.
#[derive(Debug, Serialize)]
pub struct ProfileCard {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub photo: Option<String>,
    pub age: Option<i32>,
}

fn profile_card(row: &UserWithProfile, today: chrono::NaiveDate) -> ProfileCard {
    ProfileCard {
        id: row.user.id,
        full_name: row.profile.as_ref().and_then(|p| p.full_name.clone()),
        photo: row.profile.as_ref().and_then(|p| p.first_photo()),
        age: row.profile.as_ref().and_then(|p| p.age_on(today)),
    }
}

impl MatchEngine {
    /// Records a LIKE or PASS and detects mutual matches.
    ///
    /// The like-limit check runs before anything is written. The store
    /// commits the interaction and the reciprocal `is_match` flip as one
    /// unit; the push notification fires after the commit and its failure
    /// never rolls the interaction back.
    pub async fn record_action(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        action: InteractionAction,
    ) -> AppResult<ActionOutcome> {
        if actor_id == target_id {
            return Err(AppError::new(
                ErrorCode::CannotActOnSelf,
                "cannot swipe on yourself",
            ));
        }

        let actor = self
            .store
            .user_by_id(actor_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        if self.store.user_by_id(target_id).await?.is_none() {
            return Err(AppError::new(ErrorCode::TargetNotFound, "target user not found"));
        }

        let now = Utc::now();
        if action == InteractionAction::Like && !actor.has_premium(now) {
            let midnight = now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .expect("midnight is a valid time")
                .and_utc();
            let likes_today = self.store.count_likes_since(actor_id, midnight).await?;
            if likes_today >= DAILY_LIKE_LIMIT {
                return Err(AppError::new(
                    ErrorCode::DailyLikeLimitExceeded,
                    "daily like limit reached, upgrade to premium for unlimited likes",
                ));
            }
        }

        let outcome = self
            .store
            .record_interaction(actor_id, target_id, action)
            .await?;

        if outcome.duplicate {
            if outcome.interaction.action != action.as_str() {
                return Err(AppError::new(
                    ErrorCode::InteractionConflict,
                    "a different action is already recorded for this user",
                ));
            }
            // Replay of the same swipe is a no-op.
            return Ok(ActionOutcome {
                message: if outcome.interaction.is_match {
                    "It's a match!".to_string()
                } else {
                    "Interaction recorded".to_string()
                },
                matched: outcome.interaction.is_match,
                duplicate: true,
                interaction_id: outcome.interaction.id,
            });
        }

        if outcome.matched {
            self.notifier
                .emit(PushEvent {
                    kind: PushKind::Match,
                    target_user_id: target_id,
                    payload: serde_json::json!({
                        "title": "It's a match!",
                        "body": "You've got a new match!",
                        "from": actor_id,
                    }),
                })
                .await;

            tracing::info!(
                actor_id = %actor_id,
                target_id = %target_id,
                "mutual match created"
            );

            return Ok(ActionOutcome {
                message: "It's a match!".to_string(),
                matched: true,
                duplicate: false,
                interaction_id: outcome.interaction.id,
            });
        }

        Ok(ActionOutcome {
            message: "Interaction recorded".to_string(),
            matched: false,
            duplicate: false,
            interaction_id: outcome.interaction.id,
        })
    }

    /// Premium-only: users whose LIKE is still waiting for an answer.
    /// Reciprocated likes show up in the matches list instead.
    pub async fn people_who_liked_me(&self, user_id: Uuid) -> AppResult<Vec<ProfileCard>> {
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        if !user.has_premium(Utc::now()) {
            return Err(AppError::new(
                ErrorCode::PremiumRequired,
                "upgrade to premium to see who liked you",
            ));
        }

        let today = Utc::now().date_naive();
        let likers = self.store.likers_of(user_id).await?;
        Ok(likers.iter().map(|row| profile_card(row, today)).collect())
    }

    pub async fn matched_users(&self, user_id: Uuid) -> AppResult<Vec<ProfileCard>> {
        let today = Utc::now().date_naive();
        let partners = self.store.matched_partners(user_id).await?;
        Ok(partners.iter().map(|row| profile_card(row, today)).collect())
    }
}
