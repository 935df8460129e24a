use chrono::Utc;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::UserProfile;

use super::MatchEngine;

impl MatchEngine {
    /// Boosts the profile's visibility. Non-premium accounts get one free
    /// boost per calendar day, enforced by the dated claim row; premium
    /// accounts bypass the claim entirely.
    pub async fn boost_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        let now = Utc::now();
        if !user.has_premium(now) {
            let claimed = self
                .store
                .try_claim_daily_boost(user_id, now.date_naive())
                .await?;
            if !claimed {
                return Err(AppError::new(
                    ErrorCode::BoostLimitExceeded,
                    "free boost already used today, upgrade to premium for unlimited boosts",
                ));
            }
        }

        let profile = self
            .store
            .set_boosted_at(user_id, now)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "user profile not found"))?;

        tracing::info!(user_id = %user_id, "profile boosted");
        Ok(profile)
    }
}
