use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

use super::MatchEngine;

/// Streak values that trigger the external reward hook.
pub const STREAK_MILESTONES: [i32; 4] = [3, 7, 14, 30];

#[derive(Debug, Serialize)]
pub struct StreakInfo {
    pub streak_count: i32,
    /// False when the streak was already updated today.
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<i32>,
}

impl MatchEngine {
    /// Advances the daily streak. Idempotent per calendar day: a second
    /// call on the same day is a no-op. A call the day after the last
    /// update increments; any longer gap resets to 1.
    ///
    /// Takes `now` explicitly because the whole operation is calendar
    /// arithmetic.
    pub async fn update_streak(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<StreakInfo> {
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        let today = now.date_naive();
        if user.last_streak_date == Some(today) {
            return Ok(StreakInfo {
                streak_count: user.streak_count,
                changed: false,
                milestone: None,
            });
        }

        let streak = match today.pred_opt() {
            Some(yesterday) if user.last_streak_date == Some(yesterday) => user.streak_count + 1,
            _ => 1,
        };

        self.store.set_streak(user_id, streak, today).await?;

        let milestone = STREAK_MILESTONES.contains(&streak).then_some(streak);
        if let Some(days) = milestone {
            tracing::info!(user_id = %user_id, streak = days, "streak milestone reached");
        }

        Ok(StreakInfo {
            streak_count: streak,
            changed: true,
            milestone,
        })
    }

    /// Records that the UI showed today's streak. Independent of whether
    /// the streak itself changed today; idempotent per calendar day.
    /// Returns false when today was already marked.
    pub async fn mark_streak_seen(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let user = self
            .store
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

        let today = now.date_naive();
        if user.streak_seen_on == Some(today) {
            return Ok(false);
        }

        self.store.set_streak_seen(user_id, today).await?;
        Ok(true)
    }
}
