use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::engine::compat::QuizAnswers;
use crate::models::UserProfile;

use super::MatchEngine;

/// Partial profile update. One merge/patch contract covers the whole
/// step-by-step setup flow; each field maps to the setup step it
/// completes.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfilePatch {
    #[validate(length(min = 1, max = 100, message = "full_name must be 1-100 characters"))]
    pub full_name: Option<String>,
    pub intentions: Option<Vec<String>>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    pub preference: Option<String>,
    pub photos: Option<Vec<String>>,
    #[validate(length(max = 2000, message = "bio must be at most 2000 characters"))]
    pub bio: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub quiz_answers: Option<QuizAnswers>,
}

/// Setup step completed by the patch: the highest-ranked field present.
/// Quiz answers, bio and coordinates are supplementary and advance
/// nothing.
fn completion_step(patch: &ProfilePatch) -> i32 {
    let steps = [
        (patch.photos.is_some(), 6),
        (patch.preference.is_some(), 5),
        (patch.gender.is_some(), 4),
        (patch.birthday.is_some(), 3),
        (patch.intentions.is_some(), 2),
        (patch.full_name.is_some(), 1),
    ];
    steps
        .iter()
        .find(|(present, _)| *present)
        .map(|(_, step)| *step)
        .unwrap_or(0)
}

impl MatchEngine {
    /// Merge-patches the user's profile, creating it on first use. The
    /// completion step counter only ever moves forward.
    pub async fn apply_profile_patch(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> AppResult<UserProfile> {
        if let Some(ref photos) = patch.photos {
            if photos.len() < 2 {
                return Err(AppError::new(
                    ErrorCode::TooFewPhotos,
                    "please upload at least two photos",
                ));
            }
        }
        if patch.latitude.is_some() != patch.longitude.is_some() {
            return Err(AppError::new(
                ErrorCode::InvalidCoordinates,
                "latitude and longitude must be provided together",
            ));
        }

        if self.store.user_by_id(user_id).await?.is_none() {
            return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
        }

        let step = completion_step(patch);
        self.store.apply_profile_patch(user_id, patch, step).await
    }

    pub async fn submit_quiz(&self, user_id: Uuid, quiz: QuizAnswers) -> AppResult<UserProfile> {
        self.apply_profile_patch(
            user_id,
            &ProfilePatch {
                quiz_answers: Some(quiz),
                ..ProfilePatch::default()
            },
        )
        .await
    }
}
