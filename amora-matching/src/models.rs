use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::compat::QuizAnswers;
use crate::schema::{match_interactions, profile_boosts, user_profiles, users};

pub mod statuses {
    pub const PENDING: &str = "pending";
    pub const ACTIVE: &str = "active";
    pub const SUSPENDED: &str = "suspended";
    pub const DELETED: &str = "deleted";
}

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub status: String,
    pub email_verified: bool,
    pub role: String,
    pub is_premium: bool,
    pub premium_since: Option<DateTime<Utc>>,
    pub premium_expires: Option<DateTime<Utc>>,
    pub streak_count: i32,
    pub last_streak_date: Option<NaiveDate>,
    pub streak_seen_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Premium is effective while the flag is set and the validity window,
    /// when bounded, has not elapsed.
    pub fn has_premium(&self, now: DateTime<Utc>) -> bool {
        self.is_premium && self.premium_expires.map_or(true, |exp| exp > now)
    }
}

// --- UserProfile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_profiles)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub intentions: serde_json::Value,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    pub preference: Option<String>,
    pub bio: Option<String>,
    pub photos: serde_json::Value,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub quiz_answers: serde_json::Value,
    pub completion_step: i32,
    pub boosted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.birthday
            .and_then(|b| today.years_since(b))
            .map(|y| y as i32)
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }

    /// Parsed quiz answers; `None` when the stored value is not a
    /// category -> tags object (profiles that never took the quiz).
    pub fn quiz(&self) -> Option<QuizAnswers> {
        serde_json::from_value(self.quiz_answers.clone()).ok()
    }

    pub fn photo_urls(&self) -> Vec<String> {
        serde_json::from_value(self.photos.clone()).unwrap_or_default()
    }

    pub fn first_photo(&self) -> Option<String> {
        self.photo_urls().into_iter().next()
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_profiles)]
pub struct NewUserProfile {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub intentions: Option<serde_json::Value>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    pub preference: Option<String>,
    pub bio: Option<String>,
    pub photos: Option<serde_json::Value>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub quiz_answers: Option<serde_json::Value>,
    pub completion_step: i32,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = user_profiles)]
pub struct UpdateUserProfile {
    pub full_name: Option<String>,
    pub intentions: Option<serde_json::Value>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    pub preference: Option<String>,
    pub bio: Option<String>,
    pub photos: Option<serde_json::Value>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub quiz_answers: Option<serde_json::Value>,
}

// --- MatchInteraction ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = match_interactions)]
pub struct MatchInteraction {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub action: String,
    pub is_match: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = match_interactions)]
pub struct NewInteraction {
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub action: String,
    pub is_match: bool,
}

// --- ProfileBoost ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profile_boosts)]
pub struct ProfileBoost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub boosted_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profile_boosts)]
pub struct NewProfileBoost {
    pub user_id: Uuid,
    pub boosted_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionAction {
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "PASS")]
    Pass,
}

impl InteractionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Pass => "PASS",
        }
    }
}

impl std::fmt::Display for InteractionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
