//! In-memory `MatchStore` used by the engine tests. One mutex guards the
//! whole state, which gives the same pair-serialization the Postgres
//! implementation gets from its advisory lock.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use amora_shared::errors::AppResult;

use crate::engine::profile::ProfilePatch;
use crate::models::{
    statuses, InteractionAction, MatchInteraction, User, UserProfile,
};

use super::{Candidate, CandidateFilter, InteractionOutcome, MatchStore, UserWithProfile};

#[derive(Default)]
struct MemState {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, UserProfile>,
    interactions: Vec<MatchInteraction>,
    boosts: Vec<(Uuid, NaiveDate)>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.state.lock().unwrap().users.insert(user.id, user);
    }

    pub fn insert_profile(&self, profile: UserProfile) {
        self.state
            .lock()
            .unwrap()
            .profiles
            .insert(profile.user_id, profile);
    }

    pub fn insert_interaction(&self, interaction: MatchInteraction) {
        self.state.lock().unwrap().interactions.push(interaction);
    }

    pub fn interactions(&self) -> Vec<MatchInteraction> {
        self.state.lock().unwrap().interactions.clone()
    }

    pub fn interaction_between(&self, actor: Uuid, target: Uuid) -> Option<MatchInteraction> {
        self.state
            .lock()
            .unwrap()
            .interactions
            .iter()
            .find(|i| i.actor_id == actor && i.target_id == target)
            .cloned()
    }
}

#[axum::async_trait]
impl MatchStore for MemoryStore {
    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }

    async fn user_with_profile(&self, id: Uuid) -> AppResult<Option<UserWithProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.get(&id).cloned().map(|user| UserWithProfile {
            profile: state.profiles.get(&id).cloned(),
            user,
        }))
    }

    async fn interacted_target_ids(&self, actor_id: Uuid) -> AppResult<Vec<Uuid>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .interactions
            .iter()
            .filter(|i| i.actor_id == actor_id)
            .map(|i| i.target_id)
            .collect())
    }

    async fn candidates(
        &self,
        requester_id: Uuid,
        filter: &CandidateFilter,
    ) -> AppResult<Vec<Candidate>> {
        let state = self.state.lock().unwrap();
        let mut result: Vec<Candidate> = state
            .users
            .values()
            .filter(|u| u.status == statuses::ACTIVE)
            .filter(|u| u.id != requester_id)
            .filter(|u| !filter.exclude_ids.contains(&u.id))
            .filter_map(|u| {
                let profile = state.profiles.get(&u.id)?;
                if let Some(ref gender) = filter.gender {
                    if profile.gender.as_deref() != Some(gender.as_str()) {
                        return None;
                    }
                }
                Some(Candidate {
                    user: u.clone(),
                    profile: profile.clone(),
                })
            })
            .collect();
        result.sort_by(|a, b| b.user.created_at.cmp(&a.user.created_at));
        Ok(result)
    }

    async fn count_likes_since(&self, actor_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .interactions
            .iter()
            .filter(|i| {
                i.actor_id == actor_id
                    && i.action == InteractionAction::Like.as_str()
                    && i.created_at >= since
            })
            .count() as i64)
    }

    async fn record_interaction(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        action: InteractionAction,
    ) -> AppResult<InteractionOutcome> {
        let mut state = self.state.lock().unwrap();

        if let Some(existing) = state
            .interactions
            .iter()
            .find(|i| i.actor_id == actor_id && i.target_id == target_id)
        {
            return Ok(InteractionOutcome {
                interaction: existing.clone(),
                matched: false,
                duplicate: true,
            });
        }

        let reciprocal_idx = state.interactions.iter().position(|i| {
            i.actor_id == target_id
                && i.target_id == actor_id
                && i.action == InteractionAction::Like.as_str()
        });
        let becomes_match = action == InteractionAction::Like && reciprocal_idx.is_some();

        let interaction = MatchInteraction {
            id: Uuid::now_v7(),
            actor_id,
            target_id,
            action: action.as_str().to_string(),
            is_match: becomes_match,
            created_at: Utc::now(),
        };
        state.interactions.push(interaction.clone());

        if becomes_match {
            if let Some(idx) = reciprocal_idx {
                state.interactions[idx].is_match = true;
            }
        }

        Ok(InteractionOutcome {
            interaction,
            matched: becomes_match,
            duplicate: false,
        })
    }

    async fn likers_of(&self, target_id: Uuid) -> AppResult<Vec<UserWithProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .interactions
            .iter()
            .filter(|i| {
                i.target_id == target_id
                    && i.action == InteractionAction::Like.as_str()
                    && !i.is_match
            })
            .filter_map(|i| {
                state.users.get(&i.actor_id).cloned().map(|user| UserWithProfile {
                    profile: state.profiles.get(&i.actor_id).cloned(),
                    user,
                })
            })
            .collect())
    }

    async fn matched_partners(&self, user_id: Uuid) -> AppResult<Vec<UserWithProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .interactions
            .iter()
            .filter(|i| i.actor_id == user_id && i.is_match)
            .filter_map(|i| {
                state.users.get(&i.target_id).cloned().map(|user| UserWithProfile {
                    profile: state.profiles.get(&i.target_id).cloned(),
                    user,
                })
            })
            .collect())
    }

    async fn try_claim_daily_boost(&self, user_id: Uuid, day: NaiveDate) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.boosts.contains(&(user_id, day)) {
            return Ok(false);
        }
        state.boosts.push((user_id, day));
        Ok(true)
    }

    async fn set_boosted_at(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<UserProfile>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.profiles.get_mut(&user_id).map(|profile| {
            profile.boosted_at = Some(at);
            profile.updated_at = Utc::now();
            profile.clone()
        }))
    }

    async fn set_streak(&self, user_id: Uuid, streak: i32, day: NaiveDate) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.get_mut(&user_id) {
            user.streak_count = streak;
            user.last_streak_date = Some(day);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_streak_seen(&self, user_id: Uuid, day: NaiveDate) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.get_mut(&user_id) {
            user.streak_seen_on = Some(day);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn apply_profile_patch(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
        step: i32,
    ) -> AppResult<UserProfile> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();

        let profile = state
            .profiles
            .entry(user_id)
            .or_insert_with(|| fixtures::empty_profile(user_id));

        if let Some(ref v) = patch.full_name {
            profile.full_name = Some(v.clone());
        }
        if let Some(ref v) = patch.intentions {
            profile.intentions = serde_json::json!(v);
        }
        if let Some(v) = patch.birthday {
            profile.birthday = Some(v);
        }
        if let Some(ref v) = patch.gender {
            profile.gender = Some(v.clone());
        }
        if let Some(ref v) = patch.preference {
            profile.preference = Some(v.clone());
        }
        if let Some(ref v) = patch.bio {
            profile.bio = Some(v.clone());
        }
        if let Some(ref v) = patch.photos {
            profile.photos = serde_json::json!(v);
        }
        if let Some(v) = patch.latitude {
            profile.latitude = Some(v);
        }
        if let Some(v) = patch.longitude {
            profile.longitude = Some(v);
        }
        if let Some(ref v) = patch.quiz_answers {
            profile.quiz_answers = serde_json::json!(v);
        }
        profile.completion_step = profile.completion_step.max(step);
        profile.updated_at = now;

        Ok(profile.clone())
    }
}

/// Builders for seeding the store in tests.
pub mod fixtures {
    use super::*;

    pub fn user(id: Uuid) -> User {
        User {
            id,
            email: format!("{id}@example.com"),
            status: statuses::ACTIVE.to_string(),
            email_verified: true,
            role: "user".to_string(),
            is_premium: false,
            premium_since: None,
            premium_expires: None,
            streak_count: 0,
            last_streak_date: None,
            streak_seen_on: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn premium_user(id: Uuid) -> User {
        User {
            is_premium: true,
            ..user(id)
        }
    }

    pub fn empty_profile(user_id: Uuid) -> UserProfile {
        UserProfile {
            id: Uuid::now_v7(),
            user_id,
            full_name: None,
            intentions: serde_json::json!([]),
            birthday: None,
            gender: None,
            preference: None,
            bio: None,
            photos: serde_json::json!([]),
            latitude: None,
            longitude: None,
            quiz_answers: serde_json::json!({}),
            completion_step: 0,
            boosted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn profile(user_id: Uuid, full_name: &str) -> UserProfile {
        UserProfile {
            full_name: Some(full_name.to_string()),
            photos: serde_json::json!(["a.jpg", "b.jpg"]),
            ..empty_profile(user_id)
        }
    }

    pub fn like(actor_id: Uuid, target_id: Uuid, at: DateTime<Utc>) -> MatchInteraction {
        MatchInteraction {
            id: Uuid::now_v7(),
            actor_id,
            target_id,
            action: InteractionAction::Like.as_str().to_string(),
            is_match: false,
            created_at: at,
        }
    }
}
