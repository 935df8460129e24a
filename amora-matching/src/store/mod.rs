use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use amora_shared::errors::AppResult;

use crate::engine::profile::ProfilePatch;
use crate::models::{InteractionAction, MatchInteraction, User, UserProfile};

mod postgres;
pub use postgres::PgMatchStore;

#[cfg(test)]
pub mod memory;

/// A user together with their optional profile row.
#[derive(Debug, Clone)]
pub struct UserWithProfile {
    pub user: User,
    pub profile: Option<UserProfile>,
}

/// A feed candidate; the candidate query inner-joins profiles, so the
/// profile is always present here.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub user: User,
    pub profile: UserProfile,
}

/// Narrowing applied at the database level when building the candidate
/// pool. Status is always `active` and a profile row is always required;
/// only the optional parts vary.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    pub exclude_ids: Vec<Uuid>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InteractionOutcome {
    pub interaction: MatchInteraction,
    /// This call completed a mutual LIKE pair.
    pub matched: bool,
    /// The (actor, target) edge already existed; nothing was written.
    pub duplicate: bool,
}

/// Repository gateway for everything the match engine reads or writes.
///
/// The engine owns no connection state; implementations own their pool.
/// `record_interaction` is the one transactional unit: the reciprocal
/// check, the insert, and the `is_match` flip commit or fail together.
#[axum::async_trait]
pub trait MatchStore: Send + Sync {
    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn user_with_profile(&self, id: Uuid) -> AppResult<Option<UserWithProfile>>;

    /// Ids of every user the actor has already LIKEd or PASSed.
    async fn interacted_target_ids(&self, actor_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Active users with a profile, excluding the requester and the
    /// filter's exclusion set.
    async fn candidates(&self, requester_id: Uuid, filter: &CandidateFilter)
        -> AppResult<Vec<Candidate>>;

    async fn count_likes_since(&self, actor_id: Uuid, since: DateTime<Utc>) -> AppResult<i64>;

    async fn record_interaction(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        action: InteractionAction,
    ) -> AppResult<InteractionOutcome>;

    /// Users whose LIKE on `target_id` has not been reciprocated yet.
    async fn likers_of(&self, target_id: Uuid) -> AppResult<Vec<UserWithProfile>>;

    /// Users on the other end of the requester's mutual matches.
    async fn matched_partners(&self, user_id: Uuid) -> AppResult<Vec<UserWithProfile>>;

    /// Claims the free boost for the day. Returns false when the day's
    /// boost was already used.
    async fn try_claim_daily_boost(&self, user_id: Uuid, day: NaiveDate) -> AppResult<bool>;

    async fn set_boosted_at(&self, user_id: Uuid, at: DateTime<Utc>)
        -> AppResult<Option<UserProfile>>;

    async fn set_streak(&self, user_id: Uuid, streak: i32, day: NaiveDate) -> AppResult<()>;

    async fn set_streak_seen(&self, user_id: Uuid, day: NaiveDate) -> AppResult<()>;

    /// Merge-patches the profile, creating the row when missing. The
    /// completion step only ever moves forward.
    async fn apply_profile_patch(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
        step: i32,
    ) -> AppResult<UserProfile>;
}
