use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult};

use crate::engine::profile::ProfilePatch;
use crate::models::{
    statuses, InteractionAction, MatchInteraction, NewInteraction, NewProfileBoost,
    NewUserProfile, UpdateUserProfile, User, UserProfile,
};
use crate::schema::{match_interactions, profile_boosts, user_profiles, users};
use crate::DbPool;

use super::{Candidate, CandidateFilter, InteractionOutcome, MatchStore, UserWithProfile};

pub struct PgMatchStore {
    pool: DbPool,
}

impl PgMatchStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool
            .get()
            .map_err(|e| AppError::internal(format!("database connection error: {e}")))
    }

    /// Batch lookup preserving the order of `ids`.
    fn users_with_profiles(
        conn: &mut PgConnection,
        ids: &[Uuid],
    ) -> QueryResult<Vec<UserWithProfile>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut by_id: std::collections::HashMap<Uuid, UserWithProfile> = users::table
            .left_join(user_profiles::table)
            .filter(users::id.eq_any(ids))
            .load::<(User, Option<UserProfile>)>(conn)?
            .into_iter()
            .map(|(user, profile)| (user.id, UserWithProfile { user, profile }))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

/// Both directions of an unordered pair take the same advisory lock, so
/// racing mutual likes serialize and exactly one of them sees the other's
/// row.
fn lock_pair(conn: &mut PgConnection, a: Uuid, b: Uuid) -> QueryResult<()> {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind::<diesel::sql_types::Text, _>(format!("{lo}:{hi}"))
        .execute(conn)?;
    Ok(())
}

#[axum::async_trait]
impl MatchStore for PgMatchStore {
    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let mut conn = self.conn()?;
        let user = users::table
            .find(id)
            .first::<User>(&mut conn)
            .optional()?;
        Ok(user)
    }

    async fn user_with_profile(&self, id: Uuid) -> AppResult<Option<UserWithProfile>> {
        let mut conn = self.conn()?;
        let row = users::table
            .left_join(user_profiles::table)
            .filter(users::id.eq(id))
            .first::<(User, Option<UserProfile>)>(&mut conn)
            .optional()?;
        Ok(row.map(|(user, profile)| UserWithProfile { user, profile }))
    }

    async fn interacted_target_ids(&self, actor_id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut conn = self.conn()?;
        let ids = match_interactions::table
            .filter(match_interactions::actor_id.eq(actor_id))
            .select(match_interactions::target_id)
            .load::<Uuid>(&mut conn)?;
        Ok(ids)
    }

    async fn candidates(
        &self,
        requester_id: Uuid,
        filter: &CandidateFilter,
    ) -> AppResult<Vec<Candidate>> {
        let mut conn = self.conn()?;

        let mut query = users::table
            .inner_join(user_profiles::table)
            .filter(users::status.eq(statuses::ACTIVE))
            .filter(users::id.ne(requester_id))
            .into_boxed();

        if !filter.exclude_ids.is_empty() {
            query = query.filter(users::id.ne_all(&filter.exclude_ids));
        }
        if let Some(ref gender) = filter.gender {
            query = query.filter(user_profiles::gender.eq(gender));
        }

        let rows = query
            .order(users::created_at.desc())
            .load::<(User, UserProfile)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(user, profile)| Candidate { user, profile })
            .collect())
    }

    async fn count_likes_since(&self, actor_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        let mut conn = self.conn()?;
        let count = match_interactions::table
            .filter(match_interactions::actor_id.eq(actor_id))
            .filter(match_interactions::action.eq(InteractionAction::Like.as_str()))
            .filter(match_interactions::created_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)?;
        Ok(count)
    }

    async fn record_interaction(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        action: InteractionAction,
    ) -> AppResult<InteractionOutcome> {
        let mut conn = self.conn()?;

        let outcome = conn.transaction::<InteractionOutcome, diesel::result::Error, _>(|conn| {
            lock_pair(conn, actor_id, target_id)?;

            let reciprocal = match_interactions::table
                .filter(match_interactions::actor_id.eq(target_id))
                .filter(match_interactions::target_id.eq(actor_id))
                .filter(match_interactions::action.eq(InteractionAction::Like.as_str()))
                .first::<MatchInteraction>(conn)
                .optional()?;

            let becomes_match = action == InteractionAction::Like && reciprocal.is_some();

            let inserted = diesel::insert_into(match_interactions::table)
                .values(&NewInteraction {
                    actor_id,
                    target_id,
                    action: action.as_str().to_string(),
                    is_match: becomes_match,
                })
                .on_conflict((
                    match_interactions::actor_id,
                    match_interactions::target_id,
                ))
                .do_nothing()
                .get_result::<MatchInteraction>(conn)
                .optional()?;

            match inserted {
                Some(interaction) => {
                    if becomes_match {
                        if let Some(ref reciprocal) = reciprocal {
                            diesel::update(match_interactions::table.find(reciprocal.id))
                                .set(match_interactions::is_match.eq(true))
                                .execute(conn)?;
                        }
                    }
                    Ok(InteractionOutcome {
                        interaction,
                        matched: becomes_match,
                        duplicate: false,
                    })
                }
                None => {
                    // Lost the uniqueness race (or a straight double-submit);
                    // surface the existing edge as a no-op.
                    let existing = match_interactions::table
                        .filter(match_interactions::actor_id.eq(actor_id))
                        .filter(match_interactions::target_id.eq(target_id))
                        .first::<MatchInteraction>(conn)?;
                    Ok(InteractionOutcome {
                        interaction: existing,
                        matched: false,
                        duplicate: true,
                    })
                }
            }
        })?;

        Ok(outcome)
    }

    async fn likers_of(&self, target_id: Uuid) -> AppResult<Vec<UserWithProfile>> {
        let mut conn = self.conn()?;
        let liker_ids = match_interactions::table
            .filter(match_interactions::target_id.eq(target_id))
            .filter(match_interactions::action.eq(InteractionAction::Like.as_str()))
            .filter(match_interactions::is_match.eq(false))
            .order(match_interactions::created_at.desc())
            .select(match_interactions::actor_id)
            .load::<Uuid>(&mut conn)?;

        Ok(Self::users_with_profiles(&mut conn, &liker_ids)?)
    }

    async fn matched_partners(&self, user_id: Uuid) -> AppResult<Vec<UserWithProfile>> {
        let mut conn = self.conn()?;
        let partner_ids = match_interactions::table
            .filter(match_interactions::actor_id.eq(user_id))
            .filter(match_interactions::is_match.eq(true))
            .order(match_interactions::created_at.desc())
            .select(match_interactions::target_id)
            .load::<Uuid>(&mut conn)?;

        Ok(Self::users_with_profiles(&mut conn, &partner_ids)?)
    }

    async fn try_claim_daily_boost(&self, user_id: Uuid, day: NaiveDate) -> AppResult<bool> {
        let mut conn = self.conn()?;
        let claimed = diesel::insert_into(profile_boosts::table)
            .values(&NewProfileBoost {
                user_id,
                boosted_on: day,
            })
            .on_conflict((profile_boosts::user_id, profile_boosts::boosted_on))
            .do_nothing()
            .execute(&mut conn)?;
        Ok(claimed == 1)
    }

    async fn set_boosted_at(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<UserProfile>> {
        let mut conn = self.conn()?;
        let profile = diesel::update(user_profiles::table.filter(user_profiles::user_id.eq(user_id)))
            .set((
                user_profiles::boosted_at.eq(Some(at)),
                user_profiles::updated_at.eq(Utc::now()),
            ))
            .get_result::<UserProfile>(&mut conn)
            .optional()?;
        Ok(profile)
    }

    async fn set_streak(&self, user_id: Uuid, streak: i32, day: NaiveDate) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::update(users::table.find(user_id))
            .set((
                users::streak_count.eq(streak),
                users::last_streak_date.eq(Some(day)),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    async fn set_streak_seen(&self, user_id: Uuid, day: NaiveDate) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::update(users::table.find(user_id))
            .set((
                users::streak_seen_on.eq(Some(day)),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        Ok(())
    }

    async fn apply_profile_patch(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
        step: i32,
    ) -> AppResult<UserProfile> {
        let mut conn = self.conn()?;

        let profile = conn.transaction::<UserProfile, diesel::result::Error, _>(|conn| {
            let existing = user_profiles::table
                .filter(user_profiles::user_id.eq(user_id))
                .for_update()
                .first::<UserProfile>(conn)
                .optional()?;

            match existing {
                Some(profile) => {
                    let changes = UpdateUserProfile {
                        full_name: patch.full_name.clone(),
                        intentions: patch.intentions.as_ref().map(|v| serde_json::json!(v)),
                        birthday: patch.birthday,
                        gender: patch.gender.clone(),
                        preference: patch.preference.clone(),
                        bio: patch.bio.clone(),
                        photos: patch.photos.as_ref().map(|v| serde_json::json!(v)),
                        latitude: patch.latitude,
                        longitude: patch.longitude,
                        quiz_answers: patch.quiz_answers.as_ref().map(|v| serde_json::json!(v)),
                    };
                    diesel::update(user_profiles::table.find(profile.id))
                        .set((
                            &changes,
                            user_profiles::completion_step
                                .eq(profile.completion_step.max(step)),
                            user_profiles::updated_at.eq(Utc::now()),
                        ))
                        .get_result::<UserProfile>(conn)
                }
                None => diesel::insert_into(user_profiles::table)
                    .values(&NewUserProfile {
                        user_id,
                        full_name: patch.full_name.clone(),
                        intentions: patch.intentions.as_ref().map(|v| serde_json::json!(v)),
                        birthday: patch.birthday,
                        gender: patch.gender.clone(),
                        preference: patch.preference.clone(),
                        bio: patch.bio.clone(),
                        photos: patch.photos.as_ref().map(|v| serde_json::json!(v)),
                        latitude: patch.latitude,
                        longitude: patch.longitude,
                        quiz_answers: patch.quiz_answers.as_ref().map(|v| serde_json::json!(v)),
                        completion_step: step,
                    })
                    .get_result::<UserProfile>(conn),
            }
        })?;

        Ok(profile)
    }
}
