use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use amora_shared::errors::{AppError, AppResult, ErrorCode};
use amora_shared::types::PaginationParams;

use crate::engine::compat::{self, QuizAnswers};
use crate::store::{Candidate, CandidateFilter};

use super::MatchEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    /// Default ranking: compatibility score, best first.
    #[default]
    #[serde(rename = "recent")]
    Recent,
    #[serde(rename = "age-asc")]
    AgeAsc,
    #[serde(rename = "age-desc")]
    AgeDesc,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MatchFilters {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub gender: Option<String>,
    #[validate(range(min = 18, max = 100, message = "min_age must be between 18 and 100"))]
    pub min_age: Option<i32>,
    #[validate(range(min = 18, max = 100, message = "max_age must be between 18 and 100"))]
    pub max_age: Option<i32>,
    #[serde(default)]
    pub sort_by: SortBy,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[validate(range(min = 1, message = "max_distance_km must be positive"))]
    pub max_distance_km: Option<i32>,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

impl Default for MatchFilters {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            gender: None,
            min_age: None,
            max_age: None,
            sort_by: SortBy::default(),
            lat: None,
            lng: None,
            max_distance_km: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateCard {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub age: Option<i32>,
    pub photos: Vec<String>,
    pub bio: Option<String>,
    pub compatibility: u8,
    pub distance_km: Option<i32>,
    pub boosted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MatchFeed {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub items: Vec<CandidateCard>,
    pub fallback_used: bool,
}

impl MatchEngine {
    /// Swipe feed: ranked candidates the user has not interacted with.
    /// Falls back to the unfiltered pool when the requested page would
    /// otherwise come back empty.
    pub async fn potential_matches(
        &self,
        user_id: Uuid,
        filters: &MatchFilters,
    ) -> AppResult<MatchFeed> {
        self.build_feed(user_id, filters, true).await
    }

    /// Literal filtered search: same pipeline, but an empty result is an
    /// answer, never broadened.
    pub async fn search_users(&self, user_id: Uuid, filters: &MatchFilters) -> AppResult<MatchFeed> {
        self.build_feed(user_id, filters, false).await
    }

    async fn build_feed(
        &self,
        user_id: Uuid,
        filters: &MatchFilters,
        allow_fallback: bool,
    ) -> AppResult<MatchFeed> {
        let requester = self
            .store
            .user_with_profile(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))?;
        let profile = requester
            .profile
            .as_ref()
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "user profile not found"))?;

        let quiz = profile.quiz();
        let origin = match (filters.lat, filters.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => profile.coordinates(),
        };

        let excluded = self.store.interacted_target_ids(user_id).await?;
        let today = Utc::now().date_naive();
        let params = PaginationParams::new(filters.page, filters.limit);

        let narrowed = CandidateFilter {
            exclude_ids: excluded.clone(),
            gender: filters.gender.clone(),
        };
        let pool = self.store.candidates(user_id, &narrowed).await?;

        let mut cards = score_pool(&pool, quiz.as_ref(), origin, today);
        cards.retain(|c| passes_post_filters(c, filters));
        sort_cards(&mut cards, filters.sort_by);

        let total = cards.len() as u64;
        let items = paginate(cards, &params);

        if !items.is_empty() || !allow_fallback {
            return Ok(MatchFeed {
                page: params.page,
                per_page: params.limit(),
                total,
                items,
                fallback_used: false,
            });
        }

        // Broadened retry: same exclusions, no gender/age/distance
        // narrowing, ranked by compatibility alone. Keeps the feed from
        // going empty while real candidates exist.
        let broad = CandidateFilter {
            exclude_ids: excluded,
            gender: None,
        };
        let pool = self.store.candidates(user_id, &broad).await?;
        let mut cards = score_pool(&pool, quiz.as_ref(), origin, today);
        sort_cards(&mut cards, SortBy::Recent);

        let total = cards.len() as u64;
        let items = paginate(cards, &params);

        Ok(MatchFeed {
            page: params.page,
            per_page: params.limit(),
            total,
            items,
            fallback_used: true,
        })
    }
}

fn score_pool(
    pool: &[Candidate],
    quiz: Option<&QuizAnswers>,
    origin: Option<(f64, f64)>,
    today: NaiveDate,
) -> Vec<CandidateCard> {
    pool.iter()
        .map(|candidate| {
            let candidate_quiz = candidate.profile.quiz();
            CandidateCard {
                id: candidate.user.id,
                full_name: candidate.profile.full_name.clone(),
                age: candidate.profile.age_on(today),
                photos: candidate.profile.photo_urls(),
                bio: candidate.profile.bio.clone(),
                compatibility: compat::compatibility_score(quiz, candidate_quiz.as_ref()),
                distance_km: compat::distance_km(origin, candidate.profile.coordinates()),
                boosted_at: candidate.profile.boosted_at,
            }
        })
        .collect()
}

/// Unknown age or distance passes rather than being filtered out; null is
/// not "out of range".
fn passes_post_filters(card: &CandidateCard, filters: &MatchFilters) -> bool {
    if let (Some(min), Some(age)) = (filters.min_age, card.age) {
        if age < min {
            return false;
        }
    }
    if let (Some(max), Some(age)) = (filters.max_age, card.age) {
        if age > max {
            return false;
        }
    }
    if let (Some(max_km), Some(km)) = (filters.max_distance_km, card.distance_km) {
        if km > max_km {
            return false;
        }
    }
    true
}

fn sort_cards(cards: &mut [CandidateCard], sort_by: SortBy) {
    match sort_by {
        SortBy::Recent => {
            cards.sort_by(|a, b| b.compatibility.cmp(&a.compatibility));
        }
        SortBy::AgeAsc => {
            cards.sort_by(|a, b| match (a.age, b.age) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
        SortBy::AgeDesc => {
            cards.sort_by(|a, b| match (a.age, b.age) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
        }
    }
}

fn paginate(cards: Vec<CandidateCard>, params: &PaginationParams) -> Vec<CandidateCard> {
    cards
        .into_iter()
        .skip(params.offset() as usize)
        .take(params.limit() as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use crate::events::testing::RecordingDispatcher;
    use crate::store::memory::{fixtures, MemoryStore};

    use super::*;

    fn engine_with(store: Arc<MemoryStore>) -> MatchEngine {
        MatchEngine::new(store, Arc::new(RecordingDispatcher::default()))
    }

    fn quiz_value(pairs: &[(&str, &[&str])]) -> serde_json::Value {
        let map: QuizAnswers = pairs
            .iter()
            .map(|(k, tags)| (k.to_string(), tags.iter().map(|t| t.to_string()).collect()))
            .collect();
        serde_json::json!(map)
    }

    fn seed_user(store: &MemoryStore, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        store.insert_user(fixtures::user(id));
        store.insert_profile(fixtures::profile(id, name));
        id
    }

    #[tokio::test]
    async fn requires_a_profile() {
        let store = Arc::new(MemoryStore::new());
        let me = Uuid::now_v7();
        store.insert_user(fixtures::user(me));

        let engine = engine_with(store);
        let err = engine
            .potential_matches(me, &MatchFilters::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProfileNotFound);
    }

    #[tokio::test]
    async fn excludes_self_and_prior_interactions() {
        let store = Arc::new(MemoryStore::new());
        let me = seed_user(&store, "Me");
        let liked = seed_user(&store, "Already liked");
        let fresh = seed_user(&store, "Fresh");
        store.insert_interaction(fixtures::like(me, liked, Utc::now()));

        let engine = engine_with(store);
        let feed = engine
            .potential_matches(me, &MatchFilters::default())
            .await
            .unwrap();

        let ids: Vec<Uuid> = feed.items.iter().map(|c| c.id).collect();
        assert!(ids.contains(&fresh));
        assert!(!ids.contains(&liked));
        assert!(!ids.contains(&me));
        assert!(!feed.fallback_used);
    }

    #[tokio::test]
    async fn ranks_by_compatibility_by_default() {
        let store = Arc::new(MemoryStore::new());
        let me = Uuid::now_v7();
        store.insert_user(fixtures::user(me));
        let mut my_profile = fixtures::profile(me, "Me");
        my_profile.quiz_answers = quiz_value(&[("music", &["rock"]), ("food", &["sushi"])]);
        store.insert_profile(my_profile);

        let close = Uuid::now_v7();
        store.insert_user(fixtures::user(close));
        let mut p = fixtures::profile(close, "Close match");
        p.quiz_answers = quiz_value(&[("music", &["rock"]), ("food", &["sushi"])]);
        store.insert_profile(p);

        let far = Uuid::now_v7();
        store.insert_user(fixtures::user(far));
        let mut p = fixtures::profile(far, "Weak match");
        p.quiz_answers = quiz_value(&[("music", &["classical"]), ("food", &["sushi"])]);
        store.insert_profile(p);

        let engine = engine_with(store);
        let feed = engine
            .potential_matches(me, &MatchFilters::default())
            .await
            .unwrap();

        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[0].id, close);
        assert_eq!(feed.items[0].compatibility, 100);
        assert_eq!(feed.items[1].id, far);
        assert_eq!(feed.items[1].compatibility, 50);
    }

    #[tokio::test]
    async fn unknown_age_passes_age_filters() {
        let store = Arc::new(MemoryStore::new());
        let me = seed_user(&store, "Me");

        let ageless = seed_user(&store, "No birthday");

        let young = Uuid::now_v7();
        store.insert_user(fixtures::user(young));
        let mut p = fixtures::profile(young, "Too young");
        p.birthday = Some((Utc::now() - Duration::days(20 * 365)).date_naive());
        store.insert_profile(p);

        let filters = MatchFilters {
            min_age: Some(30),
            ..MatchFilters::default()
        };

        let engine = engine_with(store);
        let feed = engine.potential_matches(me, &filters).await.unwrap();

        let ids: Vec<Uuid> = feed.items.iter().map(|c| c.id).collect();
        assert!(ids.contains(&ageless), "null age is not out of range");
        assert!(!ids.contains(&young));
    }

    #[tokio::test]
    async fn age_sort_puts_unknown_last() {
        let store = Arc::new(MemoryStore::new());
        let me = seed_user(&store, "Me");

        let older = Uuid::now_v7();
        store.insert_user(fixtures::user(older));
        let mut p = fixtures::profile(older, "Older");
        p.birthday = Some((Utc::now() - Duration::days(40 * 365)).date_naive());
        store.insert_profile(p);

        let younger = Uuid::now_v7();
        store.insert_user(fixtures::user(younger));
        let mut p = fixtures::profile(younger, "Younger");
        p.birthday = Some((Utc::now() - Duration::days(25 * 365)).date_naive());
        store.insert_profile(p);

        let ageless = seed_user(&store, "Ageless");

        let engine = engine_with(store);

        let filters = MatchFilters {
            sort_by: SortBy::AgeAsc,
            ..MatchFilters::default()
        };
        let feed = engine.potential_matches(me, &filters).await.unwrap();
        let ids: Vec<Uuid> = feed.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![younger, older, ageless]);

        let filters = MatchFilters {
            sort_by: SortBy::AgeDesc,
            ..MatchFilters::default()
        };
        let feed = engine.potential_matches(me, &filters).await.unwrap();
        let ids: Vec<Uuid> = feed.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![older, younger, ageless]);
    }

    #[tokio::test]
    async fn narrow_filters_fall_back_to_broad_pool() {
        let store = Arc::new(MemoryStore::new());
        let me = seed_user(&store, "Me");

        let other = Uuid::now_v7();
        store.insert_user(fixtures::user(other));
        let mut p = fixtures::profile(other, "Only candidate");
        p.gender = Some("male".to_string());
        store.insert_profile(p);

        let filters = MatchFilters {
            gender: Some("female".to_string()),
            ..MatchFilters::default()
        };

        let engine = engine_with(store);
        let feed = engine.potential_matches(me, &filters).await.unwrap();

        assert!(feed.fallback_used);
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].id, other);
    }

    #[tokio::test]
    async fn search_never_falls_back() {
        let store = Arc::new(MemoryStore::new());
        let me = seed_user(&store, "Me");

        let other = Uuid::now_v7();
        store.insert_user(fixtures::user(other));
        let mut p = fixtures::profile(other, "Only candidate");
        p.gender = Some("male".to_string());
        store.insert_profile(p);

        let filters = MatchFilters {
            gender: Some("female".to_string()),
            ..MatchFilters::default()
        };

        let engine = engine_with(store);
        let feed = engine.search_users(me, &filters).await.unwrap();

        assert!(!feed.fallback_used);
        assert!(feed.items.is_empty());
        assert_eq!(feed.total, 0);
    }

    #[tokio::test]
    async fn distance_filter_and_origin_override() {
        let store = Arc::new(MemoryStore::new());
        let me = Uuid::now_v7();
        store.insert_user(fixtures::user(me));
        let mut my_profile = fixtures::profile(me, "Me");
        // Paris
        my_profile.latitude = Some(48.8566);
        my_profile.longitude = Some(2.3522);
        store.insert_profile(my_profile);

        let nearby = Uuid::now_v7();
        store.insert_user(fixtures::user(nearby));
        let mut p = fixtures::profile(nearby, "Versailles");
        p.latitude = Some(48.8049);
        p.longitude = Some(2.1204);
        store.insert_profile(p);

        let distant = Uuid::now_v7();
        store.insert_user(fixtures::user(distant));
        let mut p = fixtures::profile(distant, "London");
        p.latitude = Some(51.5074);
        p.longitude = Some(-0.1278);
        store.insert_profile(p);

        let no_coords = seed_user(&store, "Nowhere");

        let filters = MatchFilters {
            max_distance_km: Some(50),
            ..MatchFilters::default()
        };

        let engine = engine_with(store);
        let feed = engine.search_users(me, &filters).await.unwrap();
        let ids: Vec<Uuid> = feed.items.iter().map(|c| c.id).collect();
        assert!(ids.contains(&nearby));
        assert!(!ids.contains(&distant));
        assert!(ids.contains(&no_coords), "unknown distance passes");

        // measuring from a caller-supplied origin instead of the profile
        let filters = MatchFilters {
            lat: Some(51.5074),
            lng: Some(-0.1278),
            max_distance_km: Some(50),
            ..MatchFilters::default()
        };
        let feed = engine.search_users(me, &filters).await.unwrap();
        let ids: Vec<Uuid> = feed.items.iter().map(|c| c.id).collect();
        assert!(ids.contains(&distant), "origin override recenters distances");
        assert!(!ids.contains(&nearby));
    }

    #[tokio::test]
    async fn pagination_clamps_and_pages() {
        let store = Arc::new(MemoryStore::new());
        let me = seed_user(&store, "Me");
        for i in 0..5 {
            seed_user(&store, &format!("candidate {i}"));
        }

        let filters = MatchFilters {
            page: 2,
            limit: 2,
            ..MatchFilters::default()
        };

        let engine = engine_with(store);
        let feed = engine.potential_matches(me, &filters).await.unwrap();
        assert_eq!(feed.total, 5);
        assert_eq!(feed.page, 2);
        assert_eq!(feed.per_page, 2);
        assert_eq!(feed.items.len(), 2);
    }
}
