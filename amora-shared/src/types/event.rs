use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// Routing key format: `amora.{domain}.{entity}.{action}`
/// Example: `amora.match.pair.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Match events
    pub const MATCH_LIKE_SENT: &str = "amora.match.like.sent";
    pub const MATCH_PAIR_CREATED: &str = "amora.match.pair.created";

    // Profile events
    pub const PROFILE_BOOSTED: &str = "amora.profile.boosted";

    // Engagement events
    pub const STREAK_MILESTONE: &str = "amora.engagement.streak.milestone";

    // Push notification fan-out (consumed by the notification service)
    pub const NOTIFY_MATCH: &str = "amora.notify.match";
    pub const NOTIFY_MESSAGE: &str = "amora.notify.message";
}

/// Push notification contract consumed by the notification service.
///
/// The matching core only ever addresses a single user; fan-out to devices
/// and sockets happens downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "type")]
    pub kind: PushKind,
    pub target_user_id: Uuid,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushKind {
    Match,
    Message,
}

impl PushEvent {
    pub fn routing_key(&self) -> &'static str {
        match self.kind {
            PushKind::Match => routing_keys::NOTIFY_MATCH,
            PushKind::Message => routing_keys::NOTIFY_MESSAGE,
        }
    }
}

/// Common event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LikeSent {
        pub actor_id: Uuid,
        pub target_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchPairCreated {
        pub actor_id: Uuid,
        pub target_id: Uuid,
        pub interaction_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProfileBoosted {
        pub user_id: Uuid,
        pub boosted_at: chrono::DateTime<chrono::Utc>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct StreakMilestone {
        pub user_id: Uuid,
        pub streak: i32,
    }
}
