use chrono::{DateTime, Utc};
use uuid::Uuid;

use amora_shared::clients::rabbitmq::RabbitMqClient;
use amora_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_like_sent(rabbitmq: &RabbitMqClient, actor_id: Uuid, target_id: Uuid) {
    let event = Event::new(
        "amora-matching",
        routing_keys::MATCH_LIKE_SENT,
        payloads::LikeSent {
            actor_id,
            target_id,
        },
    )
    .with_user(actor_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCH_LIKE_SENT, &event).await {
        tracing::error!(error = %e, "failed to publish like.sent event");
    }
}

pub async fn publish_match_created(
    rabbitmq: &RabbitMqClient,
    actor_id: Uuid,
    target_id: Uuid,
    interaction_id: Uuid,
) {
    let event = Event::new(
        "amora-matching",
        routing_keys::MATCH_PAIR_CREATED,
        payloads::MatchPairCreated {
            actor_id,
            target_id,
            interaction_id,
        },
    )
    .with_user(actor_id);

    if let Err(e) = rabbitmq
        .publish(routing_keys::MATCH_PAIR_CREATED, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish pair.created event");
    }
}

pub async fn publish_profile_boosted(
    rabbitmq: &RabbitMqClient,
    user_id: Uuid,
    boosted_at: DateTime<Utc>,
) {
    let event = Event::new(
        "amora-matching",
        routing_keys::PROFILE_BOOSTED,
        payloads::ProfileBoosted {
            user_id,
            boosted_at,
        },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq.publish(routing_keys::PROFILE_BOOSTED, &event).await {
        tracing::error!(error = %e, "failed to publish profile.boosted event");
    }
}

pub async fn publish_streak_milestone(rabbitmq: &RabbitMqClient, user_id: Uuid, streak: i32) {
    let event = Event::new(
        "amora-matching",
        routing_keys::STREAK_MILESTONE,
        payloads::StreakMilestone { user_id, streak },
    )
    .with_user(user_id);

    if let Err(e) = rabbitmq
        .publish(routing_keys::STREAK_MILESTONE, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish streak.milestone event");
    }
}
