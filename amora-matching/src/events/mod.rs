use amora_shared::clients::rabbitmq::RabbitMqClient;
use amora_shared::types::{Event, PushEvent};

pub mod publisher;

/// Fire-and-forget push delivery seam. Implementations log failures and
/// never propagate them; a lost push must not roll back the interaction
/// it announces.
#[axum::async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn emit(&self, event: PushEvent);
}

/// Publishes pushes onto the event exchange; the notification service
/// owns device/socket fan-out downstream.
pub struct RabbitNotifier {
    rabbitmq: RabbitMqClient,
}

impl RabbitNotifier {
    pub fn new(rabbitmq: RabbitMqClient) -> Self {
        Self { rabbitmq }
    }
}

#[axum::async_trait]
impl NotificationDispatcher for RabbitNotifier {
    async fn emit(&self, event: PushEvent) {
        let routing_key = event.routing_key();
        let target = event.target_user_id;
        let envelope = Event::new("amora-matching", routing_key, event).with_user(target);

        if let Err(e) = self.rabbitmq.publish(routing_key, &envelope).await {
            tracing::error!(error = %e, target_user_id = %target, "failed to publish push event");
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Captures emitted pushes for assertions.
    #[derive(Default)]
    pub struct RecordingDispatcher {
        pushes: Mutex<Vec<PushEvent>>,
    }

    impl RecordingDispatcher {
        pub fn pushes(&self) -> Vec<PushEvent> {
            self.pushes.lock().unwrap().clone()
        }
    }

    #[axum::async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn emit(&self, event: PushEvent) {
            self.pushes.lock().unwrap().push(event);
        }
    }
}
