use std::sync::Arc;

use crate::events::NotificationDispatcher;
use crate::store::MatchStore;

pub mod actions;
pub mod boost;
pub mod compat;
pub mod feed;
pub mod profile;
pub mod streak;

/// Orchestrates the matching domain: candidate feed, swipe recording,
/// mutual-match detection, premium gating, boosts and streaks.
///
/// Holds only the injected gateway and dispatcher; all persistent state
/// lives behind [`MatchStore`].
pub struct MatchEngine {
    store: Arc<dyn MatchStore>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn MatchStore>, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        Self { store, notifier }
    }
}
