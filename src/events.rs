//! Profile change notifications for presentation observers.
//!
//! Nothing in the learner state reads these; they only let views that show
//! profile data (name, avatar) refresh after a change made elsewhere.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    Updated { user_id: String },
    SignedOut,
}

/// Best-effort publish/subscribe hub.
#[derive(Debug, Clone)]
pub struct ProfileEvents {
    sender: broadcast::Sender<ProfileEvent>,
}

impl Default for ProfileEvents {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl ProfileEvents {
    pub fn subscribe(&self) -> broadcast::Receiver<ProfileEvent> {
        self.sender.subscribe()
    }

    /// Broadcast `event`. Having no subscriber is fine.
    pub fn publish(&self, event: ProfileEvent) {
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!(receivers, "profile event published"),
            Err(_) => tracing::trace!("profile event dropped, no subscriber"),
        }
    }
}
