use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::RoomEvent;

/// Per-subscriber buffer before a slow subscriber starts lagging
const CHANNEL_CAPACITY: usize = 100;

/// Fire-and-forget fan-out of room events to channel subscribers.
///
/// This stands in for the external pub/sub transport: no acknowledgement,
/// no retry, no ordering guarantee beyond what the broadcast channel gives.
/// Missed deliveries are recoverable client-side via a snapshot fetch, so a
/// publish with no receivers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<RoomEvent>>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Publishes an event to all current subscribers of a channel
    pub async fn publish(&self, channel: &str, event: RoomEvent) {
        let channels = self.channels.read().await;

        if let Some(sender) = channels.get(channel) {
            match sender.send(event) {
                Ok(receiver_count) => {
                    debug!(
                        channel = %channel,
                        receivers = receiver_count,
                        "Room event published"
                    );
                }
                Err(_) => {
                    debug!(channel = %channel, "Room event published with no receivers");
                }
            }
        } else {
            debug!(channel = %channel, "No channel yet - creating one");
            drop(channels);

            let mut channels = self.channels.write().await;
            let sender = channels
                .entry(channel.to_string())
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
                .clone();

            if sender.send(event).is_err() {
                debug!(channel = %channel, "Room event sent to new channel with no receivers");
            }
        }
    }

    /// Subscribe to a channel, creating it if needed
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<RoomEvent> {
        let channels = self.channels.read().await;

        if let Some(sender) = channels.get(channel) {
            sender.subscribe()
        } else {
            debug!(channel = %channel, "Creating channel for new subscription");
            drop(channels);

            let mut channels = self.channels.write().await;
            channels
                .entry(channel.to_string())
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
                .subscribe()
        }
    }
}
