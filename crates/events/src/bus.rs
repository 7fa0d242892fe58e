//! Named broadcast channels for generation progress.
//!
//! Channels are created lazily on first subscribe or publish and hold no
//! history. A publish with no listeners is dropped, not an error.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::event::SprintEvent;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Registry of per-sprint broadcast channels, shared across the app.
#[derive(Clone)]
pub struct ChannelRegistry {
    capacity: usize,
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<SprintEvent>>>>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to a channel, creating it if needed.
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<SprintEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish to a channel, returning how many subscribers received the
    /// event. Missing channel or zero listeners is fine.
    pub async fn publish(&self, channel: &str, event: SprintEvent) -> usize {
        let channels = self.channels.read().await;
        let Some(sender) = channels.get(channel) else {
            debug!(channel, kind = event.kind(), "no channel, event dropped");
            return 0;
        };
        match sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(channel, kind = event.kind(), "no subscribers, event dropped");
                0
            }
        }
    }

    /// Drop channels whose every subscriber has detached.
    pub async fn purge_idle(&self) -> usize {
        let mut channels = self.channels.write().await;
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let registry = ChannelRegistry::new();
        let mut first = registry.subscribe("sprint-1-progress").await;
        let mut second = registry.subscribe("sprint-1-progress").await;

        let delivered = registry
            .publish("sprint-1-progress", SprintEvent::StructureGenerationStarted)
            .await;
        assert_eq!(delivered, 2);
        assert_eq!(
            first.recv().await.unwrap(),
            SprintEvent::StructureGenerationStarted
        );
        assert_eq!(
            second.recv().await.unwrap(),
            SprintEvent::StructureGenerationStarted
        );
    }

    #[tokio::test]
    async fn publishing_to_a_missing_channel_is_dropped() {
        let registry = ChannelRegistry::new();
        let delivered = registry
            .publish("nobody-home", SprintEvent::StructureGenerationStarted)
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn channels_are_isolated() {
        let registry = ChannelRegistry::new();
        let mut one = registry.subscribe("sprint-1-progress").await;
        let _two = registry.subscribe("sprint-2-progress").await;

        registry
            .publish(
                "sprint-2-progress",
                SprintEvent::GenerationComplete {
                    sprint_id: "sprint-2".into(),
                },
            )
            .await;
        assert!(matches!(
            one.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn purge_removes_channels_without_subscribers() {
        let registry = ChannelRegistry::new();
        let keep = registry.subscribe("kept").await;
        {
            let _dropped = registry.subscribe("orphaned").await;
        }
        assert_eq!(registry.channel_count().await, 2);

        assert_eq!(registry.purge_idle().await, 1);
        assert_eq!(registry.channel_count().await, 1);
        drop(keep);
    }
}
